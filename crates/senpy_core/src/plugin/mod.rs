//! In-process analysis plugin host.
//!
//! # Responsibility
//! - Declare plugin manifests and their extra parameters.
//! - Resolve caller parameters (aliases, defaults, options) before a plugin
//!   runs, so plugins only see typed, validated values.
//! - Track activation and route entries to registered plugins.
//!
//! # Invariants
//! - Plugin names are unique within one registry.
//! - A plugin only analyses entries while activated.

use crate::model::entry::Entry;
use crate::shelf::ShelfError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kernel;
pub mod manifest;
pub mod params;
pub mod shelf;
pub mod template;

/// Output of one analysis call: a finite, one-shot stream of entries.
pub type EntryStream = Box<dyn Iterator<Item = Entry>>;

pub type PluginResult<T> = Result<T, PluginError>;

/// Input did not satisfy the analysis precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    /// The entry carries no emotion set at all.
    NoEmotionSets,
    /// The emotion set at `set_index` has no emotions to choose from.
    EmptyEmotionSet { set_index: usize },
}

impl Display for PreconditionViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEmotionSets => write!(f, "entry has no emotion sets"),
            Self::EmptyEmotionSet { set_index } => {
                write!(f, "emotion set {set_index} has no emotions")
            }
        }
    }
}

impl Error for PreconditionViolation {}

#[derive(Debug)]
pub enum PluginError {
    InvalidManifest(manifest::ManifestValidationError),
    DuplicatePlugin(String),
    PluginNotFound(String),
    NotActivated(String),
    Params(params::ParamError),
    Precondition(PreconditionViolation),
    Shelf(ShelfError),
    /// Entry JSON does not match the entry model.
    InvalidEntry(serde_json::Error),
    TestCaseFailed { plugin: String, case_index: usize },
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifest(err) => write!(f, "invalid plugin manifest: {err}"),
            Self::DuplicatePlugin(name) => write!(f, "plugin already registered: {name}"),
            Self::PluginNotFound(name) => write!(f, "plugin not found: {name}"),
            Self::NotActivated(name) => write!(f, "plugin is not activated: {name}"),
            Self::Params(err) => write!(f, "{err}"),
            Self::Precondition(err) => write!(f, "precondition violated: {err}"),
            Self::Shelf(err) => write!(f, "{err}"),
            Self::InvalidEntry(err) => write!(f, "invalid entry: {err}"),
            Self::TestCaseFailed { plugin, case_index } => {
                write!(f, "plugin {plugin} failed built-in test case {case_index}")
            }
        }
    }
}

impl Error for PluginError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidManifest(err) => Some(err),
            Self::Params(err) => Some(err),
            Self::Precondition(err) => Some(err),
            Self::Shelf(err) => Some(err),
            Self::InvalidEntry(err) => Some(err),
            Self::DuplicatePlugin(_)
            | Self::PluginNotFound(_)
            | Self::NotActivated(_)
            | Self::TestCaseFailed { .. } => None,
        }
    }
}

impl From<manifest::ManifestValidationError> for PluginError {
    fn from(value: manifest::ManifestValidationError) -> Self {
        Self::InvalidManifest(value)
    }
}

impl From<params::ParamError> for PluginError {
    fn from(value: params::ParamError) -> Self {
        Self::Params(value)
    }
}

impl From<PreconditionViolation> for PluginError {
    fn from(value: PreconditionViolation) -> Self {
        Self::Precondition(value)
    }
}

impl From<ShelfError> for PluginError {
    fn from(value: ShelfError) -> Self {
        Self::Shelf(value)
    }
}

impl PluginError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidManifest(_) => "plugin_invalid_manifest",
            Self::DuplicatePlugin(_) => "plugin_duplicate",
            Self::PluginNotFound(_) => "plugin_not_found",
            Self::NotActivated(_) => "plugin_not_activated",
            Self::Params(_) => "plugin_params",
            Self::Precondition(_) => "plugin_precondition",
            Self::Shelf(err) => err.code(),
            Self::InvalidEntry(_) => "plugin_invalid_entry",
            Self::TestCaseFailed { .. } => "plugin_test_case_failed",
        }
    }
}
