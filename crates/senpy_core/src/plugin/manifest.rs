//! Plugin manifest declaration and validation.

use crate::plugin::params::ParamSpec;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declarative identity and parameters of one analysis plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginManifest {
    /// Registry name, e.g. `maxSentiment`.
    pub name: String,
    /// Free-form version label; together with `name` it keys the plugin shelf.
    pub version: String,
    pub author: Option<String>,
    pub description: String,
    /// Extra parameters keyed by canonical name.
    pub extra_params: BTreeMap<String, ParamSpec>,
}

impl PluginManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: None,
            description: String::new(),
            extra_params: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) one extra parameter declaration.
    pub fn with_param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.extra_params.insert(name.into(), spec);
        self
    }

    /// Validates declaration-level manifest invariants.
    pub fn validate(&self) -> Result<(), ManifestValidationError> {
        if self.name.trim().is_empty() {
            return Err(ManifestValidationError::EmptyName);
        }
        if !is_valid_plugin_name(&self.name) {
            return Err(ManifestValidationError::InvalidName(self.name.clone()));
        }

        if self.version.trim().is_empty() {
            return Err(ManifestValidationError::EmptyVersion);
        }
        if !is_valid_version_label(&self.version) {
            return Err(ManifestValidationError::InvalidVersion(
                self.version.clone(),
            ));
        }

        let mut seen_aliases = BTreeSet::<&str>::new();
        for (param, spec) in &self.extra_params {
            if param.trim().is_empty() {
                return Err(ManifestValidationError::EmptyParamName);
            }
            for alias in spec.lookup_names(param) {
                if alias.trim().is_empty() {
                    return Err(ManifestValidationError::EmptyAlias(param.clone()));
                }
                if !seen_aliases.insert(alias) {
                    return Err(ManifestValidationError::DuplicateAlias(alias.to_string()));
                }
            }
            if let (Some(default), Some(options)) = (&spec.default, &spec.options) {
                if !options.contains(default) {
                    return Err(ManifestValidationError::DefaultNotInOptions(param.clone()));
                }
            }
        }
        Ok(())
    }
}

fn is_valid_plugin_name(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

fn is_valid_version_label(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValidationError {
    EmptyName,
    InvalidName(String),
    EmptyVersion,
    InvalidVersion(String),
    EmptyParamName,
    EmptyAlias(String),
    DuplicateAlias(String),
    DefaultNotInOptions(String),
}

impl Display for ManifestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "plugin name must not be empty"),
            Self::InvalidName(value) => write!(f, "plugin name is invalid: {value}"),
            Self::EmptyVersion => write!(f, "plugin version must not be empty"),
            Self::InvalidVersion(value) => write!(f, "plugin version is invalid: {value}"),
            Self::EmptyParamName => write!(f, "extra parameter name must not be empty"),
            Self::EmptyAlias(param) => write!(f, "parameter {param} declares an empty alias"),
            Self::DuplicateAlias(alias) => {
                write!(f, "parameter alias is declared more than once: {alias}")
            }
            Self::DefaultNotInOptions(param) => {
                write!(f, "default of parameter {param} is not one of its options")
            }
        }
    }
}

impl Error for ManifestValidationError {}
