//! File-backed key/value shelf for plugin state.
//!
//! # Responsibility
//! - Persist one string-keyed mapping per plugin across activations.
//! - Classify unreadable backing files (empty, corrupt, wrong shape).
//!
//! # Invariants
//! - The in-memory mapping is the source of truth while a `Shelf` is open.
//! - Nothing reaches disk until `save()`/`close()`; saves replace the whole
//!   file via write-then-rename.
//! - `force` only recovers from empty or corrupt files; it never hides I/O
//!   failures.
//!
//! # Concurrency
//! No locking is performed. Two processes saving the same shelf file race and
//! the last rename wins.
//!
//! # Format
//! One JSON object. There is no version marker; changing the value layout of
//! an existing plugin breaks older shelves.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod store;

pub use store::{with_shelf, Shelf};

/// File extension used by derived shelf paths.
pub const SHELF_FILE_EXTENSION: &str = "shelf.json";

pub type ShelfResult<T> = Result<T, ShelfError>;

#[derive(Debug)]
pub enum ShelfError {
    /// Backing file exists but holds zero bytes.
    EmptyStore(PathBuf),
    /// Backing file content is not a JSON document.
    CorruptStore {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Backing file is valid JSON but not a key/value object.
    InvalidStoreFormat { path: PathBuf, found: &'static str },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A value could not be converted to or from its JSON form.
    Value {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for ShelfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStore(path) => write!(f, "shelf file is empty: {}", path.display()),
            Self::CorruptStore { path, source } => {
                write!(f, "shelf file is corrupt: {} ({source})", path.display())
            }
            Self::InvalidStoreFormat { path, found } => write!(
                f,
                "shelf file {} holds a JSON {found}, expected an object",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "shelf file i/o failed: {} ({source})", path.display())
            }
            Self::Value { key, source } => {
                write!(f, "shelf value for key `{key}` is not convertible: {source}")
            }
        }
    }
}

impl Error for ShelfError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptStore { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Value { source, .. } => Some(source),
            Self::EmptyStore(_) | Self::InvalidStoreFormat { .. } => None,
        }
    }
}

impl ShelfError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyStore(_) => "shelf_empty",
            Self::CorruptStore { .. } => "shelf_corrupt",
            Self::InvalidStoreFormat { .. } => "shelf_invalid_format",
            Self::Io { .. } => "shelf_io",
            Self::Value { .. } => "shelf_value",
        }
    }

    /// Whether `force` may discard the file content to recover.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyStore(_) | Self::CorruptStore { .. })
    }
}

/// Where a plugin shelf lives and how strictly it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Directory for derived shelf paths.
    pub base_dir: PathBuf,
    /// Explicit file path; overrides the derived one.
    pub shelf_file: Option<PathBuf>,
    /// Replace empty or corrupt files with an empty mapping.
    pub force: bool,
}

impl ShelfConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            shelf_file: None,
            force: false,
        }
    }

    pub fn with_shelf_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.shelf_file = Some(path.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Resolves the shelf path for one plugin identity.
    pub fn resolve_path(&self, plugin_name: &str, plugin_version: &str) -> PathBuf {
        match &self.shelf_file {
            Some(path) => path.clone(),
            None => default_shelf_path(&self.base_dir, plugin_name, plugin_version),
        }
    }
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

/// Derives `<base_dir>/<name>-<version>.shelf.json`.
///
/// Characters outside `[A-Za-z0-9._-]` become `_` so every identity maps to a
/// single file name inside `base_dir`.
pub fn default_shelf_path(base_dir: &Path, plugin_name: &str, plugin_version: &str) -> PathBuf {
    let file_name = format!(
        "{}-{}.{SHELF_FILE_EXTENSION}",
        sanitize_component(plugin_name),
        sanitize_component(plugin_version)
    );
    base_dir.join(file_name)
}

fn sanitize_component(value: &str) -> String {
    let sanitized: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    sanitized
}
