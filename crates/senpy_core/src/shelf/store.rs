//! Shelf open/save lifecycle.
//!
//! # Responsibility
//! - Load the mapping from disk with empty/corrupt/format classification.
//! - Replace the backing file atomically on save.
//! - Provide scoped acquisition that flushes on success and discards otherwise.
//!
//! # Invariants
//! - A dropped shelf never writes; unsaved changes are discarded and logged.
//! - `save()` leaves either the previous file or the complete new file.

use super::{ShelfConfig, ShelfError, ShelfResult};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;

const TEMP_SUFFIX: &str = ".tmp";

/// Open key/value shelf bound to one backing file.
#[derive(Debug)]
pub struct Shelf {
    path: PathBuf,
    data: BTreeMap<String, Value>,
    dirty: bool,
}

impl Shelf {
    /// Opens the shelf stored at `path`.
    ///
    /// A missing file yields an empty mapping. With `force`, empty or corrupt
    /// files are treated as empty too; their content is lost on the next save.
    ///
    /// # Side effects
    /// - Reads `path` once; never writes.
    /// - Emits `shelf_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>, force: bool) -> ShelfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!("event=shelf_open module=shelf status=start force={force}");

        let data = match load_mapping(&path) {
            Ok(data) => data,
            Err(err) if force && err.is_recoverable() => {
                warn!(
                    "event=shelf_open module=shelf status=recovered duration_ms={} error_code={} path={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    path.display()
                );
                BTreeMap::new()
            }
            Err(err) => {
                error!(
                    "event=shelf_open module=shelf status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=shelf_open module=shelf status=ok duration_ms={} keys={}",
            started_at.elapsed().as_millis(),
            data.len()
        );
        Ok(Self {
            path,
            data,
            dirty: false,
        })
    }

    /// Opens the shelf for one plugin identity under `config`.
    pub fn open_for(
        config: &ShelfConfig,
        plugin_name: &str,
        plugin_version: &str,
    ) -> ShelfResult<Self> {
        Self::open(
            config.resolve_path(plugin_name, plugin_version),
            config.force,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Reads `key` converted into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ShelfResult<Option<T>> {
        let Some(value) = self.data.get(key) else {
            return Ok(None);
        };
        T::deserialize(value)
            .map(Some)
            .map_err(|source| ShelfError::Value {
                key: key.to_string(),
                source,
            })
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> ShelfResult<()> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| ShelfError::Value {
            key: key.clone(),
            source,
        })?;
        self.data.insert(key, value);
        self.dirty = true;
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Full in-memory mapping.
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// Whether the mapping changed since the last open/save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the whole mapping to the backing file.
    ///
    /// # Side effects
    /// - Creates the parent directory when missing.
    /// - Writes a sibling `*.tmp` file, then renames it over the target.
    /// - Emits `shelf_save` logging events.
    pub fn save(&mut self) -> ShelfResult<()> {
        let started_at = Instant::now();
        match write_mapping(&self.path, &self.data) {
            Ok(()) => {
                self.dirty = false;
                info!(
                    "event=shelf_save module=shelf status=ok duration_ms={} keys={}",
                    started_at.elapsed().as_millis(),
                    self.data.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=shelf_save module=shelf status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Saves and releases the shelf.
    pub fn close(mut self) -> ShelfResult<()> {
        self.save()
    }

    /// Releases the shelf without writing pending changes.
    pub fn discard(mut self) {
        if self.dirty {
            info!(
                "event=shelf_discard module=shelf status=ok pending_keys={}",
                self.data.len()
            );
        }
        self.dirty = false;
    }
}

impl Drop for Shelf {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                "event=shelf_drop module=shelf status=discarded path={}",
                self.path.display()
            );
        }
    }
}

/// Runs `f` against the shelf at `path`, saving on `Ok` and discarding on
/// `Err` (or unwind).
pub fn with_shelf<T, E, F>(path: impl AsRef<Path>, force: bool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Shelf) -> Result<T, E>,
    E: From<ShelfError>,
{
    let mut shelf = Shelf::open(path, force)?;
    match f(&mut shelf) {
        Ok(value) => {
            shelf.close()?;
            Ok(value)
        }
        Err(err) => {
            shelf.discard();
            Err(err)
        }
    }
}

fn load_mapping(path: &Path) -> ShelfResult<BTreeMap<String, Value>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(ShelfError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if bytes.is_empty() {
        return Err(ShelfError::EmptyStore(path.to_path_buf()));
    }

    let document: Value =
        serde_json::from_slice(&bytes).map_err(|source| ShelfError::CorruptStore {
            path: path.to_path_buf(),
            source,
        })?;
    match document {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(ShelfError::InvalidStoreFormat {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

fn write_mapping(path: &Path, data: &BTreeMap<String, Value>) -> ShelfResult<()> {
    let io_err = |source| ShelfError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let temp_path = temp_sibling(path);
    let result = write_temp(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(io_err(source));
    }
    Ok(())
}

fn write_temp(temp_path: &Path, data: &BTreeMap<String, Value>) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
