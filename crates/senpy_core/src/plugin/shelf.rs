//! Per-plugin shelf slot with open-on-first-access.
//!
//! # Invariants
//! - The slot resolves its path once, at construction.
//! - The shelf file is read at most once per open; `reset()` forces a reread.
//! - Changing `force` only affects the next open.

use crate::plugin::manifest::PluginManifest;
use crate::shelf::{Shelf, ShelfConfig, ShelfResult};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PluginShelf {
    path: PathBuf,
    force: bool,
    inner: Option<Shelf>,
}

impl PluginShelf {
    /// Binds a slot to the shelf path of `manifest` under `config`.
    pub fn new(config: &ShelfConfig, manifest: &PluginManifest) -> Self {
        Self {
            path: config.resolve_path(&manifest.name, &manifest.version),
            force: config.force,
            inner: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns the open shelf, opening it on first access.
    pub fn sh(&mut self) -> ShelfResult<&mut Shelf> {
        let shelf = match self.inner.take() {
            Some(shelf) => shelf,
            None => Shelf::open(&self.path, self.force)?,
        };
        Ok(self.inner.insert(shelf))
    }

    /// Saves the shelf, opening it first when needed.
    pub fn save(&mut self) -> ShelfResult<()> {
        self.sh()?.save()
    }

    /// Drops the open shelf without saving pending changes.
    pub fn reset(&mut self) {
        if let Some(shelf) = self.inner.take() {
            shelf.discard();
        }
    }

    /// Saves and releases the open shelf; a closed slot is left untouched.
    pub fn close(&mut self) -> ShelfResult<()> {
        match self.inner.take() {
            Some(shelf) => shelf.close(),
            None => Ok(()),
        }
    }
}
