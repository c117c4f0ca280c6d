//! Plugin contract and registry.

use crate::model::entry::Entry;
use crate::plugin::manifest::PluginManifest;
use crate::plugin::params::{resolve_params, ResolvedParams};
use crate::plugin::template::{matches_template, PluginTestCase};
use crate::plugin::{EntryStream, PluginError, PluginResult};
use log::{error, info};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Contract implemented by every analysis plugin.
pub trait AnalysisPlugin {
    fn manifest(&self) -> &PluginManifest;

    /// Called once before the first analysis.
    fn activate(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called once when the host shuts the plugin down.
    fn deactivate(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Analyses one entry with already-resolved parameters.
    fn analyse_entry(&mut self, entry: Entry, params: &ResolvedParams)
        -> PluginResult<EntryStream>;

    /// Self-check cases run by `PluginRegistry::run_test_cases`.
    fn test_cases(&self) -> Vec<PluginTestCase> {
        Vec::new()
    }
}

/// In-process plugin registry keyed by plugin name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Box<dyn AnalysisPlugin>>,
    active: BTreeSet<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one plugin after manifest validation.
    pub fn register(&mut self, plugin: Box<dyn AnalysisPlugin>) -> PluginResult<()> {
        let manifest = plugin.manifest();
        manifest.validate()?;
        let name = manifest.name.clone();
        if self.plugins.contains_key(name.as_str()) {
            return Err(PluginError::DuplicatePlugin(name));
        }
        info!(
            "event=plugin_register module=plugin status=ok plugin={} version={}",
            name, manifest.version
        );
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalysisPlugin> {
        self.plugins.get(name).map(|plugin| plugin.as_ref())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    /// Activates `name`; activating an active plugin is a no-op.
    pub fn activate(&mut self, name: &str) -> PluginResult<()> {
        if self.active.contains(name) {
            return Ok(());
        }
        let plugin = self.plugin_mut(name)?;
        if let Err(err) = plugin.activate() {
            error!(
                "event=plugin_activate module=plugin status=error plugin={} error_code={} error={}",
                name,
                err.code(),
                err
            );
            return Err(err);
        }
        self.active.insert(name.to_string());
        info!("event=plugin_activate module=plugin status=ok plugin={name}");
        Ok(())
    }

    /// Deactivates `name`; deactivating an inactive plugin is a no-op.
    pub fn deactivate(&mut self, name: &str) -> PluginResult<()> {
        if !self.active.contains(name) {
            return Ok(());
        }
        self.plugin_mut(name)?.deactivate()?;
        self.active.remove(name);
        info!("event=plugin_deactivate module=plugin status=ok plugin={name}");
        Ok(())
    }

    /// Deactivates every active plugin, returning the first failure.
    pub fn deactivate_all(&mut self) -> PluginResult<()> {
        let active: Vec<String> = self.active.iter().cloned().collect();
        let mut first_error = None;
        for name in active {
            if let Err(err) = self.deactivate(&name) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolves `raw_params` for `name` and collects its output entries.
    ///
    /// # Side effects
    /// - Emits `plugin_analyse` logging events (no entry content).
    pub fn analyse(
        &mut self,
        name: &str,
        entry: Entry,
        raw_params: &Map<String, Value>,
    ) -> PluginResult<Vec<Entry>> {
        let started_at = Instant::now();
        if !self.active.contains(name) {
            if !self.plugins.contains_key(name) {
                return Err(PluginError::PluginNotFound(name.to_string()));
            }
            return Err(PluginError::NotActivated(name.to_string()));
        }
        let plugin = self.plugin_mut(name)?;

        let result = resolve_params(&plugin.manifest().extra_params, raw_params)
            .map_err(PluginError::from)
            .and_then(|params| plugin.analyse_entry(entry, &params))
            .map(|stream| stream.collect::<Vec<_>>());

        match &result {
            Ok(entries) => info!(
                "event=plugin_analyse module=plugin status=ok plugin={} duration_ms={} entries={}",
                name,
                started_at.elapsed().as_millis(),
                entries.len()
            ),
            Err(err) => error!(
                "event=plugin_analyse module=plugin status=error plugin={} duration_ms={} error_code={} error={}",
                name,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    /// Runs the plugin's built-in test cases, returning how many passed.
    ///
    /// The plugin must be active. Stops at the first failing case.
    pub fn run_test_cases(&mut self, name: &str) -> PluginResult<usize> {
        let cases = self
            .get(name)
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))?
            .test_cases();

        for (case_index, case) in cases.iter().enumerate() {
            let entry: Entry =
                serde_json::from_value(case.entry.clone()).map_err(PluginError::InvalidEntry)?;
            let outputs = self.analyse(name, entry, &case.params)?;
            let first = outputs
                .first()
                .map(serde_json::to_value)
                .transpose()
                .map_err(PluginError::InvalidEntry)?;
            let passed = first.is_some_and(|actual| matches_template(&actual, &case.expected));
            if !passed {
                return Err(PluginError::TestCaseFailed {
                    plugin: name.to_string(),
                    case_index,
                });
            }
        }
        Ok(cases.len())
    }

    fn plugin_mut(&mut self, name: &str) -> PluginResult<&mut Box<dyn AnalysisPlugin>> {
        self.plugins
            .get_mut(name)
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }
}
