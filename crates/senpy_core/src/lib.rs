//! Emotion post-processing plugins and plugin state persistence.
//! The core is synchronous and performs no network I/O.

pub mod logging;
pub mod model;
pub mod plugin;
pub mod plugins;
pub mod shelf;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::entry::{Emotion, EmotionSet, Entry};
pub use plugin::kernel::{AnalysisPlugin, PluginRegistry};
pub use plugin::manifest::{ManifestValidationError, PluginManifest};
pub use plugin::params::{resolve_params, ParamError, ParamSpec, ResolvedParams};
pub use plugin::shelf::PluginShelf;
pub use plugin::template::{matches_template, PluginTestCase};
pub use plugin::{EntryStream, PluginError, PluginResult, PreconditionViolation};
pub use plugins::max_sentiment::{
    reduce, reduce_entry, MaxSentimentParams, MaxSentimentPlugin, MAX_SENTIMENT_ID,
};
pub use shelf::{default_shelf_path, with_shelf, Shelf, ShelfConfig, ShelfError, ShelfResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Registry preloaded with every built-in plugin.
pub fn builtin_registry() -> PluginResult<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    registry.register(Box::new(MaxSentimentPlugin::new()))?;
    Ok(registry)
}
