//! Built-in analysis plugins.

pub mod max_sentiment;
