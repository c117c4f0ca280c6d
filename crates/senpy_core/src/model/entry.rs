//! Entry and emotion annotation records.
//!
//! # Responsibility
//! - Model one analyzed entry and the emotion sets attached to it.
//! - Keep unrecognized JSON-LD properties in flattened `extra` maps.
//!
//! # Invariants
//! - `Entry::emotions` keeps upstream order; index 0 is the primary set.
//! - Intensities are conventionally in `[0, 1]` but are not clamped here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One analyzed unit of text plus its derived annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// JSON-LD node id; absent ids stay absent on output.
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Emotion sets produced by upstream analysis stages.
    #[serde(default)]
    pub emotions: Vec<EmotionSet>,
    /// Every other entry property (`nif:isString`, `sentiments`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Creates an anonymous entry holding the given emotion sets.
    pub fn new(emotions: Vec<EmotionSet>) -> Self {
        let mut extra = Map::new();
        extra.insert("@type".to_string(), Value::String("entry".to_string()));
        Self {
            id: Some("#".to_string()),
            emotions,
            extra,
        }
    }
}

/// Bundle of emotion annotations with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSet {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "onyx:hasEmotion", default)]
    pub emotions: Vec<Emotion>,
    /// Identifier of the process that produced this set.
    #[serde(
        rename = "prov:wasGeneratedBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmotionSet {
    pub fn new(emotions: Vec<Emotion>) -> Self {
        let mut extra = Map::new();
        extra.insert(
            "@type".to_string(),
            Value::String("emotionSet".to_string()),
        );
        Self {
            id: None,
            emotions,
            generated_by: None,
            extra,
        }
    }
}

/// A (category, intensity) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "onyx:hasEmotionCategory")]
    pub category: String,
    #[serde(rename = "onyx:hasEmotionIntensity")]
    pub intensity: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Emotion {
    pub fn new(category: impl Into<String>, intensity: f64) -> Self {
        let mut extra = Map::new();
        extra.insert("@type".to_string(), Value::String("emotion".to_string()));
        Self {
            id: None,
            category: category.into(),
            intensity,
            extra,
        }
    }
}
