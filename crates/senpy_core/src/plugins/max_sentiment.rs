//! Max-emotion reducer.
//!
//! # Responsibility
//! - Collapse the primary emotion set of an entry to its strongest emotion.
//! - Substitute a `neutral` emotion when every intensity is zero.
//! - Stamp the primary set with this plugin's provenance id.
//!
//! # Invariants
//! - Only `entry.emotions[0]` is touched; secondary sets pass through.
//! - Ties keep the earliest emotion (strict `>` scan).
//! - Without `max`, the emotion list is left exactly as received.

use crate::model::entry::{Emotion, Entry};
use crate::plugin::kernel::AnalysisPlugin;
use crate::plugin::manifest::PluginManifest;
use crate::plugin::params::{ParamError, ParamSpec, ResolvedParams};
use crate::plugin::template::PluginTestCase;
use crate::plugin::{EntryStream, PluginResult, PreconditionViolation};
use log::debug;
use serde_json::{json, Map, Value};
use std::iter;

/// Provenance id written to `prov:wasGeneratedBy`.
pub const MAX_SENTIMENT_ID: &str = "maxSentiment";
pub const MAX_SENTIMENT_VERSION: &str = "0.1";
/// Canonical name of the reduction flag.
pub const MAX_PARAM: &str = "max";
pub const NEUTRAL_CATEGORY: &str = "neutral";
/// Intensity assigned to the synthesized neutral emotion.
pub const NEUTRAL_INTENSITY: f64 = 1.0;

/// Typed view of the plugin's resolved parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxSentimentParams {
    /// Reduce the primary set to its strongest emotion.
    pub keep_max: bool,
}

impl MaxSentimentParams {
    pub fn from_resolved(params: &ResolvedParams) -> Result<Self, ParamError> {
        if !params.contains(MAX_PARAM) {
            return Err(ParamError::MissingParameter(MAX_PARAM.to_string()));
        }
        params
            .get_bool(MAX_PARAM)
            .map(|keep_max| Self { keep_max })
            .ok_or_else(|| ParamError::InvalidValue {
                param: MAX_PARAM.to_string(),
                expected: "boolean",
            })
    }
}

/// Index of the first emotion with the greatest intensity.
pub fn max_emotion_index(emotions: &[Emotion]) -> Option<usize> {
    let first = emotions.first()?;
    let mut best = 0;
    let mut best_intensity = first.intensity;
    for (index, emotion) in emotions.iter().enumerate().skip(1) {
        if emotion.intensity > best_intensity {
            best = index;
            best_intensity = emotion.intensity;
        }
    }
    Some(best)
}

/// Applies the reduction to `entry` in place.
pub fn reduce_entry(entry: &mut Entry, keep_max: bool) -> Result<(), PreconditionViolation> {
    let set = entry
        .emotions
        .first_mut()
        .ok_or(PreconditionViolation::NoEmotionSets)?;

    if keep_max {
        let index = max_emotion_index(&set.emotions)
            .ok_or(PreconditionViolation::EmptyEmotionSet { set_index: 0 })?;
        let mut winner = set.emotions.swap_remove(index);
        if winner.intensity == 0.0 {
            winner.category = NEUTRAL_CATEGORY.to_string();
            winner.intensity = NEUTRAL_INTENSITY;
        }
        debug!(
            "event=emotion_reduce module=max_sentiment status=ok candidates={} neutral={}",
            set.emotions.len() + 1,
            winner.category == NEUTRAL_CATEGORY
        );
        set.emotions = vec![winner];
    }

    set.generated_by = Some(MAX_SENTIMENT_ID.to_string());
    Ok(())
}

/// Reduces `entry` and yields it as a one-item stream.
pub fn reduce(
    mut entry: Entry,
    keep_max: bool,
) -> Result<iter::Once<Entry>, PreconditionViolation> {
    reduce_entry(&mut entry, keep_max)?;
    Ok(iter::once(entry))
}

/// Analysis plugin wrapping [`reduce`].
#[derive(Debug, Clone)]
pub struct MaxSentimentPlugin {
    manifest: PluginManifest,
}

impl MaxSentimentPlugin {
    pub fn new() -> Self {
        Self {
            manifest: Self::default_manifest(),
        }
    }

    /// `max` flag: aliases `maximum`/`max`, required, defaults to `false`.
    pub fn default_manifest() -> PluginManifest {
        let mut manifest = PluginManifest::new(MAX_SENTIMENT_ID, MAX_SENTIMENT_VERSION)
            .with_param(MAX_PARAM, ParamSpec::boolean_flag(&["maximum", "max"], false));
        manifest.author = Some("@dsuarezsouto".to_string());
        manifest.description =
            "Extracts the strongest emotion from a multi-emotion set".to_string();
        manifest
    }
}

impl Default for MaxSentimentPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisPlugin for MaxSentimentPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn analyse_entry(
        &mut self,
        entry: Entry,
        params: &ResolvedParams,
    ) -> PluginResult<EntryStream> {
        let params = MaxSentimentParams::from_resolved(params)?;
        let stream = reduce(entry, params.keep_max)?;
        Ok(Box::new(stream))
    }

    fn test_cases(&self) -> Vec<PluginTestCase> {
        vec![
            reference_case(
                [0.0, 0.3333333333333333, 0.0, 0.0, 0.0],
                json!({"onyx:hasEmotionCategory": "joy", "onyx:hasEmotionIntensity": 0.3333333333333333}),
            ),
            reference_case(
                [0.0; 5],
                json!({"onyx:hasEmotionCategory": "neutral", "onyx:hasEmotionIntensity": 1}),
            ),
        ]
    }
}

const REFERENCE_CATEGORIES: [&str; 5] = ["anger", "joy", "negative-fear", "sadness", "disgust"];
const REFERENCE_TEXT: &str = "This text makes me sad.\nwhilst this text makes me happy and surprised at the same time.\nI cannot believe it!";

fn reference_case(intensities: [f64; 5], expected_emotion: Value) -> PluginTestCase {
    let emotions: Vec<Value> = REFERENCE_CATEGORIES
        .iter()
        .zip(intensities)
        .map(|(category, intensity)| {
            json!({
                "@id": "_:Emotion_1538121033.74",
                "@type": "emotion",
                "onyx:hasEmotionCategory": category,
                "onyx:hasEmotionIntensity": intensity
            })
        })
        .collect();

    let mut params = Map::new();
    params.insert(MAX_PARAM.to_string(), Value::Bool(true));

    PluginTestCase {
        entry: json!({
            "@id": "#",
            "@type": "entry",
            "emotions": [{
                "@id": "Emotions0",
                "@type": "emotionSet",
                "onyx:hasEmotion": emotions,
                "prov:wasGeneratedBy": "maxSentiment_plugin"
            }],
            "entities": [],
            "nif:isString": REFERENCE_TEXT,
            "sentiments": [],
            "suggestions": [],
            "topics": []
        }),
        params,
        expected: json!({
            "@id": "#",
            "@type": "entry",
            "emotions": [{
                "@id": "Emotions0",
                "@type": "emotionSet",
                "onyx:hasEmotion": [expected_emotion],
                "prov:wasGeneratedBy": MAX_SENTIMENT_ID
            }],
            "nif:isString": REFERENCE_TEXT
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{max_emotion_index, reduce_entry, MaxSentimentParams, MAX_SENTIMENT_ID};
    use crate::model::entry::{Emotion, EmotionSet, Entry};
    use crate::plugin::params::{ParamError, ResolvedParams};
    use crate::plugin::PreconditionViolation;
    use serde_json::json;

    fn emotions(intensities: &[f64]) -> Vec<Emotion> {
        intensities
            .iter()
            .enumerate()
            .map(|(index, intensity)| Emotion::new(format!("e{index}"), *intensity))
            .collect()
    }

    #[test]
    fn first_maximum_wins_ties() {
        assert_eq!(max_emotion_index(&emotions(&[0.2, 0.7, 0.7, 0.1])), Some(1));
        assert_eq!(max_emotion_index(&emotions(&[0.5])), Some(0));
        assert_eq!(max_emotion_index(&[]), None);
    }

    #[test]
    fn later_strictly_greater_value_replaces_earlier() {
        assert_eq!(max_emotion_index(&emotions(&[0.1, 0.2, 0.9])), Some(2));
    }

    #[test]
    fn nan_intensity_never_displaces_a_real_maximum() {
        assert_eq!(max_emotion_index(&emotions(&[0.5, f64::NAN])), Some(0));
        assert_eq!(max_emotion_index(&emotions(&[0.0, f64::NAN, 0.3])), Some(2));
    }

    #[test]
    fn empty_set_is_reported_only_when_reducing() {
        let mut entry = Entry::new(vec![EmotionSet::new(vec![])]);
        assert_eq!(
            reduce_entry(&mut entry, true),
            Err(PreconditionViolation::EmptyEmotionSet { set_index: 0 })
        );
        assert_eq!(reduce_entry(&mut entry, false), Ok(()));
        assert_eq!(
            entry.emotions[0].generated_by.as_deref(),
            Some(MAX_SENTIMENT_ID)
        );
    }

    #[test]
    fn params_require_boolean_max() {
        let mut params = ResolvedParams::new();
        assert!(matches!(
            MaxSentimentParams::from_resolved(&params),
            Err(ParamError::MissingParameter(_))
        ));
        params.insert("max", json!("yes"));
        assert!(matches!(
            MaxSentimentParams::from_resolved(&params),
            Err(ParamError::InvalidValue { .. })
        ));
        params.insert("max", json!(true));
        assert_eq!(
            MaxSentimentParams::from_resolved(&params),
            Ok(MaxSentimentParams { keep_max: true })
        );
    }
}
