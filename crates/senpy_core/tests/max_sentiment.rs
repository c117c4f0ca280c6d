use senpy_core::{
    builtin_registry, reduce, reduce_entry, Emotion, EmotionSet, Entry, PluginError,
    PreconditionViolation, MAX_SENTIMENT_ID,
};
use serde_json::{json, Map, Value};

const CATEGORIES: [&str; 5] = ["anger", "joy", "negative-fear", "sadness", "disgust"];

fn entry_with(intensities: &[f64]) -> Entry {
    let emotions = CATEGORIES
        .iter()
        .zip(intensities)
        .map(|(category, intensity)| Emotion::new(*category, *intensity))
        .collect();
    Entry::new(vec![EmotionSet::new(emotions)])
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn keeps_strongest_emotion() {
    let entry = entry_with(&[0.0, 0.3333333333333333, 0.0, 0.0, 0.0]);
    let mut output: Vec<Entry> = reduce(entry, true).unwrap().collect();
    assert_eq!(output.len(), 1);

    let entry = output.remove(0);
    let set = &entry.emotions[0];
    assert_eq!(set.emotions.len(), 1);
    assert_eq!(set.emotions[0].category, "joy");
    assert_eq!(set.emotions[0].intensity, 0.3333333333333333);
    assert_eq!(set.generated_by.as_deref(), Some(MAX_SENTIMENT_ID));
}

#[test]
fn all_zero_intensities_become_neutral() {
    let mut entry = entry_with(&[0.0; 5]);
    reduce_entry(&mut entry, true).unwrap();

    let set = &entry.emotions[0];
    assert_eq!(set.emotions.len(), 1);
    assert_eq!(set.emotions[0].category, "neutral");
    assert_eq!(set.emotions[0].intensity, 1.0);
}

#[test]
fn reduced_emotion_dominates_every_input() {
    let cases: [&[f64]; 6] = [
        &[0.9],
        &[0.1, 0.2, 0.3, 0.4, 0.5],
        &[0.5, 0.4, 0.3, 0.2, 0.1],
        &[0.25, 0.75, 0.75, 0.0, 0.5],
        &[0.0, 0.0, 0.01, 0.0, 0.0],
        &[1.0, 1.0, 1.0, 1.0, 1.0],
    ];

    for intensities in cases {
        let mut entry = entry_with(intensities);
        reduce_entry(&mut entry, true).unwrap();
        let winner = &entry.emotions[0].emotions;
        assert_eq!(winner.len(), 1, "input {intensities:?}");
        for intensity in intensities {
            assert!(winner[0].intensity >= *intensity, "input {intensities:?}");
        }
    }
}

#[test]
fn ties_keep_first_emotion() {
    let mut entry = entry_with(&[0.2, 0.6, 0.6, 0.6, 0.1]);
    reduce_entry(&mut entry, true).unwrap();
    assert_eq!(entry.emotions[0].emotions[0].category, "joy");
}

#[test]
fn without_max_only_provenance_changes() {
    let original = entry_with(&[0.1, 0.2, 0.0, 0.4, 0.3]);
    let mut entry = original.clone();
    reduce_entry(&mut entry, false).unwrap();

    assert_eq!(entry.emotions[0].emotions, original.emotions[0].emotions);
    assert_eq!(
        entry.emotions[0].generated_by.as_deref(),
        Some(MAX_SENTIMENT_ID)
    );
    assert_eq!(entry.extra, original.extra);
}

#[test]
fn secondary_emotion_sets_are_untouched() {
    let mut entry = entry_with(&[0.1, 0.9, 0.0, 0.0, 0.0]);
    let mut secondary = EmotionSet::new(vec![Emotion::new("fear", 0.0), Emotion::new("joy", 0.0)]);
    secondary.generated_by = Some("upstream".to_string());
    entry.emotions.push(secondary.clone());

    reduce_entry(&mut entry, true).unwrap();
    assert_eq!(entry.emotions.len(), 2);
    assert_eq!(entry.emotions[1], secondary);
}

#[test]
fn reducer_preserves_emotion_and_entry_metadata() {
    let raw = json!({
        "@id": "#",
        "@type": "entry",
        "emotions": [{
            "@id": "Emotions0",
            "@type": "emotionSet",
            "onyx:hasEmotion": [
                {"@id": "_:a", "@type": "emotion", "onyx:hasEmotionCategory": "anger", "onyx:hasEmotionIntensity": 0.2},
                {"@id": "_:b", "@type": "emotion", "onyx:hasEmotionCategory": "joy", "onyx:hasEmotionIntensity": 0.8}
            ]
        }],
        "nif:isString": "some text",
        "topics": []
    });
    let mut entry: Entry = serde_json::from_value(raw).unwrap();
    reduce_entry(&mut entry, true).unwrap();

    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["nif:isString"], "some text");
    assert_eq!(value["topics"], json!([]));
    assert_eq!(value["emotions"][0]["@id"], "Emotions0");
    assert_eq!(value["emotions"][0]["prov:wasGeneratedBy"], MAX_SENTIMENT_ID);
    assert_eq!(
        value["emotions"][0]["onyx:hasEmotion"],
        json!([{"@id": "_:b", "@type": "emotion", "onyx:hasEmotionCategory": "joy", "onyx:hasEmotionIntensity": 0.8}])
    );
}

#[test]
fn entry_without_emotion_sets_is_a_precondition_violation() {
    let mut entry = Entry::new(vec![]);
    assert_eq!(
        reduce_entry(&mut entry, true),
        Err(PreconditionViolation::NoEmotionSets)
    );
    assert_eq!(
        reduce_entry(&mut entry, false),
        Err(PreconditionViolation::NoEmotionSets)
    );
}

#[test]
fn registry_resolves_maximum_alias() {
    let mut registry = builtin_registry().unwrap();
    registry.activate(MAX_SENTIMENT_ID).unwrap();

    let output = registry
        .analyse(
            MAX_SENTIMENT_ID,
            entry_with(&[0.3, 0.1, 0.0, 0.6, 0.2]),
            &params(json!({"maximum": "true"})),
        )
        .unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].emotions[0].emotions[0].category, "sadness");
}

#[test]
fn registry_defaults_to_no_reduction() {
    let mut registry = builtin_registry().unwrap();
    registry.activate(MAX_SENTIMENT_ID).unwrap();

    let output = registry
        .analyse(MAX_SENTIMENT_ID, entry_with(&[0.3, 0.1, 0.0, 0.6, 0.2]), &Map::new())
        .unwrap();
    assert_eq!(output[0].emotions[0].emotions.len(), 5);
}

#[test]
fn registry_surfaces_empty_emotion_set() {
    let mut registry = builtin_registry().unwrap();
    registry.activate(MAX_SENTIMENT_ID).unwrap();

    let err = registry
        .analyse(
            MAX_SENTIMENT_ID,
            Entry::new(vec![EmotionSet::new(vec![])]),
            &params(json!({"max": true})),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PluginError::Precondition(PreconditionViolation::EmptyEmotionSet { set_index: 0 })
    ));
}

#[test]
fn registry_rejects_non_boolean_max() {
    let mut registry = builtin_registry().unwrap();
    registry.activate(MAX_SENTIMENT_ID).unwrap();

    let err = registry
        .analyse(
            MAX_SENTIMENT_ID,
            entry_with(&[0.3, 0.1, 0.0, 0.6, 0.2]),
            &params(json!({"max": "sometimes"})),
        )
        .unwrap_err();
    assert!(matches!(err, PluginError::Params(_)));
}

#[test]
fn built_in_test_cases_pass() {
    let mut registry = builtin_registry().unwrap();
    registry.activate(MAX_SENTIMENT_ID).unwrap();
    assert_eq!(registry.run_test_cases(MAX_SENTIMENT_ID).unwrap(), 2);
}
