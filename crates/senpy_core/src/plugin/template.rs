//! Built-in plugin test cases and template matching.
//!
//! A test case pairs an input entry and raw parameters with an expected
//! template. The template matches when every property it names is present in
//! the output with an equal value; extra output properties are ignored.

use serde_json::{Map, Value};

/// Tolerance for numeric comparisons; plugin outputs are f64 intensities.
const FLOAT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct PluginTestCase {
    pub entry: Value,
    pub params: Map<String, Value>,
    pub expected: Value,
}

/// Whether `actual` satisfies `template`.
///
/// Objects match key-by-key on the template's keys, arrays match
/// element-wise with equal length, numbers compare as `f64` (so `1` matches
/// `1.0`).
pub fn matches_template(actual: &Value, template: &Value) -> bool {
    match (actual, template) {
        (Value::Object(actual), Value::Object(template)) => {
            template.iter().all(|(key, expected)| {
                actual
                    .get(key)
                    .is_some_and(|value| matches_template(value, expected))
            })
        }
        (Value::Array(actual), Value::Array(template)) => {
            actual.len() == template.len()
                && actual
                    .iter()
                    .zip(template)
                    .all(|(value, expected)| matches_template(value, expected))
        }
        (Value::Number(actual), Value::Number(template)) => {
            match (actual.as_f64(), template.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() <= FLOAT_TOLERANCE,
                _ => false,
            }
        }
        _ => actual == template,
    }
}

#[cfg(test)]
mod tests {
    use super::matches_template;
    use serde_json::json;

    #[test]
    fn extra_output_keys_are_ignored() {
        let actual = json!({"a": 1, "b": {"c": "x", "d": true}});
        assert!(matches_template(&actual, &json!({"b": {"c": "x"}})));
    }

    #[test]
    fn missing_template_key_fails() {
        assert!(!matches_template(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn integer_template_matches_float_output() {
        assert!(matches_template(&json!(1.0), &json!(1)));
        assert!(!matches_template(&json!(0.5), &json!(1)));
    }

    #[test]
    fn arrays_must_have_equal_length() {
        assert!(!matches_template(&json!([1, 2]), &json!([1])));
        assert!(matches_template(&json!([{"k": 1, "x": 2}]), &json!([{"k": 1}])));
    }
}
