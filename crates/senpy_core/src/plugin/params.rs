//! Extra parameter declarations and resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declaration of one plugin parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Accepted input names, checked in order. Empty means the canonical
    /// parameter name only.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    /// Allowed values; `None` accepts anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
}

impl ParamSpec {
    /// Required boolean flag with `[true, false]` options.
    pub fn boolean_flag(aliases: &[&str], default: bool) -> Self {
        Self {
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            default: Some(Value::Bool(default)),
            required: true,
            options: Some(vec![Value::Bool(true), Value::Bool(false)]),
        }
    }

    /// Names looked up in caller input for parameter `name`.
    pub fn lookup_names<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        if self.aliases.is_empty() {
            return vec![name];
        }
        self.aliases.iter().map(String::as_str).collect()
    }

    /// Whether every declared option is a boolean.
    pub fn is_boolean(&self) -> bool {
        match &self.options {
            Some(options) => !options.is_empty() && options.iter().all(Value::is_boolean),
            None => matches!(self.default, Some(Value::Bool(_))),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match &self.options {
            Some(options) => options.contains(value),
            None => true,
        }
    }
}

/// Parameter values after alias, default and option resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<String, Value>,
}

impl ResolvedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    MissingParameter(String),
    InvalidOption { param: String, value: String },
    InvalidValue { param: String, expected: &'static str },
}

impl Display for ParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParameter(param) => write!(f, "missing required parameter: {param}"),
            Self::InvalidOption { param, value } => {
                write!(f, "value {value} is not a valid option for parameter {param}")
            }
            Self::InvalidValue { param, expected } => {
                write!(f, "parameter {param} expects a {expected} value")
            }
        }
    }
}

impl Error for ParamError {}

/// Resolves caller input against declared parameter specs.
///
/// # Contract
/// - The first alias present in `raw` wins.
/// - Absent parameters fall back to their default.
/// - Required parameters without input or default fail.
/// - Boolean parameters accept `true|false|yes|no|1|0` strings.
/// - Inputs not named by any spec are ignored.
pub fn resolve_params(
    specs: &BTreeMap<String, ParamSpec>,
    raw: &Map<String, Value>,
) -> Result<ResolvedParams, ParamError> {
    let mut resolved = ResolvedParams::new();
    for (name, spec) in specs {
        let provided = spec
            .lookup_names(name)
            .into_iter()
            .find_map(|alias| raw.get(alias));

        let value = match provided {
            Some(value) => Some(coerce_value(name, spec, value)?),
            None => spec.default.clone(),
        };

        match value {
            Some(value) => {
                if !spec.accepts(&value) {
                    return Err(ParamError::InvalidOption {
                        param: name.clone(),
                        value: value.to_string(),
                    });
                }
                resolved.insert(name.clone(), value);
            }
            None if spec.required => return Err(ParamError::MissingParameter(name.clone())),
            None => {}
        }
    }
    Ok(resolved)
}

fn coerce_value(name: &str, spec: &ParamSpec, value: &Value) -> Result<Value, ParamError> {
    if !spec.is_boolean() {
        return Ok(value.clone());
    }
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(raw) => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| ParamError::InvalidValue {
                param: name.to_string(),
                expected: "boolean",
            }),
        Value::Number(number) => match number.as_u64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(ParamError::InvalidValue {
                param: name.to_string(),
                expected: "boolean",
            }),
        },
        _ => Err(ParamError::InvalidValue {
            param: name.to_string(),
            expected: "boolean",
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, resolve_params, ParamError, ParamSpec};
    use serde_json::{json, Map, Value};
    use std::collections::BTreeMap;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" no "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn aliases_default_to_parameter_name() {
        let spec = ParamSpec {
            aliases: vec![],
            default: None,
            required: true,
            options: None,
        };
        assert_eq!(spec.lookup_names("language"), vec!["language"]);

        let specs = BTreeMap::from([("language".to_string(), spec)]);
        let resolved = resolve_params(&specs, &raw(json!({"language": "es"}))).expect("resolve");
        assert_eq!(resolved.get("language"), Some(&json!("es")));
    }

    #[test]
    fn optional_parameter_without_default_is_omitted() {
        let specs = BTreeMap::from([(
            "example".to_string(),
            ParamSpec {
                aliases: vec!["example".to_string(), "ex".to_string()],
                default: None,
                required: false,
                options: None,
            },
        )]);
        let resolved = resolve_params(&specs, &Map::new()).expect("resolve");
        assert!(!resolved.contains("example"));
    }

    #[test]
    fn numeric_flags_outside_zero_one_are_rejected() {
        let specs = BTreeMap::from([("max".to_string(), ParamSpec::boolean_flag(&["max"], false))]);
        let err = resolve_params(&specs, &raw(json!({"max": 2}))).expect_err("2 is not a flag");
        assert!(matches!(err, ParamError::InvalidValue { .. }));
    }
}
