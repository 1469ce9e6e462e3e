//! Dynamic extras values.
//!
//! # Responsibility
//! - Model the caller-supplied extras payload as a closed set of variants.
//! - Model the host-side (bundle) value set produced by the extras engine.
//!
//! # Invariants
//! - `null` is never a valid extras value, at any nesting depth.
//! - `BundleValue` has no floating-point variant at the top level.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-side extras mapping.
pub type ExtraMap = BTreeMap<String, ExtraValue>;

/// Host-side extras mapping, after coercion.
pub type BundleMap = BTreeMap<String, BundleValue>;

/// One caller-supplied extras value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    List(Vec<ExtraValue>),
    Map(ExtraMap),
}

impl ExtraValue {
    /// Stable type label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Converts one JSON value, naming `path` in the error when a `null` is found.
    pub fn from_json_at(value: Value, path: &str) -> Result<Self, ExtraValueError> {
        match value {
            Value::Null => Err(ExtraValueError::NullValue(path.to_string())),
            Value::Bool(flag) => Ok(Self::Bool(flag)),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => Ok(Self::Integer(integer)),
                None => number
                    .as_f64()
                    .map(Self::Float)
                    .ok_or_else(|| ExtraValueError::UnrepresentableNumber(path.to_string())),
            },
            Value::String(text) => Ok(Self::String(text)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| Self::from_json_at(item, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(key, item)| {
                    let child = format!("{path}.{key}");
                    Self::from_json_at(item, &child).map(|converted| (key, converted))
                })
                .collect::<Result<ExtraMap, _>>()
                .map(Self::Map),
        }
    }
}

impl From<i64> for ExtraValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ExtraValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl Display for ExtraValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::String(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::List(_) | Self::Map(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str(self.kind()),
            },
        }
    }
}

impl<'de> Deserialize<'de> for ExtraValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json_at(value, "$").map_err(D::Error::custom)
    }
}

/// Extras value conversion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraValueError {
    NullValue(String),
    UnrepresentableNumber(String),
}

impl Display for ExtraValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullValue(path) => write!(f, "extras value at `{path}` must not be null"),
            Self::UnrepresentableNumber(path) => {
                write!(f, "extras number at `{path}` is not representable")
            }
        }
    }
}

impl Error for ExtraValueError {}

/// One host-side extras value.
///
/// Serialized with an explicit `type` tag so host bridges can pick the
/// matching typed setter (`int` vs `long`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BundleValue {
    Int(i32),
    Long(i64),
    Bool(bool),
    String(String),
    List(Vec<ExtraValue>),
    Map(ExtraMap),
}

impl BundleValue {
    /// Stable type label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Bool(_) => "boolean",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl Display for BundleValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
            Self::List(items) => write!(f, "{}", ExtraValue::List(items.clone())),
            Self::Map(entries) => write!(f, "{}", ExtraValue::Map(entries.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BundleValue, ExtraValue, ExtraValueError};
    use serde_json::json;

    #[test]
    fn converts_json_scalars_into_closed_variants() {
        assert_eq!(
            ExtraValue::from_json_at(json!(3), "count").expect("integer"),
            ExtraValue::Integer(3)
        );
        assert_eq!(
            ExtraValue::from_json_at(json!(3.0), "count").expect("float"),
            ExtraValue::Float(3.0)
        );
        assert_eq!(
            ExtraValue::from_json_at(json!("LONG7"), "id").expect("string"),
            ExtraValue::String("LONG7".to_string())
        );
        assert_eq!(
            ExtraValue::from_json_at(json!(true), "flag").expect("bool"),
            ExtraValue::Bool(true)
        );
    }

    #[test]
    fn rejects_nested_null_with_path() {
        let err = ExtraValue::from_json_at(json!({"a": [1, null]}), "outer")
            .expect_err("nested null must fail");
        assert_eq!(err, ExtraValueError::NullValue("outer.a[1]".to_string()));
    }

    #[test]
    fn bundle_values_serialize_with_type_tag() {
        let json = serde_json::to_value(BundleValue::Long(42)).expect("serialize");
        assert_eq!(json, json!({"type": "long", "value": 42}));
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(ExtraValue::Float(3.0).to_string(), "3.0");
        assert_eq!(ExtraValue::Integer(3).to_string(), "3");
    }
}
