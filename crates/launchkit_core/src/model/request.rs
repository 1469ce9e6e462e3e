//! Launch request model.
//!
//! # Responsibility
//! - Describe what to launch and how, independent of any host API.
//! - Parse loosely-typed caller input (JSON) into a typed request.
//!
//! # Invariants
//! - `action` is non-empty after trimming.
//! - All other fields pass through unchanged; component names are not
//!   checked here.

use crate::model::extra::{ExtraMap, ExtraValue, ExtraValueError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validated description of one external launch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaunchRequest {
    /// Opaque host-defined verb, e.g. `android.intent.action.VIEW`.
    pub action: String,
    /// Explicit target package. Only meaningful together with `class_name`.
    pub package_name: Option<String>,
    /// Target component class. Resolved against the own package when
    /// `package_name` is absent.
    pub class_name: Option<String>,
    /// Data URI in textual form.
    pub data: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Caller-owned extras, coerced before reaching the host.
    pub extras: Option<ExtraMap>,
    /// Host flag bitmask, OR-ed into the directive.
    pub flags: Option<i32>,
    /// Host category.
    pub category: Option<String>,
}

impl LaunchRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Inserts one extras entry, creating the mapping on first use.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.extras
            .get_or_insert_with(ExtraMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_flags(mut self, flags: i32) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Validates request-level invariants.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.action.trim().is_empty() {
            return Err(RequestValidationError::EmptyAction);
        }
        Ok(())
    }

    /// Parses a full request object where `action` is one of the fields.
    ///
    /// # Errors
    /// - `MissingAction` when the object has no `action` field.
    /// - See [`LaunchRequest::from_parts`] for the remaining cases.
    pub fn from_json(value: &Value) -> Result<Self, RequestValidationError> {
        let Some(object) = value.as_object() else {
            return Err(RequestValidationError::NotAnObject);
        };
        let action = match object.get("action") {
            None | Some(Value::Null) => return Err(RequestValidationError::MissingAction),
            Some(Value::String(action)) => action.clone(),
            Some(_) => {
                return Err(RequestValidationError::MalformedParams(
                    "field `action` must be a string".to_string(),
                ))
            }
        };
        let mut params = object.clone();
        params.remove("action");
        Self::from_parts(&action, &Value::Object(params))
    }

    /// Parses `params` for the given `action`, the shape used by the inbound
    /// `launch(action, params)` call.
    ///
    /// `params` may be `null` (no optional fields). Unknown keys are ignored.
    ///
    /// # Errors
    /// - `EmptyAction` when `action` is blank.
    /// - `NotAnObject` when `params` is neither `null` nor an object.
    /// - `MalformedParams` when a known field has the wrong JSON type.
    /// - `InvalidExtra` when an extras value is `null`.
    pub fn from_parts(action: &str, params: &Value) -> Result<Self, RequestValidationError> {
        let params = match params {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(RequestValidationError::NotAnObject),
        };

        let raw: RawLaunchParams = serde_json::from_value(Value::Object(params))
            .map_err(|err| RequestValidationError::MalformedParams(err.to_string()))?;

        let extras = match raw.extra {
            Some(entries) => Some(
                entries
                    .into_iter()
                    .map(|(key, value)| {
                        ExtraValue::from_json_at(value, &key).map(|converted| (key, converted))
                    })
                    .collect::<Result<ExtraMap, _>>()
                    .map_err(RequestValidationError::InvalidExtra)?,
            ),
            None => None,
        };

        let request = Self {
            action: action.to_string(),
            package_name: raw.package_name,
            class_name: raw.class_name,
            data: raw.data,
            mime_type: raw.mime_type,
            extras,
            flags: raw.flags,
            category: raw.category,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Wire shape of caller params before extras conversion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLaunchParams {
    #[serde(default)]
    package_name: Option<String>,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default, rename = "type")]
    mime_type: Option<String>,
    #[serde(default, alias = "extras")]
    extra: Option<Map<String, Value>>,
    #[serde(default)]
    flags: Option<i32>,
    #[serde(default)]
    category: Option<String>,
}

/// Request parse/validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    MissingAction,
    EmptyAction,
    NotAnObject,
    MalformedParams(String),
    InvalidExtra(ExtraValueError),
}

impl Display for RequestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAction => write!(f, "launch request is missing `action`"),
            Self::EmptyAction => write!(f, "launch request `action` must not be empty"),
            Self::NotAnObject => write!(f, "launch params must be a JSON object"),
            Self::MalformedParams(message) => write!(f, "launch params are malformed: {message}"),
            Self::InvalidExtra(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RequestValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidExtra(err) => Some(err),
            _ => None,
        }
    }
}
