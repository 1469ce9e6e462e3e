//! Platform launch directive.
//!
//! The directive is the host-facing form of a [`LaunchRequest`]: extras are
//! already coerced and data/type are folded into one payload shape.

use crate::extras::{transform_extras, ExtraTransformError};
use crate::model::extra::BundleMap;
use crate::model::request::LaunchRequest;
use serde::Serialize;
use std::collections::BTreeSet;

/// Target component selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentTarget {
    /// Explicit component in another package.
    Explicit {
        package_name: String,
        class_name: String,
    },
    /// Class resolved against the launching process's own package.
    OwnPackage { class_name: String },
}

/// Data URI and MIME type, applied jointly when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectivePayload {
    Data { uri: String },
    Type { mime_type: String },
    DataAndType { uri: String, mime_type: String },
}

impl DirectivePayload {
    /// Folds independent optional data/type into one payload.
    pub fn from_parts(data: Option<&str>, mime_type: Option<&str>) -> Option<Self> {
        match (data, mime_type) {
            (Some(uri), Some(mime_type)) => Some(Self::DataAndType {
                uri: uri.to_string(),
                mime_type: mime_type.to_string(),
            }),
            (Some(uri), None) => Some(Self::Data {
                uri: uri.to_string(),
            }),
            (None, Some(mime_type)) => Some(Self::Type {
                mime_type: mime_type.to_string(),
            }),
            (None, None) => None,
        }
    }
}

/// Host-facing launch directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchDirective {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<DirectivePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<BundleMap>,
    pub flags: i32,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
}

impl LaunchDirective {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            component: None,
            payload: None,
            extras: None,
            flags: 0,
            categories: BTreeSet::new(),
        }
    }

    /// Builds a directive from a validated request.
    ///
    /// # Errors
    /// - Propagates extras coercion failures; nothing is built in that case.
    pub fn from_request(request: &LaunchRequest) -> Result<Self, ExtraTransformError> {
        let mut directive = Self::new(request.action.clone());

        if let Some(class_name) = &request.class_name {
            directive.component = Some(match &request.package_name {
                Some(package_name) => ComponentTarget::Explicit {
                    package_name: package_name.clone(),
                    class_name: class_name.clone(),
                },
                None => ComponentTarget::OwnPackage {
                    class_name: class_name.clone(),
                },
            });
        }

        directive.payload =
            DirectivePayload::from_parts(request.data.as_deref(), request.mime_type.as_deref());

        if let Some(extras) = &request.extras {
            directive.put_extras(transform_extras(extras)?);
        }
        if let Some(flags) = request.flags {
            directive.add_flags(flags);
        }
        if let Some(category) = &request.category {
            directive.add_category(category.clone());
        }
        Ok(directive)
    }

    /// Merges extras into the directive. Empty mappings are not attached.
    pub fn put_extras(&mut self, extras: BundleMap) {
        if extras.is_empty() {
            return;
        }
        self.extras.get_or_insert_with(BundleMap::new).extend(extras);
    }

    pub fn add_flags(&mut self, flags: i32) {
        self.flags |= flags;
    }

    pub fn add_category(&mut self, category: impl Into<String>) {
        self.categories.insert(category.into());
    }

    pub fn data(&self) -> Option<&str> {
        match &self.payload {
            Some(DirectivePayload::Data { uri })
            | Some(DirectivePayload::DataAndType { uri, .. }) => Some(uri.as_str()),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match &self.payload {
            Some(DirectivePayload::Type { mime_type })
            | Some(DirectivePayload::DataAndType { mime_type, .. }) => Some(mime_type.as_str()),
            _ => None,
        }
    }
}
