//! Completion notification and result payload shapes.

use crate::model::extra::ExtraMap;
use serde::{Deserialize, Serialize};

/// Host result code: the activity finished successfully.
pub const RESULT_OK: i32 = -1;
/// Host result code: the activity was cancelled or returned nothing.
pub const RESULT_CANCELED: i32 = 0;
/// Host result code: first value available for activity-defined codes.
pub const RESULT_FIRST_USER: i32 = 1;

/// Raw completion event delivered by the host environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionNotification {
    /// Tag echoed back from the launch that caused this event.
    pub correlation_tag: i32,
    pub result_code: i32,
    /// Returned data URI, if the activity produced one.
    #[serde(default)]
    pub data: Option<String>,
    /// Structured extras attached to the returned data.
    #[serde(default, alias = "extra")]
    pub extras: Option<ExtraMap>,
}

impl CompletionNotification {
    pub fn new(correlation_tag: i32, result_code: i32) -> Self {
        Self {
            correlation_tag,
            result_code,
            data: None,
            extras: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_extras(mut self, extras: ExtraMap) -> Self {
        self.extras = Some(extras);
        self
    }
}

/// Result payload resolved to the caller.
///
/// Serializes as `{ "resultCode": int, "data"?: string, "extra"?: map }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResult {
    pub result_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraMap>,
}

impl LaunchResult {
    /// Builds the caller payload from a matching notification.
    ///
    /// Extras are copied only alongside returned data; empty extras are
    /// treated as absent.
    pub fn from_notification(notification: CompletionNotification) -> Self {
        let CompletionNotification {
            result_code,
            data,
            extras,
            ..
        } = notification;
        let extra = if data.is_some() {
            extras.filter(|extras| !extras.is_empty())
        } else {
            None
        };
        Self {
            result_code,
            data,
            extra,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }

    pub fn is_canceled(&self) -> bool {
        self.result_code == RESULT_CANCELED
    }
}
