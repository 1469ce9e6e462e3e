//! Launch error taxonomy.

use crate::extras::ExtraTransformError;
use crate::launch::host::HostLaunchError;
use crate::model::request::RequestValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Launch failure kinds. None of them is fatal to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    /// Request failed validation; no state was touched.
    InvalidRequest(RequestValidationError),
    /// Another launch is already awaiting its result.
    AlreadyPending { correlation_tag: i32 },
    /// Extras coercion failed; the host was not invoked.
    MalformedExtra { key: String, value: String },
    /// Host launcher rejected the directive synchronously.
    LaunchFailed(HostLaunchError),
    /// The coordinator was dropped before a result arrived.
    Abandoned,
}

impl LaunchError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::AlreadyPending { .. } => "already_pending",
            Self::MalformedExtra { .. } => "malformed_extra",
            Self::LaunchFailed(_) => "launch_failed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(err) => write!(f, "invalid launch request: {err}"),
            Self::AlreadyPending { correlation_tag } => write!(
                f,
                "a launch is already awaiting its result (correlation tag {correlation_tag})"
            ),
            Self::MalformedExtra { key, value } => {
                write!(f, "extra `{key}` is malformed: `{value}` is not a 64-bit integer")
            }
            Self::LaunchFailed(err) => write!(f, "host launcher failed: {err}"),
            Self::Abandoned => write!(f, "launch coordinator dropped before a result arrived"),
        }
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            Self::LaunchFailed(err) => Some(err),
            Self::AlreadyPending { .. } | Self::MalformedExtra { .. } | Self::Abandoned => None,
        }
    }
}

impl From<RequestValidationError> for LaunchError {
    fn from(value: RequestValidationError) -> Self {
        Self::InvalidRequest(value)
    }
}

impl From<ExtraTransformError> for LaunchError {
    fn from(value: ExtraTransformError) -> Self {
        match value {
            ExtraTransformError::MalformedLong { key, value } => {
                Self::MalformedExtra { key, value }
            }
        }
    }
}

impl From<HostLaunchError> for LaunchError {
    fn from(value: HostLaunchError) -> Self {
        Self::LaunchFailed(value)
    }
}
