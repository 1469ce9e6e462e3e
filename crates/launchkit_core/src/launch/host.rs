//! Host activity launcher contract.

use crate::launch::directive::LaunchDirective;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Capability that starts an external activity in the host environment.
///
/// Implementations must return promptly: acceptance means the host took the
/// directive, not that the activity finished. The outcome arrives later
/// through [`crate::launch::CompletionSink`] carrying the same tag.
pub trait HostLauncher: Send + Sync {
    fn start_external_activity(
        &self,
        directive: &LaunchDirective,
        correlation_tag: i32,
    ) -> Result<(), HostLaunchError>;
}

impl<T: HostLauncher + ?Sized> HostLauncher for Arc<T> {
    fn start_external_activity(
        &self,
        directive: &LaunchDirective,
        correlation_tag: i32,
    ) -> Result<(), HostLaunchError> {
        (**self).start_external_activity(directive, correlation_tag)
    }
}

/// Opaque synchronous failure reported by the host launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLaunchError {
    /// Stable host-defined error code, e.g. `activity_not_found`.
    pub code: String,
    /// Human-readable diagnostic message.
    pub message: String,
}

impl HostLaunchError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// No activity in the host can handle the directive.
    pub fn activity_not_found(action: &str) -> Self {
        Self::new(
            "activity_not_found",
            format!("no activity found to handle action `{action}`"),
        )
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new("permission_denied", message)
    }
}

impl Display for HostLaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for HostLaunchError {}
