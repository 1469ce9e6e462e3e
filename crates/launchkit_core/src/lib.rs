//! Core launch coordination for launchkit.
//! Starts one external host activity at a time and correlates its
//! asynchronous result back to the waiting caller.

pub mod config;
pub mod extras;
pub mod launch;
pub mod logging;
pub mod model;

pub use config::{CoordinatorConfig, DEFAULT_CORRELATION_TAG};
pub use extras::{transform_extras, ExtraTransformError};
pub use launch::{
    CompletionSink, ComponentTarget, CorrelationTable, CorrelatorState, DeliveryOutcome,
    DirectivePayload, HostLaunchError, HostLauncher, LaunchCoordinator, LaunchDirective,
    LaunchError, LaunchHandle,
};
pub use logging::{
    active_log_settings, default_log_level, init_logging, init_logging_from_env, LogSettings,
    LoggingError,
};
pub use model::extra::{BundleMap, BundleValue, ExtraMap, ExtraValue, ExtraValueError};
pub use model::request::{LaunchRequest, RequestValidationError};
pub use model::result::{
    CompletionNotification, LaunchResult, RESULT_CANCELED, RESULT_FIRST_USER, RESULT_OK,
};

/// Minimal health-check API for host bridge wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
