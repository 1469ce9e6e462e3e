//! External activity launch coordination.
//!
//! Caller → [`LaunchCoordinator::launch`] → [`HostLauncher`] → host works out
//! of process → host calls [`CompletionSink::deliver`] → caller's
//! [`LaunchHandle`] resolves.

pub mod coordinator;
pub mod correlation;
pub mod correlator;
pub mod directive;
pub mod error;
pub mod host;

pub use coordinator::{LaunchCoordinator, LaunchHandle};
pub use correlation::{CorrelationTable, SINGLE_FLIGHT_CAPACITY};
pub use correlator::{CompletionSink, CorrelatorState, DeliveryOutcome};
pub use directive::{ComponentTarget, DirectivePayload, LaunchDirective};
pub use error::LaunchError;
pub use host::{HostLaunchError, HostLauncher};
