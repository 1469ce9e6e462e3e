//! Result correlation contracts.
//!
//! Any transport (push callback, polling loop, event bus) feeds completion
//! notifications through [`CompletionSink::deliver`]; the state transition is
//! the same regardless of where the notification came from.

use crate::model::result::CompletionNotification;
use std::sync::Arc;

/// Correlator state as seen from outside the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelatorState {
    Idle,
    AwaitingResult,
}

/// What happened to one delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Matched the pending launch and resolved its handle.
    Resolved,
    /// Matched the pending launch, but the caller had dropped its handle.
    Discarded,
    /// No pending launch carries this tag.
    Ignored,
}

/// Entry point for host completion notifications.
pub trait CompletionSink: Send + Sync {
    fn deliver(&self, notification: CompletionNotification) -> DeliveryOutcome;
}

impl<S: CompletionSink + ?Sized> CompletionSink for Arc<S> {
    fn deliver(&self, notification: CompletionNotification) -> DeliveryOutcome {
        (**self).deliver(notification)
    }
}
