//! Single-flight launch coordinator.
//!
//! # Responsibility
//! - Accept at most one outstanding launch and hand the caller a handle.
//! - Build the host directive and invoke the host launcher.
//! - Resolve the handle when a matching completion notification arrives.
//!
//! # Invariants
//! - The correlation table is the only shared mutable state; every access
//!   goes through its mutex.
//! - The slot is reserved before the host launcher runs, and the lock is not
//!   held during the host call.
//! - Every synchronous failure leaves the coordinator idle.

use crate::config::CoordinatorConfig;
use crate::launch::correlation::{CorrelationTable, PendingLaunch};
use crate::launch::correlator::{CompletionSink, CorrelatorState, DeliveryOutcome};
use crate::launch::directive::LaunchDirective;
use crate::launch::error::LaunchError;
use crate::launch::host::HostLauncher;
use crate::model::request::LaunchRequest;
use crate::model::result::{CompletionNotification, LaunchResult};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Coordinates one external launch at a time.
pub struct LaunchCoordinator {
    launcher: Arc<dyn HostLauncher>,
    config: CoordinatorConfig,
    table: Mutex<CorrelationTable>,
}

impl LaunchCoordinator {
    pub fn new(launcher: Arc<dyn HostLauncher>) -> Self {
        Self::with_config(launcher, CoordinatorConfig::default())
    }

    pub fn with_config(launcher: Arc<dyn HostLauncher>, config: CoordinatorConfig) -> Self {
        Self::with_table(launcher, config, CorrelationTable::new())
    }

    /// Creates a coordinator around a caller-provided correlation table.
    pub fn with_table(
        launcher: Arc<dyn HostLauncher>,
        config: CoordinatorConfig,
        table: CorrelationTable,
    ) -> Self {
        Self {
            launcher,
            config,
            table: Mutex::new(table),
        }
    }

    pub fn correlation_tag(&self) -> i32 {
        self.config.correlation_tag
    }

    pub fn state(&self) -> CorrelatorState {
        if self.table().is_empty() {
            CorrelatorState::Idle
        } else {
            CorrelatorState::AwaitingResult
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == CorrelatorState::AwaitingResult
    }

    /// Starts one external launch.
    ///
    /// Returns as soon as the host launcher accepted the directive; the
    /// returned handle resolves when the matching result is delivered.
    ///
    /// # Errors
    /// - `InvalidRequest` when the request fails validation.
    /// - `AlreadyPending` when another launch awaits its result.
    /// - `MalformedExtra` when extras coercion fails; the host is not invoked.
    /// - `LaunchFailed` when the host launcher rejects the directive.
    pub fn launch(&self, request: LaunchRequest) -> Result<LaunchHandle, LaunchError> {
        let correlation_tag = self.config.correlation_tag;

        if let Err(err) = request.validate() {
            warn!(
                "event=launch_rejected module=launch status=error code=invalid_request error={}",
                err
            );
            return Err(err.into());
        }

        let occupied = self.table().occupied(correlation_tag);
        if let Some(occupied) = occupied {
            return Err(self.reject_pending(&request.action, occupied.correlation_tag));
        }

        let directive = LaunchDirective::from_request(&request).map_err(|err| {
            warn!(
                "event=launch_rejected module=launch status=error code=malformed_extra action={} error={}",
                request.action, err
            );
            LaunchError::from(err)
        })?;

        let launch_id = Uuid::new_v4();
        let (completion, receiver) = oneshot::channel();
        let reserved = self.table().reserve(
            correlation_tag,
            PendingLaunch {
                launch_id,
                action: request.action.clone(),
                completion,
            },
        );
        if let Err(occupied) = reserved {
            return Err(self.reject_pending(&request.action, occupied.correlation_tag));
        }

        if let Err(err) = self
            .launcher
            .start_external_activity(&directive, correlation_tag)
        {
            self.table().release(correlation_tag, launch_id);
            error!(
                "event=launch_failed module=launch status=error launch_id={} action={} host_code={}",
                launch_id, request.action, err.code
            );
            return Err(LaunchError::LaunchFailed(err));
        }

        info!(
            "event=launch_accepted module=launch status=ok launch_id={} action={} tag={} has_component={} has_payload={} extras={} flags={}",
            launch_id,
            request.action,
            correlation_tag,
            directive.component.is_some(),
            directive.payload.is_some(),
            directive.extras.as_ref().map_or(0, |extras| extras.len()),
            directive.flags
        );
        Ok(LaunchHandle {
            launch_id,
            correlation_tag,
            receiver,
        })
    }

    /// Parses `params`, launches, and awaits the result.
    pub async fn start_activity(
        &self,
        action: &str,
        params: &Value,
    ) -> Result<LaunchResult, LaunchError> {
        let request = LaunchRequest::from_parts(action, params).map_err(|err| {
            warn!(
                "event=launch_rejected module=launch status=error code=invalid_request error={}",
                err
            );
            LaunchError::from(err)
        })?;
        self.launch(request)?.await
    }

    /// Matches a completion notification against the pending launch.
    ///
    /// Notifications with a foreign tag, or arriving while idle, are ignored.
    pub fn deliver(&self, notification: CompletionNotification) -> DeliveryOutcome {
        let correlation_tag = notification.correlation_tag;
        if correlation_tag != self.config.correlation_tag {
            debug!(
                "event=result_ignored module=correlator status=ignored reason=foreign_tag tag={}",
                correlation_tag
            );
            return DeliveryOutcome::Ignored;
        }

        let pending = self.table().take(correlation_tag);
        let Some(pending) = pending else {
            debug!(
                "event=result_ignored module=correlator status=ignored reason=idle tag={}",
                correlation_tag
            );
            return DeliveryOutcome::Ignored;
        };

        let result = LaunchResult::from_notification(notification);
        let result_code = result.result_code;
        match pending.completion.send(result) {
            Ok(()) => {
                info!(
                    "event=result_delivered module=correlator status=ok launch_id={} action={} result_code={}",
                    pending.launch_id, pending.action, result_code
                );
                DeliveryOutcome::Resolved
            }
            Err(_) => {
                warn!(
                    "event=result_discarded module=correlator status=ignored reason=handle_dropped launch_id={} result_code={}",
                    pending.launch_id, result_code
                );
                DeliveryOutcome::Discarded
            }
        }
    }

    fn reject_pending(&self, action: &str, occupied_tag: i32) -> LaunchError {
        warn!(
            "event=launch_rejected module=launch status=error code=already_pending action={} tag={}",
            action, occupied_tag
        );
        LaunchError::AlreadyPending {
            correlation_tag: occupied_tag,
        }
    }

    fn table(&self) -> MutexGuard<'_, CorrelationTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionSink for LaunchCoordinator {
    fn deliver(&self, notification: CompletionNotification) -> DeliveryOutcome {
        LaunchCoordinator::deliver(self, notification)
    }
}

/// Caller-side completion handle for one accepted launch.
///
/// Resolves with the correlated [`LaunchResult`], or with
/// [`LaunchError::Abandoned`] if the coordinator is dropped first.
#[derive(Debug)]
pub struct LaunchHandle {
    launch_id: Uuid,
    correlation_tag: i32,
    receiver: oneshot::Receiver<LaunchResult>,
}

impl LaunchHandle {
    pub fn launch_id(&self) -> Uuid {
        self.launch_id
    }

    pub fn correlation_tag(&self) -> i32 {
        self.correlation_tag
    }

    /// Non-blocking check for an already delivered result.
    pub fn try_result(&mut self) -> Option<Result<LaunchResult, LaunchError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(Ok(result)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(LaunchError::Abandoned)),
        }
    }
}

impl Future for LaunchHandle {
    type Output = Result<LaunchResult, LaunchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.map_err(|_| LaunchError::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::LaunchCoordinator;
    use crate::launch::correlator::{CorrelatorState, DeliveryOutcome};
    use crate::launch::directive::LaunchDirective;
    use crate::launch::error::LaunchError;
    use crate::launch::host::{HostLaunchError, HostLauncher};
    use crate::model::request::LaunchRequest;
    use crate::model::result::{CompletionNotification, RESULT_OK};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingLauncher {
        calls: Mutex<Vec<(LaunchDirective, i32)>>,
        failure: Option<HostLaunchError>,
    }

    impl HostLauncher for RecordingLauncher {
        fn start_external_activity(
            &self,
            directive: &LaunchDirective,
            correlation_tag: i32,
        ) -> Result<(), HostLaunchError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((directive.clone(), correlation_tag));
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn accepted_launch_moves_to_awaiting_result() {
        let launcher = Arc::new(RecordingLauncher::default());
        let coordinator = LaunchCoordinator::new(launcher.clone());
        assert_eq!(coordinator.state(), CorrelatorState::Idle);

        let mut handle = coordinator
            .launch(LaunchRequest::new("VIEW"))
            .expect("launch accepted");
        assert_eq!(coordinator.state(), CorrelatorState::AwaitingResult);
        assert_eq!(handle.correlation_tag(), 12);
        assert!(handle.try_result().is_none());

        let calls = launcher.calls.lock().expect("calls lock");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, 12);
    }

    #[test]
    fn matching_result_resolves_and_returns_to_idle() {
        let coordinator = LaunchCoordinator::new(Arc::new(RecordingLauncher::default()));
        let mut handle = coordinator
            .launch(LaunchRequest::new("PICK"))
            .expect("launch accepted");

        let outcome = coordinator.deliver(CompletionNotification::new(12, RESULT_OK));
        assert_eq!(outcome, DeliveryOutcome::Resolved);
        assert!(!coordinator.is_pending());

        let result = handle
            .try_result()
            .expect("result delivered")
            .expect("result ok");
        assert_eq!(result.result_code, RESULT_OK);
    }

    #[test]
    fn host_failure_leaves_coordinator_idle() {
        let launcher = Arc::new(RecordingLauncher {
            calls: Mutex::default(),
            failure: Some(HostLaunchError::activity_not_found("NOPE")),
        });
        let coordinator = LaunchCoordinator::new(launcher);

        let err = coordinator
            .launch(LaunchRequest::new("NOPE"))
            .expect_err("host failure must reject");
        assert!(matches!(err, LaunchError::LaunchFailed(_)));
        assert_eq!(coordinator.state(), CorrelatorState::Idle);
    }

    #[test]
    fn dropped_handle_discards_result_and_frees_slot() {
        let coordinator = LaunchCoordinator::new(Arc::new(RecordingLauncher::default()));
        drop(
            coordinator
                .launch(LaunchRequest::new("VIEW"))
                .expect("launch accepted"),
        );
        assert!(coordinator.is_pending());

        let outcome = coordinator.deliver(CompletionNotification::new(12, 0));
        assert_eq!(outcome, DeliveryOutcome::Discarded);
        assert!(!coordinator.is_pending());
    }
}
