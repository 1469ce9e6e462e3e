use launchkit_core::{
    CompletionNotification, CorrelatorState, DeliveryOutcome, HostLaunchError, HostLauncher,
    LaunchCoordinator, LaunchDirective, LaunchError, LaunchRequest, RESULT_OK,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

/// Accepts every directive unless `fail_next` is set.
#[derive(Default)]
struct ToggleLauncher {
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl HostLauncher for ToggleLauncher {
    fn start_external_activity(
        &self,
        directive: &LaunchDirective,
        _correlation_tag: i32,
    ) -> Result<(), HostLaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(HostLaunchError::activity_not_found(&directive.action));
        }
        Ok(())
    }
}

#[test]
fn second_launch_before_result_is_rejected_and_first_is_unaffected() {
    let launcher = Arc::new(ToggleLauncher::default());
    let coordinator = LaunchCoordinator::new(launcher.clone());

    let mut first = coordinator
        .launch(LaunchRequest::new("PICK"))
        .expect("first launch accepted");
    let err = coordinator
        .launch(LaunchRequest::new("PICK"))
        .expect_err("second launch must be rejected");
    assert_eq!(
        err,
        LaunchError::AlreadyPending {
            correlation_tag: 12
        }
    );
    assert_eq!(launcher.calls.load(Ordering::SeqCst), 1);

    assert_eq!(
        coordinator.deliver(CompletionNotification::new(12, RESULT_OK)),
        DeliveryOutcome::Resolved
    );
    let result = first
        .try_result()
        .expect("first handle resolved")
        .expect("first result ok");
    assert_eq!(result.result_code, RESULT_OK);

    coordinator
        .launch(LaunchRequest::new("PICK"))
        .expect("slot is free again after resolution");
}

#[test]
fn host_failure_frees_slot_immediately() {
    let launcher = Arc::new(ToggleLauncher::default());
    launcher.fail_next.store(true, Ordering::SeqCst);
    let coordinator = LaunchCoordinator::new(launcher.clone());

    let err = coordinator
        .launch(LaunchRequest::new("com.example.MISSING"))
        .expect_err("host rejects");
    match err {
        LaunchError::LaunchFailed(cause) => assert_eq!(cause.code, "activity_not_found"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(coordinator.state(), CorrelatorState::Idle);

    coordinator
        .launch(LaunchRequest::new("android.intent.action.VIEW"))
        .expect("next launch accepted");
    assert_eq!(launcher.calls.load(Ordering::SeqCst), 2);
}

/// Rejects every directive as the host would for a protected activity.
struct DenyingLauncher;

impl HostLauncher for DenyingLauncher {
    fn start_external_activity(
        &self,
        directive: &LaunchDirective,
        _correlation_tag: i32,
    ) -> Result<(), HostLaunchError> {
        Err(HostLaunchError::permission_denied(format!(
            "caller may not start `{}`",
            directive.action
        )))
    }
}

#[test]
fn permission_denied_surfaces_as_launch_failed_and_never_holds_slot() {
    let coordinator = LaunchCoordinator::new(Arc::new(DenyingLauncher));

    for _ in 0..2 {
        let err = coordinator
            .launch(LaunchRequest::new("android.settings.SETTINGS"))
            .expect_err("host denies");
        assert_eq!(err.code(), "launch_failed");
        match err {
            LaunchError::LaunchFailed(cause) => {
                assert_eq!(cause.code, "permission_denied");
                assert!(cause.message.contains("android.settings.SETTINGS"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(coordinator.state(), CorrelatorState::Idle);
    }
}

#[test]
fn racing_launches_admit_exactly_one() {
    const THREADS: usize = 8;
    let launcher = Arc::new(ToggleLauncher::default());
    let coordinator = Arc::new(LaunchCoordinator::new(launcher.clone()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers = (0..THREADS)
        .map(|index| {
            let coordinator = Arc::clone(&coordinator);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                coordinator
                    .launch(LaunchRequest::new(format!("ACTION_{index}")))
                    .map(|handle| handle.launch_id())
            })
        })
        .collect::<Vec<_>>();

    let outcomes = workers
        .into_iter()
        .map(|worker| worker.join().expect("worker should not panic"))
        .collect::<Vec<_>>();

    let accepted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .all(|err| matches!(err, LaunchError::AlreadyPending { .. })));
    assert_eq!(launcher.calls.load(Ordering::SeqCst), 1);
    assert!(coordinator.is_pending());
}

#[test]
fn launch_racing_delivery_never_leaves_inconsistent_slot() {
    let coordinator = Arc::new(LaunchCoordinator::new(Arc::new(ToggleLauncher::default())));

    for _ in 0..200 {
        let mut first = coordinator
            .launch(LaunchRequest::new("FIRST"))
            .expect("coordinator idle at loop start");

        let deliverer = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.deliver(CompletionNotification::new(12, RESULT_OK)))
        };
        let second = coordinator.launch(LaunchRequest::new("SECOND"));
        let delivered = deliverer.join().expect("deliverer should not panic");

        assert_eq!(delivered, DeliveryOutcome::Resolved);
        assert!(first.try_result().expect("first resolved").is_ok());

        match second {
            Ok(mut second_handle) => {
                assert!(coordinator.is_pending());
                assert_eq!(
                    coordinator.deliver(CompletionNotification::new(12, RESULT_OK)),
                    DeliveryOutcome::Resolved
                );
                assert!(second_handle.try_result().is_some());
            }
            Err(err) => {
                assert!(matches!(err, LaunchError::AlreadyPending { .. }));
            }
        }
        assert_eq!(coordinator.state(), CorrelatorState::Idle);
    }
}
