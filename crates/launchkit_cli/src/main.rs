//! CLI smoke and dry-run entry point.
//!
//! # Responsibility
//! - With no arguments, verify `launchkit_core` linkage (ping/version).
//! - With `<action> [params-json] [result-code]`, run one launch against a
//!   printing host launcher and print the directive and the correlated result.

use launchkit_core::{
    init_logging_from_env, CompletionNotification, CompletionSink, CoordinatorConfig,
    HostLaunchError, HostLauncher, LaunchCoordinator, LaunchDirective, LaunchError, LaunchRequest,
    LaunchResult, RESULT_CANCELED,
};
use log::info;
use serde_json::Value;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

/// Host stand-in that prints each directive and remembers its data URI.
#[derive(Default)]
struct PrintingLauncher {
    last_data: Mutex<Option<String>>,
}

impl HostLauncher for PrintingLauncher {
    fn start_external_activity(
        &self,
        directive: &LaunchDirective,
        correlation_tag: i32,
    ) -> Result<(), HostLaunchError> {
        let json = serde_json::to_string_pretty(directive)
            .map_err(|err| HostLaunchError::new("directive_encode_failed", err.to_string()))?;
        println!("directive tag={correlation_tag}\n{json}");
        if let Ok(mut last_data) = self.last_data.lock() {
            *last_data = directive.data().map(str::to_string);
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(action) = args.first() else {
        println!("launchkit_core ping={}", launchkit_core::ping());
        println!("launchkit_core version={}", launchkit_core::core_version());
        return ExitCode::SUCCESS;
    };

    match dry_run(action, args.get(1), args.get(2)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error code={} message={}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

fn dry_run(
    action: &str,
    raw_params: Option<&String>,
    raw_result_code: Option<&String>,
) -> Result<(), CliError> {
    let params = match raw_params {
        Some(raw) => serde_json::from_str::<Value>(raw).map_err(CliError::InvalidParamsJson)?,
        None => Value::Null,
    };
    let result_code = match raw_result_code {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map_err(|_| CliError::InvalidResultCode(raw.clone()))?,
        None => RESULT_CANCELED,
    };

    let launcher = Arc::new(PrintingLauncher::default());
    let coordinator = Arc::new(LaunchCoordinator::with_config(
        launcher.clone(),
        CoordinatorConfig::from_env(),
    ));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(CliError::Runtime)?;
    let result: Result<LaunchResult, LaunchError> = runtime.block_on(async {
        let request = LaunchRequest::from_parts(action, &params)?;
        let handle = coordinator.launch(request)?;

        let echoed = launcher.last_data.lock().ok().and_then(|data| data.clone());
        let mut notification = CompletionNotification::new(handle.correlation_tag(), result_code);
        if let Some(data) = echoed {
            notification = notification.with_data(data);
        }
        let sink: Arc<dyn CompletionSink> = coordinator.clone();
        sink.deliver(notification);

        handle.await
    });
    let result = result?;

    let json = serde_json::to_string_pretty(&result).map_err(CliError::Encode)?;
    println!("result\n{json}");
    info!(
        "event=dry_run_complete module=cli status=ok action={} result_code={}",
        action, result.result_code
    );
    Ok(())
}

#[derive(Debug)]
enum CliError {
    InvalidParamsJson(serde_json::Error),
    InvalidResultCode(String),
    Runtime(std::io::Error),
    Encode(serde_json::Error),
    Launch(LaunchError),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidParamsJson(_) => "invalid_params_json",
            Self::InvalidResultCode(_) => "invalid_result_code",
            Self::Runtime(_) => "runtime_failed",
            Self::Encode(_) => "encode_failed",
            Self::Launch(err) => err.code(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParamsJson(err) => write!(f, "params are not valid JSON: {err}"),
            Self::InvalidResultCode(raw) => write!(f, "result code `{raw}` is not an integer"),
            Self::Runtime(err) => write!(f, "failed to start runtime: {err}"),
            Self::Encode(err) => write!(f, "failed to encode result: {err}"),
            Self::Launch(err) => write!(f, "{err}"),
        }
    }
}

impl From<LaunchError> for CliError {
    fn from(value: LaunchError) -> Self {
        Self::Launch(value)
    }
}
