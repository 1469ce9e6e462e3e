//! Process-wide log sink for launch diagnostics.
//!
//! Lines read `<timestamp> <LEVEL> <target>: event=<name> module=<area> ...`
//! so launch, extras and correlator events can be filtered by `event=`.
//! Anything that may carry caller content goes through [`sanitize_message`].
//!
//! # Invariants
//! - The sink is started at most once per process.
//! - Starting the sink never panics; every failure is a [`LoggingError`].

use flexi_logger::{
    Cleanup, Criterion, DeferredNow, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
    TS_DASHES_BLANK_COLONS_DOT_BLANK,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "LAUNCHKIT_LOG_LEVEL";
/// Environment variable selecting the log directory.
pub const LOG_DIR_ENV: &str = "LAUNCHKIT_LOG_DIR";

const LOG_FILE_BASENAME: &str = "launchkit";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_SINK: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveSink {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Resolved log sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Absolute directory holding `launchkit*.log` files.
    pub directory: PathBuf,
}

impl LogSettings {
    /// Parses a level name and an absolute log directory.
    ///
    /// Level names are case-insensitive; `warning` is accepted for `warn`
    /// and `off` is rejected.
    pub fn parse(level: &str, directory: &str) -> Result<Self, LoggingError> {
        let level = parse_level(level)?;
        let trimmed = directory.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::MissingDirectory);
        }
        let directory = PathBuf::from(trimmed);
        if !directory.is_absolute() {
            return Err(LoggingError::RelativeDirectory(directory));
        }
        Ok(Self { level, directory })
    }

    /// Reads [`LOG_DIR_ENV`] and [`LOG_LEVEL_ENV`] through `lookup`.
    ///
    /// Returns `Ok(None)` when no directory is configured. A missing level
    /// falls back to [`default_log_level`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, LoggingError> {
        let Some(directory) = lookup(LOG_DIR_ENV).filter(|value| !value.trim().is_empty()) else {
            return Ok(None);
        };
        let level = lookup(LOG_LEVEL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_log_level().as_str().to_string());
        Self::parse(&level, &directory).map(Some)
    }
}

/// Log sink setup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    MissingDirectory,
    RelativeDirectory(PathBuf),
    CreateDirectory {
        directory: PathBuf,
        message: String,
    },
    Backend(String),
    /// A sink is already running with different settings.
    AlreadyStarted { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::MissingDirectory => write!(f, "log directory cannot be empty"),
            Self::RelativeDirectory(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDirectory { directory, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                directory.display()
            ),
            Self::Backend(message) => write!(f, "failed to start log backend: {message}"),
            Self::AlreadyStarted { active } => write!(
                f,
                "logging already running at `{}` with level `{}`",
                active.directory.display(),
                active.level
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts the file sink, or confirms that an identical one is running.
///
/// # Errors
/// - `AlreadyStarted` when a sink with other settings is active.
/// - `CreateDirectory` / `Backend` when the sink cannot be started.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE_SINK.get_or_try_init(|| start_sink(settings))?;
    if active.settings != *settings {
        return Err(LoggingError::AlreadyStarted {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

/// Starts logging from the process environment.
///
/// Returns `Ok(false)` and leaves logging off when [`LOG_DIR_ENV`] is unset.
pub fn init_logging_from_env() -> Result<bool, LoggingError> {
    match LogSettings::from_lookup(|name| std::env::var(name).ok())? {
        Some(settings) => init_logging(&settings).map(|()| true),
        None => Ok(false),
    }
}

/// Settings of the running sink, if any.
pub fn active_log_settings() -> Option<LogSettings> {
    ACTIVE_SINK.get().map(|active| active.settings.clone())
}

/// `Debug` in debug builds, `Info` otherwise.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = raw.trim();
    let name = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match LevelFilter::from_str(name) {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnknownLevel(trimmed.to_string())),
        Ok(level) => Ok(level),
    }
}

fn start_sink(settings: &LogSettings) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(&settings.directory).map_err(|err| {
        LoggingError::CreateDirectory {
            directory: settings.directory.clone(),
            message: err.to_string(),
        }
    })?;

    let handle = Logger::with(settings.level)
        .log_to_file(
            FileSpec::default()
                .directory(settings.directory.clone())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(event_line_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.directory.display()
    );

    Ok(ActiveSink {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn event_line_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} {}: {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        record.level(),
        record.target(),
        record.args()
    )
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(info);
    }));
}

/// Flattens newlines and caps `value` at `max_chars` characters.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut capped = flattened.chars().take(max_chars).collect::<String>();
    capped.push_str("...");
    capped
}
