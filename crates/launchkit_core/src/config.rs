//! Coordinator configuration.

use log::warn;

/// Correlation tag used when nothing else is configured.
pub const DEFAULT_CORRELATION_TAG: i32 = 12;

/// Environment variable overriding the correlation tag.
pub const CORRELATION_TAG_ENV: &str = "LAUNCHKIT_CORRELATION_TAG";

/// Launch coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Fixed tag attached to every launch and expected back on completion.
    pub correlation_tag: i32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            correlation_tag: DEFAULT_CORRELATION_TAG,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_correlation_tag(correlation_tag: i32) -> Self {
        Self { correlation_tag }
    }

    /// Reads overrides from the process environment.
    ///
    /// Blank or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(CORRELATION_TAG_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                match trimmed.parse::<i32>() {
                    Ok(tag) => config.correlation_tag = tag,
                    Err(err) => warn!(
                        "event=config_invalid module=config status=ignored key={} error={}",
                        CORRELATION_TAG_ENV, err
                    ),
                }
            }
        }
        config
    }
}
