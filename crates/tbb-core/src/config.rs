use std::{env, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Default Google Books endpoint host.
pub const DEFAULT_BOOKS_BASE_URL: &str = "https://www.googleapis.com";

/// Timings and limits of the update poller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Long-poll timeout passed to `getUpdates`.
    pub long_poll_timeout: Duration,
    /// Pause after every successful batch, empty or not.
    pub idle_delay: Duration,
    /// Pause after a failed fetch before retrying the same offset.
    pub fetch_error_backoff: Duration,
    /// Pause before restarting the session after a catastrophic failure.
    pub restart_backoff: Duration,
    /// Consecutive catastrophic failures tolerated before giving up.
    pub max_restarts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            long_poll_timeout: Duration::from_secs(30),
            idle_delay: Duration::from_secs(1),
            fetch_error_backoff: Duration::from_secs(5),
            restart_backoff: Duration::from_secs(10),
            max_restarts: 5,
        }
    }
}

/// Typed configuration, sourced from the process environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    /// Bot API host override (self-hosted Bot API server).
    pub telegram_api_url: Option<String>,

    // Google Books
    pub books_app_name: String,
    pub books_api_key: Option<String>,
    pub books_base_url: String,
    pub books_request_timeout: Duration,

    // Poller
    pub poll: PollSettings,
}

impl Config {
    /// Load configuration, reading `.env` from the working directory first.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Required
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;
        let books_app_name = lookup("BOOKS_APP_NAME")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("BOOKS_APP_NAME environment variable is required".to_string())
            })?;

        let telegram_api_url = lookup("TELEGRAM_API_URL").and_then(non_empty);

        // Optional catalog settings
        let books_api_key = lookup("GOOGLE_BOOKS_API_KEY").and_then(non_empty);
        let books_base_url = lookup("GOOGLE_BOOKS_BASE_URL")
            .and_then(non_empty)
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BOOKS_BASE_URL.to_string());
        let books_request_timeout = Duration::from_millis(
            parse_u64(&lookup, "BOOKS_REQUEST_TIMEOUT_MS")?.unwrap_or(10_000),
        );

        // Poller timings
        let defaults = PollSettings::default();
        let poll = PollSettings {
            long_poll_timeout: parse_u64(&lookup, "POLL_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.long_poll_timeout),
            idle_delay: parse_u64(&lookup, "POLL_IDLE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.idle_delay),
            fetch_error_backoff: parse_u64(&lookup, "POLL_ERROR_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_error_backoff),
            restart_backoff: parse_u64(&lookup, "POLL_RESTART_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.restart_backoff),
            max_restarts: parse_u64(&lookup, "POLL_MAX_RESTARTS")?
                .map(|n| n.min(u32::MAX as u64) as u32)
                .unwrap_or(defaults.max_restarts),
        };

        Ok(Self {
            telegram_bot_token,
            telegram_api_url,
            books_app_name,
            books_api_key,
            books_base_url,
            books_request_timeout,
            poll,
        })
    }
}

/// Load `path` into the process environment. Existing variables win; a
/// missing file is fine, a malformed one is a config error.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("failed to load {}: {e}", path.display()))),
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(raw) = lookup(key).and_then(non_empty) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
