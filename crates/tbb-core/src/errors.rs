/// Core error type for the book bot.
///
/// Adapter crates map their specific errors into this type so the poller and
/// dispatcher can contain failures consistently (user-facing apology vs retry).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl Error {
    /// Build an [`Error::Panicked`] from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Error::Panicked(msg)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
