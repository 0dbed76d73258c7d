/// Core error type for the client.
///
/// Only faults the caller cannot recover from locally live here. API-level
/// rejections (`ok: false`) and pre-flight validation failures surface as
/// [`crate::send::SendOutcome::Rejected`] values instead, so every send
/// caller has a single result shape to check.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Network failure, timeout, or a response body that is not JSON.
    #[error("transport error: {0}")]
    Transport(String),

    /// The update poll was aborted through its cancellation token.
    #[error("poll cancelled")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
