/// Failure of a single backend call.
///
/// No retries happen at this layer; callers turn any variant into one
/// user-facing failure reply.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),
}
