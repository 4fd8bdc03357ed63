use thiserror::Error;

/// Errors that can occur while talking to the chat transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has no live session to deliver through.
    #[error("Transport not connected")]
    NotConnected,

    /// A message or action could not be delivered to the remote endpoint.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// An operation exceeded its allowed time budget.
    #[error("Operation timed out after {ms}ms")]
    Timeout { ms: u64 },
}
