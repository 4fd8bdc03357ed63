use rqbot_channels::TransportError;
use thiserror::Error;

/// Failure reported by a single handler during its turn.
///
/// The registry logs it and moves on to the next handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Handler execution failed: {0}")]
    ExecutionFailed(String),
}

/// Why a descriptor was refused at registration time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Handler name must not be empty")]
    EmptyName,

    #[error("Handler already registered: {0}")]
    DuplicateName(String),

    #[error("Priority slot already held by {existing}; rejected {rejected}")]
    PriorityTaken { existing: String, rejected: String },
}
