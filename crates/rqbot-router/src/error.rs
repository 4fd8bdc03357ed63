use rqbot_backend::BackendError;
use rqbot_channels::TransportError;

/// Failures that escape a routing step and reach the router's top-level guard.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failures of the media-import flow, answered with a single reply.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("backend import failed: {0}")]
    Backend(#[from] BackendError),
}
