//! Client side of the media-control backend.
//!
//! The router only depends on the `MediaBackend` trait; `HttpBackend` is the
//! production implementation speaking JSON over HTTP.

pub mod backend;
pub mod error;
pub mod http;
pub mod types;

pub use backend::MediaBackend;
pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{Candidate, EnqueueResponse, ImportRequest, LibraryItem, QueueEntry};
