//! Message handler plugins: registration, manifest resolution and
//! priority-first, failure-isolated dispatch.

pub mod catalog;
pub mod error;
pub mod registry;
pub mod types;

pub use catalog::HandlerCatalog;
pub use error::{HandlerError, RegistryError};
pub use registry::HandlerRegistry;
pub use types::{HandlerDescriptor, MessageHandler};
