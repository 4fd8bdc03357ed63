use std::sync::Arc;

use async_trait::async_trait;
use rqbot_channels::{ChatEvent, SharedTransport};

use crate::error::HandlerError;

/// A message handler plugin.
///
/// Handlers send their own replies through `transport`. The returned flag
/// only matters for the priority handler: `true` means the event was fully
/// handled and no other handler runs.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(
        &self,
        transport: &SharedTransport,
        event: &ChatEvent,
        is_group: bool,
    ) -> Result<bool, HandlerError>;
}

/// A registered handler binding a unique name, the priority flag and the handler.
#[derive(Clone)]
pub struct HandlerDescriptor {
    /// Unique name used for log correlation.
    pub name: String,
    /// At most one registered descriptor may carry this flag.
    pub priority: bool,
    pub handler: Arc<dyn MessageHandler>,
}

impl HandlerDescriptor {
    pub fn new(name: impl Into<String>, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            name: name.into(),
            priority: false,
            handler,
        }
    }

    pub fn with_priority(mut self) -> Self {
        self.priority = true;
        self
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
