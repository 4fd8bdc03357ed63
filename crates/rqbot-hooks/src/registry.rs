use std::panic::AssertUnwindSafe;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use futures_util::FutureExt;
use rqbot_channels::{ChatEvent, SharedTransport};
use tracing::{debug, error, info};

use crate::error::RegistryError;
use crate::types::HandlerDescriptor;

#[derive(Default)]
struct Registered {
    priority: Option<HandlerDescriptor>,
    /// Registration order is dispatch order.
    others: Vec<HandlerDescriptor>,
}

impl Registered {
    fn contains(&self, name: &str) -> bool {
        self.priority.as_ref().is_some_and(|p| p.name == name)
            || self.others.iter().any(|h| h.name == name)
    }
}

/// Central registry and dispatcher for message handlers.
///
/// Share a single instance across the process as `Arc<HandlerRegistry>`.
pub struct HandlerRegistry {
    handlers: RwLock<Registered>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Registered::default()),
        }
    }

    /// Register a handler.
    ///
    /// Rejects empty or duplicate names and a second priority descriptor.
    pub fn register(&self, descriptor: HandlerDescriptor) -> Result<(), RegistryError> {
        if descriptor.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if handlers.contains(&descriptor.name) {
            return Err(RegistryError::DuplicateName(descriptor.name));
        }

        if descriptor.priority {
            if let Some(existing) = &handlers.priority {
                return Err(RegistryError::PriorityTaken {
                    existing: existing.name.clone(),
                    rejected: descriptor.name,
                });
            }
            info!(handler = %descriptor.name, "handler registered with priority");
            handlers.priority = Some(descriptor);
        } else {
            info!(handler = %descriptor.name, "handler registered");
            handlers.others.push(descriptor);
        }
        Ok(())
    }

    /// Names in dispatch order, priority handler first.
    pub fn names(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers
            .priority
            .iter()
            .chain(handlers.others.iter())
            .map(|h| h.name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.priority.is_none() && handlers.others.is_empty()
    }

    /// Dispatch one event through the handler chain.
    ///
    /// The priority handler runs first; if it reports the event handled, the
    /// chain stops there and `true` is returned. Otherwise every other handler
    /// runs in registration order. A handler that errors or panics is logged
    /// and skipped; nothing propagates to the caller.
    pub async fn dispatch(
        &self,
        transport: &SharedTransport,
        event: &ChatEvent,
        is_group: bool,
    ) -> bool {
        // Snapshot so no lock is held across handler awaits.
        let (priority, others) = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            (handlers.priority.clone(), handlers.others.clone())
        };

        if let Some(p) = priority {
            if run_isolated(&p, transport, event, is_group).await {
                debug!(handler = %p.name, "priority handler claimed event");
                return true;
            }
        }

        for h in &others {
            run_isolated(h, transport, event, is_group).await;
        }
        false
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one handler, converting errors and panics into a logged `false`.
async fn run_isolated(
    descriptor: &HandlerDescriptor,
    transport: &SharedTransport,
    event: &ChatEvent,
    is_group: bool,
) -> bool {
    let t = Instant::now();
    let result = AssertUnwindSafe(descriptor.handler.on_message(transport, event, is_group))
        .catch_unwind()
        .await;
    let elapsed_ms = t.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(handled)) => {
            debug!(handler = %descriptor.name, duration_ms = elapsed_ms, handled, "handler completed");
            handled
        }
        Ok(Err(e)) => {
            error!(
                handler = %descriptor.name,
                conversation = %event.conversation_id,
                error = %e,
                "handler failed"
            );
            false
        }
        Err(_) => {
            error!(
                handler = %descriptor.name,
                conversation = %event.conversation_id,
                "handler panicked"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rqbot_channels::MemoryTransport;

    use super::*;
    use crate::error::HandlerError;
    use crate::types::MessageHandler;

    enum Behaviour {
        Handled,
        Declined,
        Fails,
        Panics,
    }

    struct Probe {
        label: &'static str,
        behaviour: Behaviour,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl MessageHandler for Probe {
        async fn on_message(
            &self,
            _transport: &SharedTransport,
            _event: &ChatEvent,
            _is_group: bool,
        ) -> Result<bool, HandlerError> {
            self.calls.lock().unwrap().push(self.label);
            match self.behaviour {
                Behaviour::Handled => Ok(true),
                Behaviour::Declined => Ok(false),
                Behaviour::Fails => Err(HandlerError::ExecutionFailed("boom".into())),
                Behaviour::Panics => panic!("handler exploded"),
            }
        }
    }

    fn probe(
        label: &'static str,
        behaviour: Behaviour,
        calls: &Arc<Mutex<Vec<&'static str>>>,
    ) -> HandlerDescriptor {
        HandlerDescriptor::new(
            label,
            Arc::new(Probe {
                label,
                behaviour,
                calls: Arc::clone(calls),
            }),
        )
    }

    fn transport() -> SharedTransport {
        Arc::new(MemoryTransport::new(Some("bot")))
    }

    #[tokio::test]
    async fn priority_runs_first_even_when_registered_last() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = HandlerRegistry::new();
        reg.register(probe("a", Behaviour::Declined, &calls)).unwrap();
        reg.register(probe("p", Behaviour::Declined, &calls).with_priority())
            .unwrap();
        reg.register(probe("b", Behaviour::Declined, &calls)).unwrap();

        let handled = reg
            .dispatch(&transport(), &ChatEvent::new("c", "u", "hi"), false)
            .await;

        assert!(!handled);
        assert_eq!(*calls.lock().unwrap(), vec!["p", "a", "b"]);
        assert_eq!(reg.names(), vec!["p", "a", "b"]);
    }

    #[tokio::test]
    async fn handled_priority_short_circuits_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = HandlerRegistry::new();
        reg.register(probe("p", Behaviour::Handled, &calls).with_priority())
            .unwrap();
        reg.register(probe("a", Behaviour::Declined, &calls)).unwrap();

        let handled = reg
            .dispatch(&transport(), &ChatEvent::new("c", "u", "hi"), false)
            .await;

        assert!(handled);
        assert_eq!(*calls.lock().unwrap(), vec!["p"]);
    }

    #[tokio::test]
    async fn failures_and_panics_do_not_stop_the_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = HandlerRegistry::new();
        reg.register(probe("p", Behaviour::Panics, &calls).with_priority())
            .unwrap();
        reg.register(probe("a", Behaviour::Fails, &calls)).unwrap();
        reg.register(probe("b", Behaviour::Panics, &calls)).unwrap();
        reg.register(probe("c", Behaviour::Declined, &calls)).unwrap();

        let handled = reg
            .dispatch(&transport(), &ChatEvent::new("c", "u", "hi"), false)
            .await;

        assert!(!handled);
        assert_eq!(*calls.lock().unwrap(), vec!["p", "a", "b", "c"]);
    }

    #[test]
    fn second_priority_is_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = HandlerRegistry::new();
        reg.register(probe("p", Behaviour::Handled, &calls).with_priority())
            .unwrap();
        let err = reg
            .register(probe("q", Behaviour::Handled, &calls).with_priority())
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::PriorityTaken {
                existing: "p".into(),
                rejected: "q".into()
            }
        );
        assert_eq!(reg.names(), vec!["p"]);
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let reg = HandlerRegistry::new();
        reg.register(probe("a", Behaviour::Declined, &calls)).unwrap();
        assert_eq!(
            reg.register(probe("a", Behaviour::Declined, &calls)),
            Err(RegistryError::DuplicateName("a".into()))
        );
        assert_eq!(
            reg.register(probe(" ", Behaviour::Declined, &calls)),
            Err(RegistryError::EmptyName)
        );
    }

    #[tokio::test]
    async fn empty_registry_declines() {
        let reg = HandlerRegistry::default();
        assert!(reg.is_empty());
        assert!(
            !reg.dispatch(&transport(), &ChatEvent::new("c", "u", "hi"), false)
                .await
        );
    }
}
