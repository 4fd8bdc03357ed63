use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use rqbot_router::MessageRouter;

/// Shared state handed to every Axum handler.
pub struct AppState {
    pub router: Arc<MessageRouter>,
    /// Registered handler names, priority first.
    pub handlers: Vec<String>,
    /// Bearer token required on `POST /events`, if any.
    pub ingress_token: Option<String>,
}

impl AppState {
    pub fn new(
        router: Arc<MessageRouter>,
        handlers: Vec<String>,
        ingress_token: Option<String>,
    ) -> Self {
        Self {
            router,
            handlers,
            ingress_token: ingress_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Assemble the Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/events", post(crate::http::events::events_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
