pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intent::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/healthz", get(health::health_handler))
        .route("/parse-intent", post(handlers::handle_parse_intent))
        // Path used by the web front-end
        .route("/api/parse-intent", post(handlers::handle_parse_intent))
        .with_state(state)
}
