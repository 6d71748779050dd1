use std::sync::Arc;

use crate::config::Config;
use crate::intent::IntentResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub resolver: IntentResolver,
    pub config: Arc<Config>,
}
