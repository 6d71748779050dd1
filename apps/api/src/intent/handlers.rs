//! Axum route handlers for the intent API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::intent::models::Product;
use crate::state::AppState;

/// POST /parse-intent
///
/// Body `{ "text": string }`. Responds with the bare product array; a blank,
/// missing or non-string `text` (or an unreadable body) is a 400.
pub async fn handle_parse_intent(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Json(body) = payload.map_err(|e| {
        debug!("Rejected request body: {e}");
        AppError::InvalidInput
    })?;

    let text = body
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::InvalidInput)?;
    info!(chars = text.chars().count(), "Received intent request");

    let products = state.resolver.resolve(text).await?;
    Ok(Json(products))
}
