//! Intent Resolver: turns free-form text into a validated product list via
//! one provider call.
//!
//! Outcome policy:
//! - no content, unparseable content, or no `products` array → `Ok(vec![])`
//! - elements that fail the `Product` schema → dropped, the rest returned
//! - transport / provider failure → `Err(ResolveError::Provider)`

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::intent::models::Product;
use crate::intent::preprocess::classify_input;
use crate::intent::prompts::INTENT_SYSTEM_PROMPT;
use crate::intent::validation::{parse_envelope, validate_products};
use crate::llm_client::{ChatProvider, LlmError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("LLM provider failure: {0}")]
    Provider(#[from] LlmError),

    /// Failure reported by a remote intent endpoint; the message is shown as-is.
    #[error("{0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Where the coordinator gets product lists from.
#[async_trait]
pub trait IntentSource: Send + Sync {
    async fn resolve(&self, text: &str) -> Result<Vec<Product>, ResolveError>;
}

#[derive(Clone)]
pub struct IntentResolver {
    provider: Arc<dyn ChatProvider>,
}

impl IntentResolver {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Resolves `text` into products. `text` is sent to the provider unmodified.
    pub async fn resolve(&self, text: &str) -> Result<Vec<Product>, ResolveError> {
        if text.trim().is_empty() {
            return Err(ResolveError::InvalidInput);
        }

        let input = classify_input(text);
        let platforms: Vec<&str> = input.platforms.iter().map(|p| p.as_str()).collect();
        info!(
            kind = ?input.kind,
            urls = input.urls.len(),
            platforms = ?platforms,
            "Resolving shopping intent"
        );

        let content = self
            .provider
            .complete_json(INTENT_SYSTEM_PROMPT, text)
            .await
            .map_err(|e| {
                error!("Provider call failed: {e}");
                ResolveError::Provider(e)
            })?;

        Ok(normalize_completion(content.as_deref()))
    }
}

#[async_trait]
impl IntentSource for IntentResolver {
    async fn resolve(&self, text: &str) -> Result<Vec<Product>, ResolveError> {
        IntentResolver::resolve(self, text).await
    }
}

/// Deterministic mapping from raw provider content to the products to show.
pub fn normalize_completion(content: Option<&str>) -> Vec<Product> {
    let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
        info!("LLM returned no content, responding with empty product list");
        return Vec::new();
    };
    debug!("Raw response from LLM: {content}");

    let items = match parse_envelope(content) {
        Ok(items) => items,
        Err(violation) => {
            warn!("LLM response did not match the products contract ({violation}), responding with empty product list");
            return Vec::new();
        }
    };

    let batch = validate_products(&items);
    for (index, reason) in &batch.rejected {
        warn!("Dropping product at index {index}: {reason}");
    }
    debug!(
        "Resolved {} product(s), dropped {}",
        batch.products.len(),
        batch.rejected.len()
    );

    batch.products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::test_support::{StubProvider, SCENARIO_A_INPUT, SCENARIO_A_REPLY};

    #[test]
    fn test_normalize_none_and_empty() {
        assert!(normalize_completion(None).is_empty());
        assert!(normalize_completion(Some("")).is_empty());
        assert!(normalize_completion(Some("  \n")).is_empty());
    }

    #[test]
    fn test_normalize_non_json() {
        assert!(normalize_completion(Some("sorry, I cannot help")).is_empty());
    }

    #[test]
    fn test_normalize_missing_products() {
        assert!(normalize_completion(Some(r#"{"result": "none"}"#)).is_empty());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let first = normalize_completion(Some(SCENARIO_A_REPLY));
        let second = normalize_completion(Some(SCENARIO_A_REPLY));
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_a_url_input() {
        let provider = Arc::new(StubProvider::reply(SCENARIO_A_REPLY));
        let resolver = IntentResolver::new(provider.clone());

        let products = resolver.resolve(SCENARIO_A_INPUT).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "12345");
        assert_eq!(products[0].url, SCENARIO_A_INPUT);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_user_text_and_system_prompt_sent_unmodified() {
        let provider = Arc::new(StubProvider::reply(r#"{"products":[]}"#));
        let resolver = IntentResolver::new(provider.clone());

        resolver.resolve("  a red mug  ").await.unwrap();
        let (system, user) = provider.last_request().unwrap();
        assert_eq!(system, INTENT_SYSTEM_PROMPT);
        assert_eq!(user, "  a red mug  ");
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_provider() {
        let provider = Arc::new(StubProvider::reply(r#"{"products":[]}"#));
        let resolver = IntentResolver::new(provider.clone());

        assert!(matches!(
            resolver.resolve("   ").await,
            Err(ResolveError::InvalidInput)
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_content_is_empty_success() {
        let resolver = IntentResolver::new(Arc::new(StubProvider::no_content()));
        assert!(resolver.resolve("a red mug").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let resolver = IntentResolver::new(Arc::new(StubProvider::failing(503)));
        let err = resolver.resolve("a red mug").await.unwrap_err();
        assert!(matches!(err, ResolveError::Provider(LlmError::Api { status: 503, .. })));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_partial_products_filtered() {
        let reply = r#"{"products":[
            {"id":"1","title":"Mug","price":12,"url":"https://example.com/1","image":"https://example.com/1.png"},
            {"id":"2","title":"Cup","url":"https://example.com/2","image":"https://example.com/2.png"}
        ]}"#;
        let resolver = IntentResolver::new(Arc::new(StubProvider::reply(reply)));

        let products = resolver.resolve("mugs").await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "1");
    }
}
