use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::intent::models::Product;
use crate::intent::resolver::{IntentSource, ResolveError};

const FALLBACK_DETAIL: &str = "Failed to parse intent";

/// Long enough to cover the server's own provider timeout plus a retry.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(75);

/// `IntentSource` backed by a running `POST /parse-intent` endpoint.
#[derive(Clone)]
pub struct HttpIntentClient {
    client: Client,
    endpoint: String,
}

impl HttpIntentClient {
    /// `timeout` bounds the whole request; an expired request settles as a failure.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/parse-intent", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IntentSource for HttpIntentClient {
    async fn resolve(&self, text: &str) -> Result<Vec<Product>, ResolveError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| ResolveError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_owned))
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| FALLBACK_DETAIL.to_string());
            return Err(ResolveError::Remote(detail));
        }

        response
            .json::<Vec<Product>>()
            .await
            .map_err(|e| ResolveError::Remote(e.to_string()))
    }
}
