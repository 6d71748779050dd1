//! Request Coordinator: runs resolution attempts on behalf of a front-end and
//! publishes `RequestState` through a watch channel.
//!
//! Every transition is applied inside a single `send_modify`/`send_if_modified`
//! call, so readers never observe `is_loading`, `products` and `error` out of step.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::intent::models::Product;
use crate::intent::resolver::{IntentSource, ResolveError};

/// State read by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState {
    /// Text currently being composed.
    pub input_text: String,
    /// Text of the most recent submission.
    pub submitted_text: Option<String>,
    /// In resolver order.
    pub products: Vec<Product>,
    pub is_loading: bool,
    pub error: Option<String>,
    attempt: u64,
}

/// What the presentation layer should show for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing submitted yet.
    Idle,
    Loading,
    Found(usize),
    /// A submission settled with no products.
    NoIntent,
    Failed,
}

impl RequestState {
    pub fn outcome(&self) -> Outcome {
        if self.is_loading {
            Outcome::Loading
        } else if self.error.is_some() {
            Outcome::Failed
        } else if !self.products.is_empty() {
            Outcome::Found(self.products.len())
        } else if self.submitted_text.is_some() {
            Outcome::NoIntent
        } else {
            Outcome::Idle
        }
    }
}

/// How overlapping submissions settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementPolicy {
    /// Only the most recent submission may write its result.
    #[default]
    LatestWins,
    /// Whichever submission settles last overwrites the state.
    LastWriteWins,
}

struct Inner {
    source: Arc<dyn IntentSource>,
    state: watch::Sender<RequestState>,
    policy: SettlementPolicy,
}

#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

impl RequestCoordinator {
    pub fn new(source: Arc<dyn IntentSource>) -> Self {
        Self::with_policy(source, SettlementPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn IntentSource>, policy: SettlementPolicy) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                state,
                policy,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.inner.state.subscribe()
    }

    pub fn set_user_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_modify(|s| s.input_text = text);
    }

    pub fn clear_error(&self) {
        self.inner.state.send_modify(|s| s.error = None);
    }

    pub fn clear_products(&self) {
        self.inner.state.send_modify(|s| s.products.clear());
    }

    /// Starts a resolution attempt and returns immediately.
    ///
    /// Blank text is a no-op and returns `None`. Otherwise the state switches to
    /// loading at once and the returned handle completes after settlement.
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, text: &str) -> Option<JoinHandle<()>> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }

        let text = text.to_string();
        let mut attempt = 0;
        self.inner.state.send_modify(|s| {
            s.attempt += 1;
            attempt = s.attempt;
            s.is_loading = true;
            s.error = None;
            s.products.clear();
            s.submitted_text = Some(text.clone());
        });
        info!(attempt, "Submitting intent request");

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            let source = Arc::clone(&inner.source);
            // Run the call in its own task so a panic still settles the state.
            let result = match tokio::spawn(async move { source.resolve(&text).await }).await {
                Ok(result) => result,
                Err(join_error) => Err(ResolveError::Internal(join_error.to_string())),
            };
            inner.settle(attempt, result);
        }))
    }
}

impl Inner {
    fn settle(&self, attempt: u64, result: Result<Vec<Product>, ResolveError>) {
        let policy = self.policy;
        let applied = self.state.send_if_modified(|s| {
            if policy == SettlementPolicy::LatestWins && s.attempt != attempt {
                return false;
            }
            s.is_loading = false;
            match result {
                Ok(products) => {
                    s.products = products;
                    s.error = None;
                }
                Err(e) => {
                    warn!(attempt, "Intent request failed: {e}");
                    s.products.clear();
                    s.error = Some(e.to_string());
                }
            }
            true
        });

        if !applied {
            debug!(attempt, "Discarding result of superseded submission");
        }
    }
}
