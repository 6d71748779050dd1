//! Stub collaborators shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ChatProvider, LlmError};

pub const SCENARIO_A_INPUT: &str = "https://item.taobao.com/item.htm?id=12345";
pub const SCENARIO_A_REPLY: &str = r#"{"products":[{"id":"12345","title":"【测试商品】T-shirt","price":99.9,"url":"https://item.taobao.com/item.htm?id=12345","image":"https://via.placeholder.com/300x300.png?text=Product+Image"}]}"#;

enum Reply {
    Content(Option<String>),
    Failure(u16),
}

/// Provider that answers every request the same way and records what it was sent.
pub struct StubProvider {
    reply: Reply,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl StubProvider {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn reply(content: &str) -> Self {
        Self::new(Reply::Content(Some(content.to_string())))
    }

    pub fn no_content() -> Self {
        Self::new(Reply::Content(None))
    }

    pub fn failing(status: u16) -> Self {
        Self::new(Reply::Failure(status))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn complete_json(&self, system: &str, user: &str) -> Result<Option<String>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((system.to_string(), user.to_string()));
        match &self.reply {
            Reply::Content(content) => Ok(content.clone()),
            Reply::Failure(status) => Err(LlmError::Api {
                status: *status,
                message: "stub provider failure".to_string(),
            }),
        }
    }
}
