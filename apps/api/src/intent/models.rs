use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One candidate item surfaced to the user.
///
/// `price` keeps the provider's JSON number as-is, and fields beyond the five
/// required ones ride along in `extra`, so a compliant response is returned
/// unmodified at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: Number,
    pub url: String,
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
