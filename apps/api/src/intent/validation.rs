//! Shape validation for provider output.
//!
//! The provider is an untrusted producer: its JSON is checked field by field and
//! any element that does not satisfy the `Product` schema is dropped, never patched.
//! Fields outside the schema are passed through untouched.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::intent::models::Product;
use crate::llm_client::strip_json_fences;

const PRODUCT_FIELDS: [&str; 5] = ["id", "title", "price", "url", "image"];

/// Why the completion as a whole could not be read as `{"products": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    #[error("content is not valid JSON: {0}")]
    NotJson(String),

    #[error("top-level JSON value is not an object")]
    NotAnObject,

    #[error("object has no `products` array")]
    MissingProductsArray,
}

/// Why a single array element was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("element is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),

    #[error("field `{0}` is blank")]
    BlankField(&'static str),

    #[error("price is negative")]
    NegativePrice,

    #[error("duplicate id `{0}`")]
    DuplicateId(String),
}

/// Result of validating a `products` array.
#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub products: Vec<Product>,
    /// (index in the original array, reason)
    pub rejected: Vec<(usize, Rejection)>,
}

/// Parses completion text into the raw `products` array.
pub fn parse_envelope(content: &str) -> Result<Vec<Value>, ShapeViolation> {
    let value: Value = serde_json::from_str(strip_json_fences(content))
        .map_err(|e| ShapeViolation::NotJson(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(ShapeViolation::NotAnObject);
    };

    match object.remove("products") {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(ShapeViolation::MissingProductsArray),
    }
}

/// Validates one element against the `Product` schema.
pub fn validate_product(value: &Value) -> Result<Product, Rejection> {
    let object = value.as_object().ok_or(Rejection::NotAnObject)?;

    Ok(Product {
        id: required_string(object, "id")?,
        title: required_string(object, "title")?,
        price: required_price(object)?,
        url: required_string(object, "url")?,
        image: required_string(object, "image")?,
        extra: object
            .iter()
            .filter(|(key, _)| !PRODUCT_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    })
}

/// Validates every element, keeping input order and the first occurrence of each id.
pub fn validate_products(items: &[Value]) -> ValidatedBatch {
    let mut batch = ValidatedBatch::default();
    let mut seen_ids = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        match validate_product(item) {
            Ok(product) if !seen_ids.insert(product.id.clone()) => {
                batch
                    .rejected
                    .push((index, Rejection::DuplicateId(product.id)));
            }
            Ok(product) => batch.products.push(product),
            Err(reason) => batch.rejected.push((index, reason)),
        }
    }

    batch
}

fn required_string(object: &Map<String, Value>, field: &'static str) -> Result<String, Rejection> {
    match object.get(field) {
        None | Some(Value::Null) => Err(Rejection::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(Rejection::BlankField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Rejection::WrongType(field)),
    }
}

fn required_price(object: &Map<String, Value>) -> Result<Number, Rejection> {
    match object.get("price") {
        None | Some(Value::Null) => Err(Rejection::MissingField("price")),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|p| p < 0.0) => {
            Err(Rejection::NegativePrice)
        }
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(_) => Err(Rejection::WrongType("price")),
    }
}
