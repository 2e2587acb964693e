//! Decoder types and traits

use crate::error::Result;
use serde_json::Value;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Value>>;

    /// Decode the response body into a single JSON value (full response)
    fn decode_raw(&self, body: &str) -> Result<Value>;
}

/// Paging counters reported alongside a shot listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Page the server answered with
    pub page: Option<u64>,
    /// Total number of pages
    pub pages: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
    /// Total number of items
    pub total: Option<u64>,
}

impl PageInfo {
    /// Read the counters from a listing body
    ///
    /// The API reports some counters as strings, so both forms are accepted.
    pub fn from_body(body: &Value) -> Self {
        let read = |key: &str| match body.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };

        Self {
            page: read("page"),
            pages: read("pages"),
            per_page: read("per_page"),
            total: read("total"),
        }
    }

    /// Whether the server says no page follows this one
    pub fn is_last_page(&self) -> bool {
        matches!((self.page, self.pages), (Some(page), Some(pages)) if page >= pages)
    }
}
