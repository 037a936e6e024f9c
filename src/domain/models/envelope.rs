//! Wire envelope shared by every API response.
//!
//! Every response body, successful or not, is wrapped as
//! `{"success": .., "errors": [..], "messages": [..], "result": ..}`.
//! List endpoints add a `result_info` block describing the page.

use serde::{Deserialize, Serialize};

/// A code and message returned by the API as an error or informational message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Provider error or message code
    pub code: i64,
    /// Human readable message
    pub message: String,
}

impl ResponseInfo {
    /// Build a response info entry
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The envelope without its endpoint-specific `result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<ResponseInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<ResponseInfo>,
}

/// Cursor positions returned by cursor-paginated endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfoCursors {
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default, rename = "total_count")]
    pub total: u32,
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub cursors: ResultInfoCursors,
}

impl ResultInfo {
    /// True when another page follows this one.
    pub fn has_next_page(&self) -> bool {
        self.page > 0 && self.page < self.total_pages
    }
}

/// Envelope carrying a single typed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(flatten)]
    pub response: Response,
    pub result: T,
}

/// Envelope carrying a page of typed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(flatten)]
    pub response: Response,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    #[serde(default)]
    pub result_info: ResultInfo,
}

// The API sends `"errors": null` on some endpoints.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ResponseInfo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ResponseInfo>>::deserialize(deserializer)?.unwrap_or_default())
}
