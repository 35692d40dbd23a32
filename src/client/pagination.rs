//! Cursor pagination helpers for Slack Web API requests
//!
//! Slack list methods return a `response_metadata.next_cursor` value that is
//! empty on the last page.

use serde::{Deserialize, Serialize};

/// Largest page size Slack accepts on list methods.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Cursor parameters for a list request.
///
/// # Example
/// ```ignore
/// let params = CursorParams::new().limit(200).cursor("dGVhbTpDMDYx");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorParams {
    /// Continuation cursor from the previous page
    pub cursor: Option<String>,
    /// Items per page
    pub limit: Option<usize>,
}

impl CursorParams {
    /// Create empty params (first page, server default size).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the continuation cursor. Empty cursors are ignored.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        let cursor = cursor.into();
        self.cursor = if cursor.is_empty() { None } else { Some(cursor) };
        self
    }

    /// Set the page size, clamped to [`MAX_PAGE_SIZE`].
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Convert to query string parameters.
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }

        if let Some(ref cursor) = self.cursor {
            params.push(("cursor", cursor.clone()));
        }

        params
    }
}

/// `response_metadata` block of a Slack list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    /// The cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<String> {
        let cursor = self.next_cursor.trim();
        if cursor.is_empty() {
            None
        } else {
            Some(cursor.to_string())
        }
    }
}

/// One page of a cursor-paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPage<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Cursor for the following page; `None` on the last page
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    /// A page with no continuation.
    #[cfg(test)]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// A page followed by `cursor`.
    #[cfg(test)]
    pub fn with_cursor(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(cursor.into()),
        }
    }

    /// Whether another page follows.
    #[cfg(test)]
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}
