//! JSON output formatting

use chrono::Utc;
use serde::Serialize;

use crate::catalog::CacheInfo;

/// Envelope for JSON output
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// RFC 3339 time the output was produced
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Catalog state at the time of output. Listings taken while population
    /// is still running are partial, and this says so.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CacheInfo>,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                catalog: None,
            },
        }
    }

    /// Attach the catalog state the data was read from.
    pub fn with_catalog(mut self, info: CacheInfo) -> Self {
        self.meta.catalog = Some(info);
        self
    }
}

impl<T: Serialize> JsonOutput<T> {
    pub fn to_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    JsonOutput::new(data).to_pretty()
}
