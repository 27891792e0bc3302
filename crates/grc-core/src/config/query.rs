//! Query planning and request bounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest page size any configuration may allow.
pub const PAGE_SIZE_CEILING: u64 = 200;

/// Bounds applied to every search request and backend call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when a request does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound page sizes are clamped to, at most [`PAGE_SIZE_CEILING`].
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Time bound for a single repository operation, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl QueryConfig {
    /// The per-operation time bound.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_page_size() -> u64 {
    25
}

fn default_max_page_size() -> u64 {
    PAGE_SIZE_CEILING
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
