//! Backend selection and hosted table API configuration.

use serde::{Deserialize, Serialize};

/// Which backend implementation serves the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Direct PostgreSQL access through a connection pool.
    #[default]
    Postgres,
    /// Hosted PostgREST-style table API over HTTP.
    Rest,
    /// Process-local tables; data is lost on exit.
    Memory,
}

/// Backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation to use.
    #[serde(default)]
    pub kind: BackendKind,
}

/// Hosted table API (PostgREST protocol) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL of the table API, e.g. `https://project.example.co/rest/v1`.
    #[serde(default)]
    pub base_url: String,
    /// API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: String,
    /// Database schema exposed by the API.
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            schema: default_schema(),
        }
    }
}

fn default_schema() -> String {
    "public".to_string()
}
