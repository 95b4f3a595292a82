//! Routing configuration snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable routing rules. Replaced wholesale on refresh, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingConfig {
    pub default_backend: String,
    pub overrides_by_category: HashMap<String, String>,
}

/// Wire shape of the routing document.
#[derive(Debug, Deserialize)]
struct RoutingDocument {
    #[serde(default)]
    default_model: Option<String>,
    #[serde(default)]
    overrides: HashMap<String, String>,
}

impl RoutingConfig {
    /// The configuration used before any document has been fetched.
    pub fn static_default(backend: impl Into<String>) -> Self {
        Self {
            default_backend: backend.into(),
            overrides_by_category: HashMap::new(),
        }
    }

    /// Parse a routing document; a missing `default_model` falls back to
    /// `static_default`.
    pub fn from_document(bytes: &[u8], static_default: &str) -> Result<Self, serde_json::Error> {
        let doc: RoutingDocument = serde_json::from_slice(bytes)?;
        Ok(Self {
            default_backend: doc
                .default_model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| static_default.to_string()),
            overrides_by_category: doc.overrides,
        })
    }

    /// Backend for a category: its override, else the default.
    pub fn backend_for(&self, category: &str) -> &str {
        self.overrides_by_category
            .get(category)
            .map(String::as_str)
            .unwrap_or(&self.default_backend)
    }
}
