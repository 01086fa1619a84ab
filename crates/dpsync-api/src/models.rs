//! Wire models for the management API.

use serde::{Deserialize, Serialize};

/// Response envelope wrapping every management API payload.
///
/// `status` is `"ok"` on success; anything else is an error and `message`
/// carries the service's explanation.
#[derive(Debug, Deserialize)]
pub struct ServiceResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// A distribution point as reported by the site server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistributionPoint {
    /// Stable node identifier, used as source/target handle.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Fully qualified server name hosting the node.
    #[serde(default, rename = "serverName")]
    pub server_name: Option<String>,
    /// Optional operator-facing description.
    #[serde(default)]
    pub description: Option<String>,
}

/// One unit of distributable content within a content kind.
///
/// `id` is authoritative for the distribute action; `name` exists for
/// reporting and logging only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub name: String,
    /// Content payload size, when the service reports one.
    #[serde(default, rename = "sizeBytes")]
    pub size_bytes: Option<u64>,
}
