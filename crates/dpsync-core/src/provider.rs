//! The capability pair each category carries: enumerate + distribute.
//!
//! The sync driver never talks to the management API directly -- it only
//! sees this trait, which keeps the driver testable with scripted doubles
//! and keeps transport failures mapped into the two error kinds the run
//! accounting understands.

use async_trait::async_trait;

use crate::model::{Item, TargetHandle};

/// Category-level enumeration failure.
///
/// Non-fatal to the run: the category is recorded with zero processed
/// items and processing continues with the next category.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<dpsync_api::Error> for ProviderError {
    fn from(err: dpsync_api::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Item-level distribution failure.
///
/// Non-fatal to the category: the item is recorded as failed with its
/// reason string and processing continues with the next item.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure raised when a distribute call exceeds the configured
    /// per-item timeout.
    pub fn timed_out(limit: std::time::Duration) -> Self {
        Self::new(format!("timed out after {}s", limit.as_secs()))
    }
}

impl From<dpsync_api::Error> for ActionError {
    fn from(err: dpsync_api::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Capability pair supplied by the platform integration for one category.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// List the category's items, in the order the service reports them.
    async fn enumerate(&self) -> Result<Vec<Item>, ProviderError>;

    /// Copy one item onto the target distribution point.
    async fn distribute(&self, item: &Item, target: &TargetHandle) -> Result<(), ActionError>;
}
