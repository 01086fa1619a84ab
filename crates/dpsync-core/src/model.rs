//! Domain model: items, nodes, outcomes, and the validated target handle.

use serde::Serialize;

use crate::error::CoreError;

/// One unit of distributable content within a category.
///
/// `id` is the category-specific identifier the distribute action needs;
/// `name` exists for reporting and logging only. Both are opaque to the
/// sync driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Validated handle identifying the destination distribution point.
///
/// Construction is the precondition gate: an empty or whitespace-only
/// identifier is rejected before any category processing can start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetHandle(String);

impl TargetHandle {
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidTarget {
                reason: "node identifier is empty".into(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain view of a distribution point, for operator selection.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub server: Option<String>,
    pub description: Option<String>,
}

impl From<dpsync_api::DistributionPoint> for Node {
    fn from(dp: dpsync_api::DistributionPoint) -> Self {
        Self {
            id: dp.id,
            name: dp.name,
            server: dp.server_name,
            description: dp.description,
        }
    }
}

/// Per-item result. Created when the distribute action completes or
/// fails; never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Failure { reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_handle_rejects_empty() {
        assert!(matches!(
            TargetHandle::new(""),
            Err(CoreError::InvalidTarget { .. })
        ));
        assert!(matches!(
            TargetHandle::new("   "),
            Err(CoreError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn target_handle_accepts_identifier() {
        let handle = TargetHandle::new("dp-002").expect("valid handle");
        assert_eq!(handle.as_str(), "dp-002");
    }
}
