//! Structured progress events emitted during a sync run.
//!
//! The engine is the only producer; renderers and log sinks consume them
//! through an `mpsc` channel so the driver itself has no console or
//! filesystem dependency.

use crate::model::{Item, Outcome};
use crate::report::CategoryStats;

/// One progress event from the sync driver.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A category's items were enumerated; processing begins.
    CategoryStarted { category: String, total: usize },

    /// A category's enumeration call failed; the category is skipped.
    EnumerationFailed { category: String, reason: String },

    /// One item finished, successfully or not.
    Item {
        category: String,
        item: Item,
        outcome: Outcome,
    },

    /// A category's stats are frozen.
    CategoryFinished { stats: CategoryStats },

    /// The run was cancelled; the report reflects partial completion.
    Cancelled,
}
