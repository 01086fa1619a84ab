//! Domain layer between `dpsync-api` and the CLI.
//!
//! This crate owns the business logic of a distribution point sync run:
//!
//! - **[`SyncEngine`]** — the batch sync driver. Given an ordered list of
//!   registered [`Category`] values and a validated [`TargetHandle`], it
//!   processes one category at a time, one item at a time, isolating both
//!   item-level and category-level failures, and returns an aggregated
//!   [`RunReport`]. Partial failure is the expected steady state; the
//!   engine never errors for it.
//!
//! - **[`ContentProvider`]** — the capability pair each category carries:
//!   `enumerate` (list the category's items) and `distribute` (apply the
//!   copy action to one item). Implemented over HTTP by the catalog's
//!   remote provider and by scripted doubles in tests.
//!
//! - **[`catalog`]** — wires a [`dpsync_api::SiteClient`] into the seven
//!   standard content categories and surfaces distribution points for
//!   operator selection.
//!
//! - **[`SyncEvent`]** — structured progress events (category started,
//!   item outcome, category finished) emitted through an optional channel
//!   so renderers and log sinks stay outside the core.

pub mod catalog;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod provider;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
// The API client is re-exported so CLI consumers need only this crate.
pub use dpsync_api::SiteClient;

pub use category::Category;
pub use config::{AuthCredentials, ServerConfig, TlsVerification};
pub use engine::{SyncEngine, SyncOptions};
pub use error::CoreError;
pub use event::SyncEvent;
pub use model::{Item, Node, Outcome, TargetHandle};
pub use provider::{ActionError, ContentProvider, ProviderError};
pub use report::{CategoryStats, RunReport};
