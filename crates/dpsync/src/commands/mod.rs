//! Command handlers.

pub mod config_cmd;
pub mod nodes;
pub mod sync;
pub mod util;
