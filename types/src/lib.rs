//! Shared types for the arcade engine.
//!
//! [arcade] holds the session data model (modes, phases, ledger, streaks and the
//! persisted record) and [config] holds the tunable engine parameters.

pub mod arcade;
pub mod config;

pub use config::{ConfigError, EngineConfig};
