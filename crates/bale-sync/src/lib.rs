//! Ledger synchronization for Bale.
//!
//! [`SyncEngine`] pushes staged records in dependency order (the
//! envelope before its members, relation records after both endpoints
//! exist) and advances local lifecycle flags only on acknowledgment,
//! so a re-run after partial failure retries exactly what is missing.
//! [`find_live_node`] is the linear failover used when the configured
//! ledger node stops answering.

pub mod discovery;
pub mod engine;
pub mod error;
pub mod report;

pub use discovery::find_live_node;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use report::{PushFailure, SyncReport};
