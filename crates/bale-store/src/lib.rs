//! Local staging store for Bale.
//!
//! One SQLite database holds the staging table (artifact and envelope
//! records keyed by an internal row id, unique on the record UUID) and
//! the alias table. The [`StagingStore`] handle is the single source
//! of truth for what is staged and where each record sits in its
//! lifecycle; it is constructed explicitly and passed to whatever
//! needs it, never held as process-global state.

pub mod alias;
pub mod error;
pub mod store;

pub use alias::AliasEntry;
pub use error::{StoreError, StoreResult};
pub use store::{Filter, StagingEntry, StagingStore};
