//! Wire protocol for Bale's two network peers.
//!
//! The ledger gateway records artifacts, URIs, and relations; the
//! atlas directory lists networks and the ledger nodes registered on
//! them. Both speak the same `{status, message, result_type, result}`
//! reply envelope over plain HTTP. [`Ledger`] and [`Atlas`] are the
//! seams the sync engine is tested through.

pub mod atlas;
pub mod error;
pub mod ledger;
pub mod reply;
pub mod types;

pub use atlas::{Atlas, HttpAtlas};
pub use error::{ApiError, ApiResult};
pub use ledger::{normalize_base, HttpLedger, Ledger};
pub use reply::{Reply, Status};
pub use types::{Credentials, EnvelopeLink, LedgerNodeRecord, NetworkSpaceRecord, PartLink, PartRecord};
