//! Linear node failover through the atlas directory.

use tracing::{debug, info};

use bale_api::{Atlas, LedgerNodeRecord};

use crate::error::{SyncError, SyncResult};

/// Find a live ledger node on `network`.
///
/// Candidates are probed one at a time in directory order and the
/// first that answers wins; later candidates are never contacted. No
/// health caching and no backoff; this is a user-invoked recovery
/// path, not a hot path.
pub fn find_live_node<A, P>(atlas: &A, network: &str, mut probe: P) -> SyncResult<LedgerNodeRecord>
where
    A: Atlas + ?Sized,
    P: FnMut(&str) -> bool,
{
    let nodes = atlas.ledger_nodes(network)?;
    if nodes.is_empty() {
        return Err(SyncError::NoNodesRegistered(network.to_string()));
    }

    for node in nodes {
        debug!(node = %node.api_url, "probing ledger node");
        if probe(&node.api_url) {
            info!(node = %node.api_url, "adopting ledger node");
            return Ok(node);
        }
    }
    Err(SyncError::NoLiveNode(network.to_string()))
}
