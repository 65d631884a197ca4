//! Atlas directory client: node discovery and network listings.

use tracing::debug;

use crate::error::ApiResult;
use crate::ledger::normalize_base;
use crate::reply::Reply;
use crate::types::{LedgerNodeRecord, NetworkSpaceRecord};

const PING: &str = "/atlas/api/v1/ping";
const LEDGER_NODES: &str = "/atlas/api/v1/ledger_nodes";
const NETWORK_SPACES: &str = "/atlas/api/v1/network_spaces";

/// Directory lookups used for node failover and network listings.
pub trait Atlas {
    fn ping(&self) -> ApiResult<()>;
    fn ledger_nodes(&self, network: &str) -> ApiResult<Vec<LedgerNodeRecord>>;
    fn network_spaces(&self) -> ApiResult<Vec<NetworkSpaceRecord>>;
}

/// Blocking HTTP client for the atlas directory service.
pub struct HttpAtlas {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpAtlas {
    pub fn new(address: &str) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self {
            client,
            base_url: normalize_base(address),
        })
    }

    fn get(&self, path: &str) -> ApiResult<Reply> {
        debug!(url = %format!("{}{}", self.base_url, path), "GET");
        let reply = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()?
            .json::<Reply>()?;
        Ok(reply)
    }
}

impl Atlas for HttpAtlas {
    fn ping(&self) -> ApiResult<()> {
        self.get(PING)?.ack()
    }

    fn ledger_nodes(&self, network: &str) -> ApiResult<Vec<LedgerNodeRecord>> {
        self.get(&format!("{LEDGER_NODES}/{network}"))?.decode()
    }

    fn network_spaces(&self) -> ApiResult<Vec<NetworkSpaceRecord>> {
        self.get(NETWORK_SPACES)?.decode()
    }
}

#[cfg(test)]
mod tests {
    use crate::reply::Reply;
    use crate::types::LedgerNodeRecord;

    #[test]
    fn node_list_reply_decodes() {
        let raw = r#"{
            "status": "success",
            "message": "OK",
            "result_type": "ListOf:LedgerNodeRecord",
            "result": [
                {"uuid": "u-1", "name": "first", "network_name": "zephyr-sc", "api_url": "10.0.0.1:818"},
                {"uuid": "u-2", "name": "second", "network_name": "zephyr-sc", "api_url": "10.0.0.2:818", "status": "RUNNING"}
            ]
        }"#;
        let reply: Reply = serde_json::from_str(raw).unwrap();
        let nodes: Vec<LedgerNodeRecord> = reply.decode().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].api_url, "10.0.0.1:818");
        assert_eq!(nodes[1].status, "RUNNING");
    }
}
