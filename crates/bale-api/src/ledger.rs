//! Ledger gateway client: typed endpoints over the reply envelope.

use serde::Serialize;
use tracing::debug;

use bale_types::{ArtifactId, ArtifactRecord, UriRecord};

use crate::error::ApiResult;
use crate::reply::Reply;
use crate::types::{Credentials, EnvelopeLink, PartLink, PartRecord};

const PING: &str = "/ledger/api/v1/ping";
const ARTIFACTS: &str = "/ledger/api/v1/artifacts";
const ARTIFACT_URI: &str = "/ledger/api/v1/artifacts/uri";
const ENVELOPE_ARTIFACT: &str = "/ledger/api/v1/envelope/artifact";
const ARTIFACT_PART: &str = "/ledger/api/v1/artifacts/part";
const PARTS: &str = "/ledger/api/v1/parts";

/// Operations the push and query paths need from a ledger node. The
/// HTTP client implements this; tests substitute scripted fakes.
pub trait Ledger {
    fn ping(&self) -> ApiResult<()>;
    fn create_artifact(&self, creds: &Credentials, record: &ArtifactRecord) -> ApiResult<()>;
    fn fetch_artifact(&self, uuid: ArtifactId) -> ApiResult<ArtifactRecord>;
    fn add_uri(&self, creds: &Credentials, artifact: ArtifactId, uri: &UriRecord) -> ApiResult<()>;
    fn link_to_envelope(&self, creds: &Credentials, link: &EnvelopeLink) -> ApiResult<()>;
    fn link_to_part(&self, creds: &Credentials, link: &PartLink) -> ApiResult<()>;
    fn fetch_part(&self, uuid: &str) -> ApiResult<PartRecord>;
}

#[derive(Serialize)]
struct ArtifactBody<'a> {
    public_key: &'a str,
    private_key: &'a str,
    artifact: &'a ArtifactRecord,
}

#[derive(Serialize)]
struct UriBody<'a> {
    public_key: &'a str,
    private_key: &'a str,
    uuid: ArtifactId,
    uri: &'a UriRecord,
}

#[derive(Serialize)]
struct RelationBody<'a, R: Serialize> {
    public_key: &'a str,
    private_key: &'a str,
    relation: &'a R,
}

/// Blocking HTTP client for one ledger node.
///
/// Requests carry no deadline; a dead node manifests as a transport
/// error rather than a timeout, matching how liveness is probed.
pub struct HttpLedger {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpLedger {
    pub fn new(address: &str) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self {
            client,
            base_url: normalize_base(address),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
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

    fn post<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Reply> {
        debug!(url = %format!("{}{}", self.base_url, path), "POST");
        let reply = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()?
            .json::<Reply>()?;
        Ok(reply)
    }
}

impl Ledger for HttpLedger {
    fn ping(&self) -> ApiResult<()> {
        self.get(PING)?.ack()
    }

    fn create_artifact(&self, creds: &Credentials, record: &ArtifactRecord) -> ApiResult<()> {
        let body = ArtifactBody {
            public_key: &creds.public_key,
            private_key: &creds.private_key,
            artifact: record,
        };
        self.post(ARTIFACTS, &body)?.ack()
    }

    fn fetch_artifact(&self, uuid: ArtifactId) -> ApiResult<ArtifactRecord> {
        self.get(&format!("{ARTIFACTS}/{uuid}"))?.decode()
    }

    fn add_uri(&self, creds: &Credentials, artifact: ArtifactId, uri: &UriRecord) -> ApiResult<()> {
        let body = UriBody {
            public_key: &creds.public_key,
            private_key: &creds.private_key,
            uuid: artifact,
            uri,
        };
        self.post(ARTIFACT_URI, &body)?.ack()
    }

    fn link_to_envelope(&self, creds: &Credentials, link: &EnvelopeLink) -> ApiResult<()> {
        let body = RelationBody {
            public_key: &creds.public_key,
            private_key: &creds.private_key,
            relation: link,
        };
        self.post(ENVELOPE_ARTIFACT, &body)?.ack()
    }

    fn link_to_part(&self, creds: &Credentials, link: &PartLink) -> ApiResult<()> {
        let body = RelationBody {
            public_key: &creds.public_key,
            private_key: &creds.private_key,
            relation: link,
        };
        self.post(ARTIFACT_PART, &body)?.ack()
    }

    fn fetch_part(&self, uuid: &str) -> ApiResult<PartRecord> {
        self.get(&format!("{PARTS}/{uuid}"))?.decode()
    }
}

/// Addresses in config files are commonly bare `host:port` strings.
pub fn normalize_base(address: &str) -> String {
    let with_scheme = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use bale_types::Checksum;

    #[test]
    fn bare_addresses_get_a_scheme() {
        assert_eq!(normalize_base("147.11.176.111:818"), "http://147.11.176.111:818");
        assert_eq!(normalize_base("localhost:3075/"), "http://localhost:3075");
    }

    #[test]
    fn explicit_schemes_are_preserved() {
        assert_eq!(normalize_base("https://ledger.example.org"), "https://ledger.example.org");
        assert_eq!(normalize_base("http://ledger.example.org/"), "http://ledger.example.org");
    }

    #[test]
    fn artifact_body_wire_shape() {
        let record = ArtifactRecord {
            uuid: ArtifactId::parse("9d274b22-d11c-4ed1-9ddc-6f1bf059a810").unwrap(),
            name: "zlib-1.3.tar.gz".to_string(),
            alias: "zlib".to_string(),
            label: "zlib-1.3.tar.gz".to_string(),
            checksum: Checksum::of_str("zlib"),
            content_type: bale_types::ContentType::BinaryImage,
            openchain: true,
            timestamp: None,
            artifact_list: Vec::new(),
            uri_list: Vec::new(),
        };
        let creds = Credentials::new("pub", "priv");
        let body = ArtifactBody {
            public_key: &creds.public_key,
            private_key: &creds.private_key,
            artifact: &record,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["public_key"], "pub");
        assert_eq!(value["private_key"], "priv");
        assert_eq!(value["artifact"]["alias"], "zlib");
        assert_eq!(value["artifact"]["openchain"], "true");
        assert_eq!(value["artifact"]["content_type"], "binary/image");
        assert!(value["artifact"].get("artifact_list").is_none());
    }

    #[test]
    fn uri_body_keeps_the_uuid_at_top_level() {
        let uri = UriRecord {
            version: "1.0".to_string(),
            checksum: "abc".to_string(),
            content_type: "http".to_string(),
            size: "1024".to_string(),
            uri_type: "http".to_string(),
            location: "http://mirror/z.tar.gz".to_string(),
        };
        let body = UriBody {
            public_key: "pub",
            private_key: "priv",
            uuid: ArtifactId::parse("9d274b22-d11c-4ed1-9ddc-6f1bf059a810").unwrap(),
            uri: &uri,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["uuid"], "9d274b22-d11c-4ed1-9ddc-6f1bf059a810");
        assert_eq!(value["uri"]["location"], "http://mirror/z.tar.gz");
        assert_eq!(value["uri"]["uri_type"], "http");
    }

    #[test]
    fn relation_body_wire_shape() {
        let link = EnvelopeLink {
            artifact_uuid: ArtifactId::parse("9d274b22-d11c-4ed1-9ddc-6f1bf059a810").unwrap(),
            envelope_uuid: ArtifactId::parse("2b2b2b2b-0000-4000-8000-000000000000").unwrap(),
            path: "/a.c".to_string(),
        };
        let body = RelationBody {
            public_key: "pub",
            private_key: "priv",
            relation: &link,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "public_key": "pub",
                "private_key": "priv",
                "relation": {
                    "artifact_uuid": "9d274b22-d11c-4ed1-9ddc-6f1bf059a810",
                    "envelope_uuid": "2b2b2b2b-0000-4000-8000-000000000000",
                    "path": "/a.c",
                },
            })
        );
    }
}
