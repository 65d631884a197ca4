//! The reply envelope every gateway endpoint wraps its payload in.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// `{status, message, result_type, result}` as returned by both the
/// ledger gateway and the atlas directory. Some gateway builds encode
/// an empty `result` as the literal string `"{}"` rather than an
/// object; decoding accounts for that.
#[derive(Clone, Debug, Deserialize)]
pub struct Reply {
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Value,
}

impl Reply {
    /// Accept a bare acknowledgement, surfacing the remote message on
    /// failure.
    pub fn ack(self) -> ApiResult<()> {
        match self.status {
            Status::Success => Ok(()),
            Status::Failed => Err(ApiError::Remote(self.message)),
        }
    }

    /// Decode the result into the type the endpoint is documented to
    /// return.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResult<T> {
        match self.status {
            Status::Success => match self.result {
                Value::Null => Err(ApiError::EmptyResult),
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() || trimmed == "{}" {
                        Err(ApiError::EmptyResult)
                    } else {
                        Ok(serde_json::from_str(trimmed)?)
                    }
                }
                value => Ok(serde_json::from_value(value)?),
            },
            Status::Failed => Err(ApiError::Remote(self.message)),
        }
    }
}
