use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server replied with an error: {0}")]
    Remote(String),

    #[error("server reply carried no result")]
    EmptyResult,
}

pub type ApiResult<T> = Result<T, ApiError>;
