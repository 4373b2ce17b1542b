use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal outcomes of a relay request. The display strings are the exact
/// messages returned to the caller; causes stay in the server log.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("No image uploaded.")]
    NoImage,

    #[error("Error connecting to AI model.")]
    Upstream(#[source] UpstreamError),

    #[error("Server error while processing image.")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("predictor unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("predictor answered {0}")]
    Status(reqwest::StatusCode),
}

impl RelayError {
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RelayError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoImage => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
