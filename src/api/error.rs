// API error module
// Maps request failures to HTTP status codes and JSON error bodies

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use thiserror::Error;

use super::response::{error_response, method_not_allowed};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed JSON or missing required fields
    #[error("{0}")]
    BadRequest(String),
    /// The addressed employee does not exist
    #[error("{0}")]
    NotFound(String),
    /// An employee with the same id already exists
    #[error("{0}")]
    Conflict(String),
    #[error("method not allowed")]
    MethodNotAllowed(Vec<Method>),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("route not found")]
    RouteNotFound,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        match &self {
            Self::MethodNotAllowed(allowed) => method_not_allowed(allowed, &self.to_string()),
            _ => error_response(self.status(), &self.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::AlreadyExists(_) => Self::Conflict(err.to_string()),
        }
    }
}
