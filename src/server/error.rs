use crate::imaging::{ErrorKind, TransformError};
use crate::store::FetchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not modified")]
    NotModified,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::NotModified => StatusCode::NOT_MODIFIED,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for ServerError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotModified => ServerError::NotModified,
            FetchError::NotFound(key) | FetchError::InvalidKey(key) => ServerError::NotFound(key),
            FetchError::Backend(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<TransformError> for ServerError {
    fn from(err: TransformError) -> Self {
        match err.kind() {
            ErrorKind::Parameter | ErrorKind::Image => ServerError::BadRequest(err.to_string()),
            ErrorKind::Output => ServerError::Internal(err.to_string()),
        }
    }
}

/// Clients get the status code and an empty body; details go to the log.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!("{}", self);
        }
        status.into_response()
    }
}
