//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::PlacementError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable input: {0}")]
    Unprocessable(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    pub fn public_message(&self) -> String {
        match self {
            ServerError::BadRequest(msg)
            | ServerError::NotFound(msg)
            | ServerError::Unprocessable(msg) => msg.clone(),
            ServerError::ModelUnavailable(_) => "The prediction model is not available".to_string(),
            ServerError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<PlacementError> for ServerError {
    fn from(err: PlacementError) -> Self {
        if err.is_input_error() {
            return ServerError::Unprocessable(err.to_string());
        }
        match err {
            PlacementError::IoError(_) | PlacementError::CorruptArtifact(_) => {
                ServerError::ModelUnavailable(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::ModelUnavailable(detail) => {
                tracing::error!(detail = %detail, "Model unavailable");
            }
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
            }
            _ => {}
        }

        let body = Json(json!({
            "error": true,
            "message": self.public_message(),
        }));

        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
