use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vaultscope_apy::CalculatorError;

use crate::dto::ApiResponse;

#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl From<CalculatorError> for ApiError {
    fn from(err: CalculatorError) -> Self {
        match err {
            CalculatorError::InvalidVaultConfig(reason) => {
                tracing::debug!(reason = %reason, "Rejecting vault request");
                Self::NotFound("Vault not found or not valuable".to_string())
            }
            CalculatorError::InvalidHarvest(reason) => Self::BadRequest(reason),
            // NOTE: Storage errors are already logged by the pool layer.
            CalculatorError::Storage(_) => Self::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        let response: ApiResponse<()> = ApiResponse::error(msg);
        (status, Json(response)).into_response()
    }
}
