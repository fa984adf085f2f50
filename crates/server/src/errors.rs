use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// API 层错误：域错误统一映射为非 200 状态码加 JSON 负载
/// （404 未找到 / 409 冲突 / 422 校验失败）
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Item not found")]
    ItemNotFound,
    #[error("Item already exists")]
    ItemExists,
    #[error("No items in the database")]
    EmptyCatalog,
    #[error("{0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::Validation(msg),
            ServiceError::Conflict(_) => ApiError::ItemExists,
            ServiceError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::ItemNotFound => {
                (StatusCode::NOT_FOUND, serde_json::json!({"error": "Item not found"}))
            }
            ApiError::ItemExists => {
                (StatusCode::CONFLICT, serde_json::json!({"error": "Item already exists"}))
            }
            ApiError::EmptyCatalog => {
                (StatusCode::NOT_FOUND, serde_json::json!({"detail": "No items in the database"}))
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, serde_json::json!({"error": msg}))
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({"error": "internal error"}))
            }
        };
        (status, Json(body)).into_response()
    }
}
