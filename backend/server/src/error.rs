use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registry::WindowError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("productName은 2글자 이상이어야 합니다.")]
    ProductNameTooShort,

    #[error("{0}")]
    InvalidWindow(#[from] WindowError),

    #[error("서버 설정 오류")]
    MissingCredential { name: String },

    #[error("서버 설정 오류")]
    MisconfiguredUpstream,

    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        detail: String,
    },

    #[error("외부 API가 JSON이 아닌 응답을 반환했습니다.")]
    UpstreamFormat { detail: String },

    #[error("서버 내부 오류")]
    InternalError(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ProductNameTooShort | AppError::InvalidWindow(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredential { name } => {
                error!("Upstream credential {name} is not configured");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::MisconfiguredUpstream => {
                error!("Upstream url cannot carry path segments");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream { status, .. } => *status,
            AppError::UpstreamFormat { .. } => StatusCode::BAD_GATEWAY,
            AppError::InternalError(e) => {
                error!("Upstream request failed: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            AppError::Upstream { detail, .. } | AppError::UpstreamFormat { detail } => {
                json!({ "error": self.to_string(), "detail": detail })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
