use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging;

/// HTTP 層的錯誤，單一 request 的失敗只會回應錯誤，不會中止服務。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 無法解析的 request body
    #[error("Unable to decode the request body. {0}")]
    InvalidBody(String),

    /// 路徑上的 id 不是整數
    #[error("Unable to convert the id into int. {0}")]
    InvalidId(String),

    /// 處理時間超過 `system.request_timeout_secs`
    #[error("Request timed out")]
    Timeout,

    /// 非預期的 middleware 錯誤
    #[error("Internal error: {0}")]
    Internal(String),

    /// 資料庫連線或執行失敗
    #[error("Unable to access the stock storage")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidId(rejection.body_text())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::Storage(why) = &self {
            logging::error_file_async(format!("{:?}", why));
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
