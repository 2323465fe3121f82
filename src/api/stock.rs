use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{error::ApiError, AppState},
    database::table::stock::{Stock, StockInput},
};

/// 新增、更新、刪除的回應內容
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub id: i64,
    pub message: String,
}

impl MessageResponse {
    pub fn new(id: i64, message: impl Into<String>) -> Self {
        MessageResponse {
            id,
            message: message.into(),
        }
    }
}

/// 不檢查 `Content-Type`，body 只要是合法的 JSON 就接受
fn decode_input(body: &[u8]) -> Result<StockInput, ApiError> {
    serde_json::from_slice::<StockInput>(body).map_err(|why| ApiError::InvalidBody(why.to_string()))
}

/// POST /api/stock
pub async fn create_stock(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = decode_input(&body)?;
    let id = state.store.create(&input).await?;

    Ok(Json(MessageResponse::new(id, "Stock created successfully")))
}

/// GET /api/stock/{id}
///
/// 查無資料時回應空物件 `{}`。
pub async fn get_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;

    Ok(match state.store.get(id).await? {
        Some(stock) => Json(stock).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    })
}

/// GET /api/stock
pub async fn get_all_stocks(State(state): State<AppState>) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// PUT /api/stock/{id}
pub async fn update_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let input = decode_input(&body)?;
    let updated_rows = state.store.update(id, &input).await?;

    Ok(Json(MessageResponse::new(
        id,
        format!(
            "Stock updated successfully. Total rows/record affected {}",
            updated_rows
        ),
    )))
}

/// DELETE /api/stock/{id}
pub async fn delete_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let deleted_rows = state.store.delete(id).await?;

    Ok(Json(MessageResponse::new(
        id,
        format!(
            "Stock deleted successfully. Total rows/record affected {}",
            deleted_rows
        ),
    )))
}

/// OPTIONS，不執行任何商業邏輯
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
