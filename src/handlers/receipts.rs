use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dtos::auth_dtos::CallableResponse;
use crate::errors::Result;
use crate::models::receipt::ReceiptRequest;
use crate::state::AppState;

// POST /api/receipts/email
pub async fn send_receipt_email(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReceiptRequest>, JsonRejection>,
) -> Result<Json<CallableResponse>> {
    let Json(req) = payload?;
    state.receipt_service.send_receipt(req).await?;
    Ok(Json(CallableResponse::ok("Receipt sent successfully")))
}
