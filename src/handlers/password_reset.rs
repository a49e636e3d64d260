use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::dtos::auth_dtos::{
    CallableResponse, ConfirmResetRequest, SendResetCodeRequest, VerifyResetCodeRequest,
};
use crate::errors::Result;
use crate::state::AppState;

// POST /api/auth/password-reset/code
pub async fn send_reset_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendResetCodeRequest>, JsonRejection>,
) -> Result<Json<CallableResponse>> {
    let Json(req) = payload?;
    state.reset_service.issue_code(req.email.trim()).await?;
    Ok(Json(CallableResponse::ok("Reset code sent successfully")))
}

// POST /api/auth/password-reset/verify
pub async fn verify_reset_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerifyResetCodeRequest>, JsonRejection>,
) -> Result<Json<CallableResponse>> {
    let Json(req) = payload?;
    let token = state
        .reset_service
        .verify_code(req.email.trim(), req.code.trim())
        .await?;
    Ok(Json(CallableResponse::with_session(
        "Code verified successfully",
        token,
    )))
}

// POST /api/auth/password-reset/confirm
pub async fn confirm_reset(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConfirmResetRequest>, JsonRejection>,
) -> Result<Json<CallableResponse>> {
    let Json(req) = payload?;
    state
        .reset_service
        .reset_password(req.email.trim(), req.session_token.trim(), &req.new_password)
        .await?;
    Ok(Json(CallableResponse::ok("Password changed successfully")))
}
