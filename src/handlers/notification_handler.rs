// src/handlers/notification_handler.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::Result;
use crate::models::notification::RegisterTokenRequest;
use crate::state::AppState;

// Register FCM token for a user
pub async fn register_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterTokenRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(payload) = payload?;
    let payload = payload.trimmed();
    payload.validate()?;

    state
        .notification_service
        .register_token(&payload.user_id, &payload.token)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Token registered successfully",
        "userId": payload.user_id,
    })))
}
