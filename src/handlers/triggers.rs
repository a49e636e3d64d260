// Document-write events. A failed delivery is reported in the body but never
// fails the event itself.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::chat::ChatMessage;
use crate::models::notification::DeliveryOutcome;
use crate::models::order::OrderUpdateEvent;
use crate::state::AppState;

fn event_response(event: &str, result: Result<DeliveryOutcome>) -> Json<Value> {
    match result {
        Ok(outcome) => {
            tracing::info!("🔔 {}: {:?}", event, outcome);
            Json(json!({ "success": true, "result": outcome }))
        }
        Err(e) => {
            tracing::error!("❌ {} failed: {}", event, e);
            Json(json!({ "success": false, "message": e.public_message() }))
        }
    }
}

// POST /api/triggers/chats/:chat_id/messages/:message_id
pub async fn on_message_created(
    State(state): State<AppState>,
    Path((chat_id, message_id)): Path<(String, String)>,
    payload: std::result::Result<Json<ChatMessage>, JsonRejection>,
) -> Json<Value> {
    let Json(message) = match payload {
        Ok(message) => message,
        Err(rejection) => return event_response("notifyNewMessage", Err(rejection.into())),
    };
    tracing::debug!("📥 New message {} in chat {}", message_id, chat_id);
    let result = state
        .notification_service
        .notify_new_message(&chat_id, &message)
        .await;
    event_response("notifyNewMessage", result)
}

// POST /api/triggers/orders/:order_id
pub async fn on_order_updated(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    payload: std::result::Result<Json<OrderUpdateEvent>, JsonRejection>,
) -> Json<Value> {
    let Json(event) = match payload {
        Ok(event) => event,
        Err(rejection) => return event_response("notifyOrderStatusChange", Err(rejection.into())),
    };
    let before = event.before.unwrap_or_default();
    let after = event.after.unwrap_or_default();
    let result = state
        .notification_service
        .notify_order_status_change(&order_id, &before, &after)
        .await;
    event_response("notifyOrderStatusChange", result)
}
