use std::collections::BTreeMap;
use std::sync::Arc;

use crate::database::{ChatRepository, ProfileRepository};
use crate::errors::{AppError, Result};
use crate::models::chat::{Chat, ChatMessage};
use crate::models::notification::{
    DeliveryOutcome, MulticastMessage, PushNotification, SkipReason,
};
use crate::models::order::OrderDocument;
use crate::services::fcm_service::PushSender;

/// Statuses the buyer hears about.
pub const NOTIFIABLE_STATUSES: [&str; 4] = ["preparando", "enviado", "recibido", "devolucion"];

pub const ORDER_UPDATE_TITLE: &str = "Actualización de pedido";

/// Buyer-facing text for an order status.
pub fn status_message(status: &str) -> String {
    let status = status.trim().to_lowercase();
    match status.as_str() {
        "preparando" => "Tu pedido está siendo preparado.".to_string(),
        "enviado" => "Tu pedido fue enviado.".to_string(),
        "recibido" => "Confirmamos que recibiste tu pedido.".to_string(),
        "devolucion" => "Tu pedido está en proceso de devolución.".to_string(),
        other => format!("Estado actualizado a {}", other.to_uppercase()),
    }
}

/// Title, body and data for a new chat message.
pub fn chat_notification(
    chat_id: &str,
    chat: &Chat,
    message: &ChatMessage,
) -> (PushNotification, BTreeMap<String, String>) {
    let title = chat
        .display_name(&message.sender_id)
        .unwrap_or("Nuevo mensaje")
        .to_string();

    let body = if message.is_image() {
        "📷 Imagen".to_string()
    } else {
        message
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Tienes un nuevo mensaje")
            .to_string()
    };

    let mut data = BTreeMap::new();
    data.insert("type".to_string(), "chat".to_string());
    data.insert("chatId".to_string(), chat_id.to_string());
    data.insert("orderId".to_string(), chat.order_id().to_string());
    data.insert("senderId".to_string(), message.sender_id.clone());

    (PushNotification { title, body }, data)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub buyer_id: String,
    pub status: String,
}

/// A transition worth notifying: known buyer, new non-empty status that
/// differs from the previous one and is in [`NOTIFIABLE_STATUSES`].
pub fn detect_status_change(before: &OrderDocument, after: &OrderDocument) -> Option<StatusChange> {
    let previous = before.normalized_status();
    let current = after.normalized_status();
    let buyer_id = after.buyer_id()?;

    if current.is_empty() || current == previous || !NOTIFIABLE_STATUSES.contains(&current.as_str()) {
        return None;
    }

    Some(StatusChange {
        buyer_id: buyer_id.to_string(),
        status: current,
    })
}

pub struct NotificationService {
    chats: Arc<dyn ChatRepository>,
    profiles: Arc<dyn ProfileRepository>,
    push: Option<Arc<dyn PushSender>>,
}

impl NotificationService {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        profiles: Arc<dyn ProfileRepository>,
        push: Option<Arc<dyn PushSender>>,
    ) -> Self {
        Self {
            chats,
            profiles,
            push,
        }
    }

    pub fn push_enabled(&self) -> bool {
        self.push.is_some()
    }

    pub async fn notify_new_message(
        &self,
        chat_id: &str,
        message: &ChatMessage,
    ) -> Result<DeliveryOutcome> {
        let chat = match self.chats.find_chat(chat_id).await? {
            Some(chat) => chat,
            None => return Ok(DeliveryOutcome::skipped(SkipReason::ChatNotFound)),
        };

        let targets = chat.recipients_excluding(&message.sender_id);
        if targets.is_empty() {
            return Ok(DeliveryOutcome::skipped(SkipReason::NoRecipients));
        }

        let tokens = self.profiles.tokens_for_users(&targets).await?;
        let (notification, data) = chat_notification(chat_id, &chat, message);

        self.deliver(MulticastMessage {
            tokens,
            notification,
            data,
        })
        .await
    }

    pub async fn notify_order_status_change(
        &self,
        order_id: &str,
        before: &OrderDocument,
        after: &OrderDocument,
    ) -> Result<DeliveryOutcome> {
        let change = match detect_status_change(before, after) {
            Some(change) => change,
            None => return Ok(DeliveryOutcome::skipped(SkipReason::NoStatusChange)),
        };

        let tokens = self
            .profiles
            .tokens_for_users(std::slice::from_ref(&change.buyer_id))
            .await?;

        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "order_status".to_string());
        data.insert("orderId".to_string(), order_id.to_string());
        data.insert("newStatus".to_string(), change.status.clone());

        self.deliver(MulticastMessage {
            tokens,
            notification: PushNotification {
                title: ORDER_UPDATE_TITLE.to_string(),
                body: status_message(&change.status),
            },
            data,
        })
        .await
    }

    pub async fn register_token(&self, user_id: &str, token: &str) -> Result<()> {
        if user_id.trim().is_empty() || token.trim().is_empty() {
            return Err(AppError::invalid_data("userId and token are required"));
        }
        self.profiles.add_token(user_id, token).await?;
        tracing::info!("✅ FCM token registered for user: {}", user_id);
        Ok(())
    }

    async fn deliver(&self, message: MulticastMessage) -> Result<DeliveryOutcome> {
        if message.tokens.is_empty() {
            return Ok(DeliveryOutcome::skipped(SkipReason::NoTokens));
        }

        let push = match &self.push {
            Some(push) => push,
            None => {
                tracing::warn!("⚠️ FCM disabled; dropping notification '{}'", message.notification.title);
                return Ok(DeliveryOutcome::skipped(SkipReason::PushDisabled));
            }
        };

        let response = push.send_multicast(&message).await?;
        Ok(DeliveryOutcome::Delivered(response))
    }
}
