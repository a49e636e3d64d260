// src/models/chat.rs
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A conversation between buyers and sellers, keyed by chat id.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub participants_data: HashMap<String, ParticipantData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChatMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ParticipantData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

impl Chat {
    /// Everyone in the chat except the sender.
    pub fn recipients_excluding(&self, sender_id: &str) -> Vec<String> {
        self.participants
            .iter()
            .filter(|uid| uid.as_str() != sender_id)
            .cloned()
            .collect()
    }

    pub fn display_name(&self, uid: &str) -> Option<&str> {
        self.participants_data
            .get(uid)
            .and_then(|p| p.nombre.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn order_id(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.order_id.as_deref())
            .unwrap_or("")
    }
}

impl ChatMessage {
    pub fn is_image(&self) -> bool {
        self.message_type.as_deref() == Some("image")
    }
}
