use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// One notification fanned out to many device tokens. FCM requires string
/// values in the data payload.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: PushNotification,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ChatNotFound,
    NoRecipients,
    NoTokens,
    NoStatusChange,
    PushDisabled,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Skipped { reason: SkipReason },
    Delivered(BatchResponse),
}

impl DeliveryOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        DeliveryOutcome::Skipped { reason }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

impl RegisterTokenRequest {
    /// Surrounding whitespace is not part of an id or a token.
    pub fn trimmed(self) -> Self {
        Self {
            user_id: self.user_id.trim().to_string(),
            token: self.token.trim().to_string(),
        }
    }
}
