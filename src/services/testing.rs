//! Recording doubles for the outbound providers.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::Result;
use crate::models::notification::{BatchResponse, MulticastMessage};
use crate::services::email::{MailError, Mailer, OutgoingEmail};
use crate::services::fcm_service::PushSender;

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failure: Option<fn() -> MailError>,
}

impl RecordingMailer {
    pub fn failing(failure: fn() -> MailError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> std::result::Result<(), MailError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Accepts every token.
#[derive(Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<MulticastMessage>>,
}

impl RecordingPushSender {
    pub async fn sent(&self) -> Vec<MulticastMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        self.sent.lock().await.push(message.clone());
        Ok(BatchResponse {
            success_count: message.tokens.len(),
            failure_count: 0,
        })
    }
}
