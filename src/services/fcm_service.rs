// src/services/fcm_service.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::Mutex;
use yup_oauth2::authenticator::Authenticator;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

use crate::config::FcmConfig;
use crate::errors::{AppError, Result};
use crate::models::notification::{BatchResponse, MulticastMessage};

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

type HyperConnector = yup_oauth2::hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;
type AuthType = Authenticator<HyperConnector>;

/// Anything that can deliver a multicast push.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse>;
}

pub struct FCMService {
    authenticator: Arc<Mutex<AuthType>>,
    client: Client,
    project_id: String,
}

impl FCMService {
    pub async fn new(config: &FcmConfig) -> anyhow::Result<Self> {
        let service_account_key = read_service_account_key(Path::new(&config.service_account_path))
            .await
            .map_err(|e| anyhow!("Failed to read service account key: {}", e))?;

        // The key file names its project; the env var only overrides it.
        let project_id = if !config.project_id.is_empty() {
            config.project_id.clone()
        } else {
            service_account_key
                .project_id
                .clone()
                .ok_or_else(|| anyhow!("FIREBASE_PROJECT_ID is not set and the key has no project_id"))?
        };

        let authenticator = ServiceAccountAuthenticator::builder(service_account_key)
            .build()
            .await
            .map_err(|e| anyhow!("Failed to build authenticator: {}", e))?;

        Ok(Self {
            authenticator: Arc::new(Mutex::new(authenticator)),
            client: Client::new(),
            project_id,
        })
    }

    pub async fn get_access_token(&self) -> anyhow::Result<String> {
        let auth = self.authenticator.lock().await;

        let token = auth
            .token(&[FCM_SCOPE])
            .await
            .map_err(|e| anyhow!("Failed to get token: {}", e))?;

        token
            .token()
            .map(|t| t.to_string())
            .ok_or_else(|| anyhow!("Access token was empty"))
    }

    fn send_url(&self) -> String {
        format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        )
    }

    async fn send_to_device(
        &self,
        access_token: &str,
        token: &str,
        message: &MulticastMessage,
    ) -> bool {
        let body = device_payload(token, message);

        match self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let details = response.text().await.unwrap_or_default();
                tracing::warn!("❌ FCM v1 error {}: {}", status, details);
                false
            }
            Err(e) => {
                tracing::warn!("❌ FCM v1 request failed: {}", e);
                false
            }
        }
    }
}

/// FCM v1 body for one device.
fn device_payload(token: &str, message: &MulticastMessage) -> serde_json::Value {
    json!({
        "message": {
            "token": token,
            "notification": {
                "title": message.notification.title,
                "body": message.notification.body,
            },
            "data": message.data,
            "android": {
                "priority": "high",
                "notification": { "sound": "default" }
            },
            "apns": {
                "payload": { "aps": { "sound": "default" } }
            }
        }
    })
}

#[async_trait]
impl PushSender for FCMService {
    /// Sends each token on its own request; one bad token does not stop the rest.
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        let mut response = BatchResponse::default();
        if message.tokens.is_empty() {
            return Ok(response);
        }

        let access_token = self
            .get_access_token()
            .await
            .map_err(|e| AppError::push(format!("Failed to get FCM access token: {}", e)))?;

        for token in &message.tokens {
            if self.send_to_device(&access_token, token, message).await {
                response.success_count += 1;
            } else {
                response.failure_count += 1;
            }
        }

        tracing::info!(
            "📤 FCM multicast: {} sent, {} failed",
            response.success_count,
            response.failure_count
        );
        Ok(response)
    }
}

// Initialize once at app startup
pub async fn init_fcm_service(config: &FcmConfig) -> anyhow::Result<Arc<FCMService>> {
    let service = FCMService::new(config).await?;
    Ok(Arc::new(service))
}
