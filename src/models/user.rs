use std::collections::HashMap;

use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// App profile (`usuarios`). Only the push-token field matters here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fcmTokens", default, skip_serializing_if = "Option::is_none")]
    pub fcm_tokens: Option<FcmTokens>,
}

/// Tokens are stored either as a list or as a `{token: true}` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FcmTokens {
    List(Vec<Option<String>>),
    Map(HashMap<String, serde_json::Value>),
}

impl FcmTokens {
    pub fn tokens(&self) -> Vec<String> {
        match self {
            FcmTokens::List(list) => list
                .iter()
                .flatten()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect(),
            FcmTokens::Map(map) => map.keys().filter(|t| !t.is_empty()).cloned().collect(),
        }
    }
}

impl UserProfile {
    pub fn tokens(&self) -> Vec<String> {
        self.fcm_tokens.as_ref().map(FcmTokens::tokens).unwrap_or_default()
    }
}

/// Login credential (`users`), looked up by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}
