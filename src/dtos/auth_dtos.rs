use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct SendResetCodeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct VerifyResetCodeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub session_token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Body returned by every callable endpoint on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl CallableResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            session_token: None,
        }
    }

    pub fn with_session(message: impl Into<String>, token: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            session_token: Some(token),
        }
    }
}
