use async_trait::async_trait;

use crate::errors::Result;
use crate::models::chat::Chat;
use crate::models::password_reset::{NewResetCode, PasswordResetCode, PasswordResetSession};

/// Storage for reset codes and the sessions they mint.
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Marks every unused code for `email` as used. Returns how many changed.
    async fn invalidate_unused_codes(&self, email: &str) -> Result<u64>;

    /// Persists a fresh code and returns its id.
    async fn insert_code(&self, code: &NewResetCode) -> Result<String>;

    /// Unused codes matching `(email, code)`, in no particular order.
    async fn find_unused_codes(&self, email: &str, code: &str) -> Result<Vec<PasswordResetCode>>;

    /// Flips `used` from false to true. Returns false if it was already used.
    async fn claim_code(&self, code_id: &str) -> Result<bool>;

    async fn insert_session(&self, session: &PasswordResetSession) -> Result<()>;

    async fn find_session(&self, token: &str) -> Result<Option<PasswordResetSession>>;

    /// Flips `used` from false to true. Returns false if it was already used.
    async fn claim_session(&self, token: &str) -> Result<bool>;
}

/// Account credentials, keyed by email.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn account_exists(&self, email: &str) -> Result<bool>;

    /// Stores an already-hashed password. Returns false if no account matched.
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>>;
}

/// User profiles holding FCM device tokens.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// All tokens across the given users, flattened.
    async fn tokens_for_users(&self, user_ids: &[String]) -> Result<Vec<String>>;

    async fn add_token(&self, user_id: &str, token: &str) -> Result<()>;
}
