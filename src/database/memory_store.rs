use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::repositories::{
    ChatRepository, CredentialRepository, PasswordResetRepository, ProfileRepository,
};
use crate::errors::Result;
use crate::models::chat::Chat;
use crate::models::password_reset::{NewResetCode, PasswordResetCode, PasswordResetSession};

#[derive(Default)]
struct Tables {
    codes: Vec<PasswordResetCode>,
    sessions: HashMap<String, PasswordResetSession>,
    credentials: HashMap<String, String>,
    chats: HashMap<String, Chat>,
    tokens: HashMap<String, Vec<String>>,
    next_code_id: u64,
}

/// Process-local store backing the service and router tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_account(&self, email: &str, password_hash: &str) {
        let mut tables = self.tables.lock().await;
        tables
            .credentials
            .insert(email.to_string(), password_hash.to_string());
    }

    pub async fn password_hash(&self, email: &str) -> Option<String> {
        self.tables.lock().await.credentials.get(email).cloned()
    }

    pub async fn put_chat(&self, chat_id: &str, chat: Chat) {
        self.tables
            .lock()
            .await
            .chats
            .insert(chat_id.to_string(), chat);
    }

    /// Inserts a code as-is, including stale or already-used ones.
    pub async fn put_code(&self, code: PasswordResetCode) {
        self.tables.lock().await.codes.push(code);
    }

    pub async fn codes_for(&self, email: &str) -> Vec<PasswordResetCode> {
        self.tables
            .lock()
            .await
            .codes
            .iter()
            .filter(|c| c.email == email)
            .cloned()
            .collect()
    }

    pub async fn put_session(&self, session: PasswordResetSession) {
        self.tables
            .lock()
            .await
            .sessions
            .insert(session.token.clone(), session);
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn invalidate_unused_codes(&self, email: &str) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut changed = 0;
        for code in tables.codes.iter_mut().filter(|c| c.email == email && !c.used) {
            code.used = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert_code(&self, code: &NewResetCode) -> Result<String> {
        let mut tables = self.tables.lock().await;
        tables.next_code_id += 1;
        let id = format!("code-{}", tables.next_code_id);
        tables.codes.push(PasswordResetCode {
            id: id.clone(),
            email: code.email.clone(),
            code: code.code.clone(),
            created_at: Some(code.created_at),
            expires_at: Some(code.expires_at),
            used: false,
        });
        Ok(id)
    }

    async fn find_unused_codes(&self, email: &str, code: &str) -> Result<Vec<PasswordResetCode>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .codes
            .iter()
            .filter(|c| c.email == email && c.code == code && !c.used)
            .cloned()
            .collect())
    }

    async fn claim_code(&self, code_id: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.codes.iter_mut().find(|c| c.id == code_id && !c.used) {
            Some(code) => {
                code.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_session(&self, session: &PasswordResetSession) -> Result<()> {
        self.tables
            .lock()
            .await
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<PasswordResetSession>> {
        Ok(self.tables.lock().await.sessions.get(token).cloned())
    }

    async fn claim_session(&self, token: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.sessions.get_mut(token) {
            Some(session) if !session.used => {
                session.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CredentialRepository for MemoryStore {
    async fn account_exists(&self, email: &str) -> Result<bool> {
        Ok(self.tables.lock().await.credentials.contains_key(email))
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.credentials.get_mut(email) {
            Some(hash) => {
                *hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        Ok(self.tables.lock().await.chats.get(chat_id).cloned())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn tokens_for_users(&self, user_ids: &[String]) -> Result<Vec<String>> {
        let tables = self.tables.lock().await;
        Ok(user_ids
            .iter()
            .filter_map(|uid| tables.tokens.get(uid))
            .flatten()
            .filter(|token| !token.is_empty())
            .cloned()
            .collect())
    }

    async fn add_token(&self, user_id: &str, token: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let tokens = tables.tokens.entry(user_id.to_string()).or_default();
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn new_code(email: &str, code: &str) -> NewResetCode {
        let now = Utc::now();
        NewResetCode {
            email: email.to_string(),
            code: code.to_string(),
            created_at: now,
            expires_at: now + Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn invalidation_only_touches_the_given_email() {
        let store = MemoryStore::new();
        store.insert_code(&new_code("a@x.com", "111111")).await.unwrap();
        store.insert_code(&new_code("a@x.com", "222222")).await.unwrap();
        store.insert_code(&new_code("b@x.com", "333333")).await.unwrap();

        assert_eq!(store.invalidate_unused_codes("a@x.com").await.unwrap(), 2);
        assert!(store.find_unused_codes("a@x.com", "111111").await.unwrap().is_empty());
        assert_eq!(store.find_unused_codes("b@x.com", "333333").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn claims_succeed_once() {
        let store = MemoryStore::new();
        let id = store.insert_code(&new_code("a@x.com", "111111")).await.unwrap();
        assert!(store.claim_code(&id).await.unwrap());
        assert!(!store.claim_code(&id).await.unwrap());
        assert!(!store.claim_session("missing").await.unwrap());
    }

    #[tokio::test]
    async fn tokens_are_deduplicated_per_user() {
        let store = MemoryStore::new();
        store.add_token("u1", "tok").await.unwrap();
        store.add_token("u1", "tok").await.unwrap();
        store.add_token("u2", "other").await.unwrap();

        let tokens = store
            .tokens_for_users(&["u1".to_string(), "u3".to_string()])
            .await
            .unwrap();
        assert_eq!(tokens, vec!["tok".to_string()]);
    }

    #[tokio::test]
    async fn empty_tokens_are_not_returned() {
        let store = MemoryStore::new();
        store.add_token("u1", "").await.unwrap();
        store.add_token("u1", "tok").await.unwrap();

        let tokens = store.tokens_for_users(&["u1".to_string()]).await.unwrap();
        assert_eq!(tokens, vec!["tok".to_string()]);
    }
}
