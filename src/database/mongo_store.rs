use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document},
    Collection, Database,
};

use super::repositories::{
    ChatRepository, CredentialRepository, PasswordResetRepository, ProfileRepository,
};
use crate::errors::{AppError, Result};
use crate::models::chat::Chat;
use crate::models::password_reset::{
    NewResetCode, PasswordResetCode, PasswordResetSession, ResetCodeDocument,
    ResetSessionDocument,
};
use crate::models::user::{Credential, FcmTokens, UserProfile};

const RESET_CODES: &str = "passwordResetCodes";
const RESET_SESSIONS: &str = "passwordResetSessions";
const CREDENTIALS: &str = "users";
const CHATS: &str = "chats";
const PROFILES: &str = "usuarios";

/// MongoDB-backed implementation of every repository.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn codes(&self) -> Collection<ResetCodeDocument> {
        self.db.collection(RESET_CODES)
    }

    fn sessions(&self) -> Collection<ResetSessionDocument> {
        self.db.collection(RESET_SESSIONS)
    }

    fn credentials(&self) -> Collection<Credential> {
        self.db.collection(CREDENTIALS)
    }

    fn chats(&self) -> Collection<Chat> {
        self.db.collection(CHATS)
    }

    fn profiles(&self) -> Collection<UserProfile> {
        self.db.collection(PROFILES)
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| AppError::invalid_data(format!("Invalid id '{}': {}", id, e)))
}

#[async_trait]
impl PasswordResetRepository for MongoStore {
    async fn invalidate_unused_codes(&self, email: &str) -> Result<u64> {
        let result = self
            .codes()
            .update_many(
                doc! { "email": email, "used": false },
                doc! { "$set": { "used": true } },
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn insert_code(&self, code: &NewResetCode) -> Result<String> {
        let result = self.codes().insert_one(ResetCodeDocument::from(code)).await?;
        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id.to_hex()),
            other => Ok(other.to_string()),
        }
    }

    async fn find_unused_codes(&self, email: &str, code: &str) -> Result<Vec<PasswordResetCode>> {
        let cursor = self
            .codes()
            .find(doc! { "email": email, "code": code, "used": false })
            .await?;
        let docs: Vec<ResetCodeDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(PasswordResetCode::from).collect())
    }

    async fn claim_code(&self, code_id: &str) -> Result<bool> {
        let id = parse_object_id(code_id)?;
        let result = self
            .codes()
            .update_one(
                doc! { "_id": id, "used": false },
                doc! { "$set": { "used": true } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn insert_session(&self, session: &PasswordResetSession) -> Result<()> {
        self.sessions()
            .insert_one(ResetSessionDocument::from(session))
            .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<PasswordResetSession>> {
        let found = self.sessions().find_one(doc! { "_id": token }).await?;
        Ok(found.map(PasswordResetSession::from))
    }

    async fn claim_session(&self, token: &str) -> Result<bool> {
        let result = self
            .sessions()
            .update_one(
                doc! { "_id": token, "used": false },
                doc! { "$set": { "used": true } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }
}

#[async_trait]
impl CredentialRepository for MongoStore {
    async fn account_exists(&self, email: &str) -> Result<bool> {
        let count = self
            .credentials()
            .count_documents(doc! { "email": email })
            .await?;
        Ok(count > 0)
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = self
            .credentials()
            .update_one(
                doc! { "email": email },
                doc! {
                    "$set": {
                        "password_hash": password_hash,
                        "updated_at": BsonDateTime::now(),
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl ChatRepository for MongoStore {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>> {
        Ok(self.chats().find_one(doc! { "_id": chat_id }).await?)
    }
}

#[async_trait]
impl ProfileRepository for MongoStore {
    async fn tokens_for_users(&self, user_ids: &[String]) -> Result<Vec<String>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .profiles()
            .find(doc! { "_id": { "$in": user_ids.to_vec() } })
            .await?;
        let profiles: Vec<UserProfile> = cursor.try_collect().await?;
        Ok(profiles.iter().flat_map(UserProfile::tokens).collect())
    }

    async fn add_token(&self, user_id: &str, token: &str) -> Result<()> {
        let existing = self.profiles().find_one(doc! { "_id": user_id }).await?;
        let update = token_update(existing.and_then(|p| p.fcm_tokens).as_ref(), token);
        self.profiles()
            .update_one(doc! { "_id": user_id }, update)
            .upsert(true)
            .await?;
        Ok(())
    }
}

/// `$addToSet` only works on arrays; map-shaped profiles get a `{token: true}` entry.
fn token_update(existing: Option<&FcmTokens>, token: &str) -> Document {
    match existing {
        Some(FcmTokens::Map(_)) => {
            let mut entry = Document::new();
            entry.insert(format!("fcmTokens.{}", token), true);
            doc! { "$set": entry }
        }
        _ => doc! { "$addToSet": { "fcmTokens": token } },
    }
}
