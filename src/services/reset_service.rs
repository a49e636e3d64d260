use std::sync::Arc;

use bcrypt::{hash, DEFAULT_COST};
use chrono::{Duration, Utc};
use rand::Rng;

use crate::config::ResetConfig;
use crate::database::{CredentialRepository, PasswordResetRepository};
use crate::errors::{AppError, Result};
use crate::models::password_reset::{NewResetCode, PasswordResetCode, PasswordResetSession};
use crate::services::email::{templates, Mailer};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password recovery: issue a code by email, trade it for a session, then
/// spend the session on a new password.
pub struct PasswordResetService {
    resets: Arc<dyn PasswordResetRepository>,
    credentials: Arc<dyn CredentialRepository>,
    mailer: Option<Arc<dyn Mailer>>,
    config: ResetConfig,
}

impl PasswordResetService {
    pub fn new(
        resets: Arc<dyn PasswordResetRepository>,
        credentials: Arc<dyn CredentialRepository>,
        mailer: Option<Arc<dyn Mailer>>,
        config: ResetConfig,
    ) -> Self {
        Self {
            resets,
            credentials,
            mailer,
            config,
        }
    }

    // Generate 6-digit code, never with a leading zero
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..1_000_000).to_string()
    }

    fn code_ttl(&self) -> Duration {
        Duration::minutes(self.config.code_ttl_minutes)
    }

    fn session_ttl(&self) -> Duration {
        Duration::minutes(self.config.session_ttl_minutes)
    }

    /// Replaces any outstanding code for `email` with a fresh one and mails it.
    pub async fn issue_code(&self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(AppError::invalid_data("Email is required"));
        }

        if !self.credentials.account_exists(email).await? {
            return Err(AppError::AccountNotFound);
        }

        let mailer = self.mailer.as_ref().ok_or_else(|| {
            tracing::error!("❌ SMTP not configured; cannot send reset code");
            AppError::MailNotConfigured
        })?;

        let now = Utc::now();
        let code = Self::generate_code();

        let invalidated = self.resets.invalidate_unused_codes(email).await?;
        if invalidated > 0 {
            tracing::info!("🔄 Invalidated {} previous reset code(s)", invalidated);
        }

        self.resets
            .insert_code(&NewResetCode {
                email: email.to_string(),
                code: code.clone(),
                created_at: now,
                expires_at: now + self.code_ttl(),
            })
            .await?;

        tracing::info!("📧 Sending password reset code to {}", email);
        mailer
            .send(templates::reset_code_email(
                email,
                &code,
                self.config.code_ttl_minutes,
            ))
            .await?;

        tracing::info!("✅ Password reset code sent to {}", email);
        Ok(())
    }

    /// Consumes a matching code and returns a session token.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<String> {
        if email.is_empty() || code.is_empty() {
            return Err(AppError::invalid_data("Email and code are required"));
        }

        let candidates = self.resets.find_unused_codes(email, code).await?;
        let latest = newest_code(candidates).ok_or(AppError::InvalidCode)?;

        let now = Utc::now();
        if latest.is_expired(now, self.code_ttl()) {
            self.resets.claim_code(&latest.id).await?;
            return Err(AppError::CodeExpired);
        }

        // A concurrent verification may have won the code.
        if !self.resets.claim_code(&latest.id).await? {
            return Err(AppError::InvalidCode);
        }

        let session = PasswordResetSession {
            token: uuid::Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            code_id: latest.id.clone(),
            created_at: now,
            expires_at: now + self.session_ttl(),
            used: false,
        };
        self.resets.insert_session(&session).await?;

        if let Some(expiry) = latest.effective_expiry(self.code_ttl()) {
            tracing::info!(
                "⏰ Reset code verified with {} minute(s) to spare",
                (expiry - now).num_minutes()
            );
        }
        Ok(session.token)
    }

    /// Spends a verified session on a new password.
    pub async fn reset_password(
        &self,
        email: &str,
        session_token: &str,
        new_password: &str,
    ) -> Result<()> {
        if email.is_empty() || session_token.is_empty() || new_password.is_empty() {
            return Err(AppError::invalid_data(
                "Email, session token and new password are required",
            ));
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_data(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let session = self
            .resets
            .find_session(session_token)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        if session.used {
            return Err(AppError::SessionUsed);
        }
        if session.email != email {
            return Err(AppError::SessionEmailMismatch);
        }
        if session.is_expired(Utc::now()) {
            return Err(AppError::SessionExpired);
        }

        if !self.resets.claim_session(session_token).await? {
            return Err(AppError::SessionUsed);
        }

        let new_password = new_password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash(new_password, DEFAULT_COST))
            .await
            .map_err(|e| AppError::internal_server_error(format!("Password hashing task failed: {}", e)))??;
        if !self
            .credentials
            .update_password_hash(email, &password_hash)
            .await?
        {
            return Err(AppError::AccountNotFound);
        }

        tracing::info!("✅ Password changed for {}", email);
        Ok(())
    }
}

/// Newest by expiry, falling back to creation time.
fn newest_code(codes: Vec<PasswordResetCode>) -> Option<PasswordResetCode> {
    codes.into_iter().max_by_key(PasswordResetCode::recency_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::testing::RecordingMailer;

    const EMAIL: &str = "ana@example.com";

    struct Fixture {
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        service: PasswordResetService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store.add_account(EMAIL, "old-hash").await;
        let mailer = Arc::new(RecordingMailer::default());
        let service = PasswordResetService::new(
            store.clone(),
            store.clone(),
            Some(mailer.clone() as Arc<dyn Mailer>),
            ResetConfig::default(),
        );
        Fixture {
            store,
            mailer,
            service,
        }
    }

    fn stored_code(id: &str, code: &str, expires_in: Duration) -> PasswordResetCode {
        let now = Utc::now();
        PasswordResetCode {
            id: id.to_string(),
            email: EMAIL.to_string(),
            code: code.to_string(),
            created_at: Some(now - Duration::minutes(1)),
            expires_at: Some(now + expires_in),
            used: false,
        }
    }

    fn session(token: &str, expires_in: Duration, used: bool) -> PasswordResetSession {
        let now = Utc::now();
        PasswordResetSession {
            token: token.to_string(),
            email: EMAIL.to_string(),
            code_id: "code-1".to_string(),
            created_at: now,
            expires_at: now + expires_in,
            used,
        }
    }

    #[test]
    fn generated_codes_are_six_digits_without_leading_zero() {
        for _ in 0..200 {
            let code = PasswordResetService::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn newest_code_prefers_latest_expiry() {
        let older = stored_code("a", "111111", Duration::minutes(2));
        let newer = stored_code("b", "111111", Duration::minutes(14));
        let picked = newest_code(vec![older, newer]).unwrap();
        assert_eq!(picked.id, "b");
        assert!(newest_code(Vec::new()).is_none());
    }

    #[tokio::test]
    async fn issuing_invalidates_previous_unused_codes() {
        let f = fixture().await;
        f.service.issue_code(EMAIL).await.unwrap();
        f.service.issue_code(EMAIL).await.unwrap();

        let codes = f.store.codes_for(EMAIL).await;
        assert_eq!(codes.len(), 2);
        assert_eq!(codes.iter().filter(|c| !c.used).count(), 1);
        assert!(codes[0].used);

        let sent = f.mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(sent[1].text.contains(&codes[1].code));
    }

    #[tokio::test]
    async fn issuing_for_unknown_account_fails_without_mail() {
        let f = fixture().await;
        let err = f.service.issue_code("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
        assert!(f.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn issuing_without_mailer_reports_configuration() {
        let store = Arc::new(MemoryStore::new());
        store.add_account(EMAIL, "hash").await;
        let service =
            PasswordResetService::new(store.clone(), store.clone(), None, ResetConfig::default());

        let err = service.issue_code(EMAIL).await.unwrap_err();
        assert!(matches!(err, AppError::MailNotConfigured));
        assert!(store.codes_for(EMAIL).await.is_empty());
    }

    #[tokio::test]
    async fn verifying_consumes_the_code_and_mints_a_session() {
        let f = fixture().await;
        f.store.put_code(stored_code("code-1", "482913", Duration::minutes(10))).await;

        let token = f.service.verify_code(EMAIL, "482913").await.unwrap();
        let session = f.store.find_session(&token).await.unwrap().unwrap();
        assert_eq!(session.email, EMAIL);
        assert_eq!(session.code_id, "code-1");
        assert!(!session.used);
        let ttl = session.expires_at - session.created_at;
        assert_eq!(ttl, Duration::minutes(30));

        let again = f.service.verify_code(EMAIL, "482913").await.unwrap_err();
        assert!(matches!(again, AppError::InvalidCode));
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_burned() {
        let f = fixture().await;
        f.store.put_code(stored_code("code-1", "482913", Duration::seconds(-1))).await;

        let err = f.service.verify_code(EMAIL, "482913").await.unwrap_err();
        assert!(matches!(err, AppError::CodeExpired));
        assert!(f.store.codes_for(EMAIL).await[0].used);
    }

    #[tokio::test]
    async fn wrong_code_is_rejected() {
        let f = fixture().await;
        f.store.put_code(stored_code("code-1", "482913", Duration::minutes(10))).await;
        let err = f.service.verify_code(EMAIL, "000000").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCode));
    }

    #[tokio::test]
    async fn duplicate_codes_resolve_to_the_newest() {
        let f = fixture().await;
        f.store.put_code(stored_code("old", "482913", Duration::minutes(1))).await;
        f.store.put_code(stored_code("new", "482913", Duration::minutes(12))).await;

        let token = f.service.verify_code(EMAIL, "482913").await.unwrap();
        let session = f.store.find_session(&token).await.unwrap().unwrap();
        assert_eq!(session.code_id, "new");
    }

    #[tokio::test]
    async fn full_flow_changes_the_password_once() {
        let f = fixture().await;
        f.service.issue_code(EMAIL).await.unwrap();
        let code = f.store.codes_for(EMAIL).await[0].code.clone();
        let token = f.service.verify_code(EMAIL, &code).await.unwrap();

        f.service.reset_password(EMAIL, &token, "nueva-clave").await.unwrap();
        let hash = f.store.password_hash(EMAIL).await.unwrap();
        assert!(bcrypt::verify("nueva-clave", &hash).unwrap());

        let err = f
            .service
            .reset_password(EMAIL, &token, "otra-clave")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionUsed));
        let unchanged = f.store.password_hash(EMAIL).await.unwrap();
        assert_eq!(hash, unchanged);
    }

    #[tokio::test]
    async fn session_checks_are_enforced() {
        let f = fixture().await;
        f.store.put_session(session("expired", Duration::seconds(-1), false)).await;
        f.store.put_session(session("fresh", Duration::minutes(20), false)).await;

        let short = f.service.reset_password(EMAIL, "fresh", "12345").await.unwrap_err();
        assert!(matches!(short, AppError::ValidationError(_)));

        let missing = f.service.reset_password(EMAIL, "nope", "123456").await.unwrap_err();
        assert!(matches!(missing, AppError::SessionNotFound));

        let expired = f.service.reset_password(EMAIL, "expired", "123456").await.unwrap_err();
        assert!(matches!(expired, AppError::SessionExpired));

        let mismatch = f
            .service
            .reset_password("mallory@example.com", "fresh", "123456")
            .await
            .unwrap_err();
        assert!(matches!(mismatch, AppError::SessionEmailMismatch));

        assert_eq!(f.store.password_hash(EMAIL).await.as_deref(), Some("old-hash"));
    }
}
