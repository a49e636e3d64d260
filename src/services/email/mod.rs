//! Outbound transactional email.
//!
//! Templates render the Spanish customer copy; the transport is SMTP via
//! lettre. Everything above this module talks to the [`Mailer`] trait.

mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SmtpConfig;

pub const SENDER_NAME: &str = "AgroMarket";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Timed out connecting to the SMTP server. Try again later.")]
    Timeout,

    #[error("SMTP authentication failed. Check the credentials.")]
    Authentication,

    #[error("SMTP configuration error: the server host is not valid ({0})")]
    InvalidHost(String),

    #[error("Invalid SMTP configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// A rendered message with an HTML body and a plain-text alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Builds the SMTP mailer, or `None` when host or credentials are missing.
pub fn create_mailer(config: &SmtpConfig) -> Result<Option<Arc<dyn Mailer>>, MailError> {
    if !config.is_configured() {
        tracing::warn!(
            "⚠️ SMTP not configured (host: {}, user: {}, pass: {})",
            if config.host.is_empty() { "❌" } else { "✅" },
            if config.user.is_empty() { "❌" } else { "✅" },
            if config.pass.is_empty() { "❌" } else { "✅" },
        );
        return Ok(None);
    }

    tracing::info!(
        "📧 Configuring SMTP: {}:{} (secure: {})",
        config.host,
        config.port,
        config.secure
    );
    let mailer = SmtpMailer::new(config)?;
    Ok(Some(Arc::new(mailer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp(user: &str, pass: &str) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            user: user.to_string(),
            pass: pass.to_string(),
            secure: false,
            from: String::new(),
        }
    }

    #[test]
    fn unconfigured_smtp_yields_no_mailer() {
        assert!(create_mailer(&smtp("", "")).unwrap().is_none());
        assert!(create_mailer(&smtp("shop@example.com", "")).unwrap().is_none());
    }

    #[tokio::test]
    async fn configured_smtp_yields_a_mailer() {
        let mailer = create_mailer(&smtp("shop@example.com", "secret")).unwrap();
        assert!(mailer.is_some());
    }
}
