use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{MailError, Mailer, OutgoingEmail, SENDER_NAME};
use crate::config::SmtpConfig;

const SMTP_TIMEOUT: Duration = Duration::from_secs(60);

/// SMTP mailer over a pooled lettre transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// `secure` selects implicit TLS; otherwise STARTTLS is used when the
    /// server offers it.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(MailError::InvalidHost("empty host".to_string()));
        }

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| MailError::InvalidConfig(format!("SMTP relay error: {}", e)))?
                .port(config.port)
        } else {
            let tls_params = TlsParameters::new(host.to_string())
                .map_err(|e| MailError::InvalidConfig(format!("TLS configuration error: {}", e)))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(config.port)
                .tls(Tls::Opportunistic(tls_params))
        };

        let transport = builder
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let address: Address = config
            .from_address()
            .parse()
            .map_err(|e| MailError::InvalidConfig(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(SENDER_NAME.to_string()), address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )
            .map_err(|e| MailError::SendFailed(format!("Failed to build email: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!("❌ SMTP send failed: {}", e);
            classify_smtp_failure(
                e.is_timeout(),
                e.status().map(|code| code.to_string()),
                e.to_string(),
            )
        })?;

        Ok(())
    }
}

/// Turns a transport failure into the message a customer can act on.
fn classify_smtp_failure(timed_out: bool, status: Option<String>, detail: String) -> MailError {
    if timed_out || detail.to_lowercase().contains("timed out") {
        return MailError::Timeout;
    }
    if matches!(status.as_deref(), Some("530") | Some("534") | Some("535")) {
        return MailError::Authentication;
    }
    let lowered = detail.to_lowercase();
    if lowered.contains("lookup") || lowered.contains("resolve") || lowered.contains("dns") {
        return MailError::InvalidHost(detail);
    }
    MailError::SendFailed(detail)
}
