use std::sync::Arc;

use chrono::Utc;

use crate::errors::{AppError, Result};
use crate::models::receipt::ReceiptRequest;
use crate::services::email::{templates, Mailer};

pub struct ReceiptService {
    mailer: Option<Arc<dyn Mailer>>,
}

impl ReceiptService {
    pub fn new(mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self { mailer }
    }

    pub async fn send_receipt(&self, request: ReceiptRequest) -> Result<()> {
        let receipt = request.into_receipt(Utc::now())?;

        let mailer = self.mailer.as_ref().ok_or_else(|| {
            tracing::error!("❌ SMTP not configured; cannot send receipt");
            AppError::MailNotConfigured
        })?;

        tracing::info!(
            "📧 Sending receipt for order {} to {}",
            receipt.order_id,
            receipt.email
        );
        mailer.send(templates::receipt_email(&receipt)).await?;

        tracing::info!("✅ Receipt sent for order {}", receipt.order_id);
        Ok(())
    }
}
