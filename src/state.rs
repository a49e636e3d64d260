use std::sync::Arc;

use mongodb::Database;

use crate::services::notification_service::NotificationService;
use crate::services::receipt_service::ReceiptService;
use crate::services::reset_service::PasswordResetService;

#[derive(Clone)]
pub struct AppState {
    pub db: Option<Database>,
    pub reset_service: Arc<PasswordResetService>,
    pub receipt_service: Arc<ReceiptService>,
    pub notification_service: Arc<NotificationService>,
    pub smtp_enabled: bool,
}

impl AppState {
    pub fn new(
        reset_service: Arc<PasswordResetService>,
        receipt_service: Arc<ReceiptService>,
        notification_service: Arc<NotificationService>,
        smtp_enabled: bool,
    ) -> Self {
        AppState {
            db: None,
            reset_service,
            receipt_service,
            notification_service,
            smtp_enabled,
        }
    }

    pub fn with_db(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }
}
