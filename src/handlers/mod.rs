pub(crate) mod health;
pub(crate) mod notification_handler;
pub(crate) mod password_reset;
pub(crate) mod receipts;
pub(crate) mod triggers;
