pub mod chat;
pub mod notification;
pub mod order;
pub mod password_reset;
pub mod receipt;
pub mod user;
