pub mod email;
pub mod fcm_service;
pub mod notification_service;
pub mod receipt_service;
pub mod reset_service;

#[cfg(test)]
pub mod testing;
