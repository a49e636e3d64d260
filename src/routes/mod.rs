pub mod auth_otp_routes;
pub mod notification_routes;
pub mod receipt_routes;
pub mod trigger_routes;
