use axum::{routing::post, Router};

use crate::{handlers::password_reset, state::AppState};

pub fn auth_otp_routes() -> Router<AppState> {
    Router::new()
        // Email a 6-digit reset code
        .route("/password-reset/code", post(password_reset::send_reset_code))
        // Trade the code for a session token
        .route("/password-reset/verify", post(password_reset::verify_reset_code))
        // Spend the session on a new password
        .route("/password-reset/confirm", post(password_reset::confirm_reset))
}
