use axum::{routing::post, Router};

use crate::{handlers::receipts, state::AppState};

pub fn receipt_routes() -> Router<AppState> {
    Router::new().route("/email", post(receipts::send_receipt_email))
}
