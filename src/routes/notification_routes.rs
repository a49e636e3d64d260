use axum::{routing::post, Router};

use crate::{handlers::notification_handler, state::AppState};

pub fn notification_routes() -> Router<AppState> {
    Router::new().route("/tokens", post(notification_handler::register_token))
}
