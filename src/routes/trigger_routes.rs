use axum::{routing::post, Router};

use crate::{handlers::triggers, state::AppState};

pub fn trigger_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/chats/:chat_id/messages/:message_id",
            post(triggers::on_message_created),
        )
        .route("/orders/:order_id", post(triggers::on_order_updated))
}
