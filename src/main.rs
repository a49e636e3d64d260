use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod database;
mod dtos;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;


use config::AppConfig;
use database::{connection::get_db_client, MongoStore};
use services::email::create_mailer;
use services::fcm_service::{init_fcm_service, PushSender};
use services::notification_service::NotificationService;
use services::receipt_service::ReceiptService;
use services::reset_service::PasswordResetService;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("⚙️ Configuration: {}", config.get_config_info());

    let db = get_db_client(&config).await?;
    let app_state = initialize_app_state(&config, db).await;

    let app = build_router(app_state);
    start_server(&config, app).await
}

async fn initialize_app_state(config: &AppConfig, db: mongodb::Database) -> AppState {
    let store = Arc::new(MongoStore::new(db.clone()));

    let mailer = match create_mailer(&config.smtp) {
        Ok(mailer) => mailer,
        Err(e) => {
            tracing::error!("❌ Failed to configure SMTP: {}", e);
            None
        }
    };
    if mailer.is_some() {
        tracing::info!("✅ SMTP mailer ready");
    } else {
        tracing::warn!("Reset codes and receipts will be rejected until SMTP is configured");
    }

    tracing::info!("🔧 Attempting to initialize FCM service...");
    let push: Option<Arc<dyn PushSender>> = match init_fcm_service(&config.fcm).await {
        Ok(fcm_service) => {
            tracing::info!("✅ FCM service initialized successfully!");
            Some(fcm_service as Arc<dyn PushSender>)
        }
        Err(e) => {
            tracing::error!("❌ Failed to initialize FCM service: {}", e);
            tracing::warn!("FCM notifications will be disabled");
            None
        }
    };

    let reset_service = Arc::new(PasswordResetService::new(
        store.clone(),
        store.clone(),
        mailer.clone(),
        config.reset,
    ));
    let receipt_service = Arc::new(ReceiptService::new(mailer.clone()));
    let notification_service = Arc::new(NotificationService::new(store.clone(), store, push));

    AppState::new(
        reset_service,
        receipt_service,
        notification_service,
        mailer.is_some(),
    )
    .with_db(db)
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(handlers::health::root_handler))
        .route("/health", get(handlers::health::health_check))
        .route("/api/health", get(handlers::health::api_health_check))
        .nest("/api/auth", routes::auth_otp_routes::auth_otp_routes())
        .nest("/api/receipts", routes::receipt_routes::receipt_routes())
        .nest("/api/triggers", routes::trigger_routes::trigger_routes())
        .nest(
            "/api/notifications",
            routes::notification_routes::notification_routes(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;
    axum::serve(listener, app).await?;
    Ok(())
}
