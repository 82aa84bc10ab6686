//! LexLink Server
//!
//! Production server for the marketplace REST APIs:
//! - Auth: register, login, profile, password reset
//! - Clients: case requests, slot booking, dashboard
//! - Advocates: directory, case-request decisions, availability
//! - Internships, messaging, notifications, admin, search
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEX_API_PORT` | `8080` | HTTP API port |
//! | `LEX_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `LEX_MONGO_DB` | `lexlink` | MongoDB database name |
//! | `LEX_JWT_SECRET` | - | HMAC secret for JWT signing (required) |
//! | `LEX_JWT_EXPIRY_SECS` | `86400` | Access token lifetime |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | text | `json` for structured output |

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use lex_platform::api::{
    admin_router, advocates_router, auth_router, clients_router, health_router,
    internships_router, messaging_router, notifications_router, search_router, AdminState,
    AdvocatesState, AppState, AuthApiState, AuthLayer, ClientsState, HealthState,
    InternshipsState, MessagingState, NotificationsState, SearchState,
};
use lex_platform::shared::indexes::initialize_indexes;
use lex_platform::shared::logging::init_logging;
use lex_platform::{
    Argon2Config, AppointmentRepository, AuthService, ConversationRepository,
    InternshipRepository, MessageRepository, NotificationRepository, PasswordService,
    ResetTokenRepository, UserRepository,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    // A panicked task leaves the server in an unknown state; log and let
    // the supervisor restart the process
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Unrecoverable panic: {}", info);
        std::process::exit(1);
    }));

    info!("Starting LexLink Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("LEX_API_PORT", 8080);
    let mongo_url = env_or("LEX_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("LEX_MONGO_DB", "lexlink");
    let jwt_secret =
        std::env::var("LEX_JWT_SECRET").context("LEX_JWT_SECRET must be set")?;
    let jwt_expiry_secs: i64 = env_or_parse("LEX_JWT_EXPIRY_SECS", 86400);

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    initialize_indexes(&db).await?;

    // Initialize repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let appointment_repo = Arc::new(AppointmentRepository::new(&db));
    let internship_repo = Arc::new(InternshipRepository::new(&db));
    let conversation_repo = Arc::new(ConversationRepository::new(&db));
    let message_repo = Arc::new(MessageRepository::new(&db));
    let notification_repo = Arc::new(NotificationRepository::new(&db));
    let reset_token_repo = Arc::new(ResetTokenRepository::new(&db));
    info!("Repositories initialized");

    // Initialize services
    let auth_service = Arc::new(AuthService::new(&jwt_secret, jwt_expiry_secs));
    let password_service = Arc::new(PasswordService::new(Argon2Config::default())?);
    info!("Auth services initialized");

    let app_state = AppState {
        auth_service: auth_service.clone(),
    };

    // Build API states
    let auth_api_state = AuthApiState {
        user_repo: user_repo.clone(),
        reset_token_repo,
        auth_service,
        password_service,
    };
    let clients_state = ClientsState {
        user_repo: user_repo.clone(),
        appointment_repo: appointment_repo.clone(),
        notification_repo: notification_repo.clone(),
    };
    let advocates_state = AdvocatesState {
        user_repo: user_repo.clone(),
        appointment_repo: appointment_repo.clone(),
        notification_repo: notification_repo.clone(),
    };
    let internships_state = InternshipsState {
        internship_repo: internship_repo.clone(),
        user_repo: user_repo.clone(),
        notification_repo: notification_repo.clone(),
    };
    let messaging_state = MessagingState {
        conversation_repo: conversation_repo.clone(),
        message_repo: message_repo.clone(),
        user_repo: user_repo.clone(),
        notification_repo: notification_repo.clone(),
    };
    let notifications_state = NotificationsState {
        notification_repo: notification_repo.clone(),
        appointment_repo: appointment_repo.clone(),
        internship_repo: internship_repo.clone(),
        conversation_repo,
        user_repo: user_repo.clone(),
    };
    let admin_state = AdminState {
        user_repo: user_repo.clone(),
        appointment_repo,
        internship_repo: internship_repo.clone(),
        notification_repo,
    };
    let search_state = SearchState {
        user_repo,
        internship_repo,
    };

    let health_state = HealthState::new(db, Some(env!("CARGO_PKG_VERSION").to_string()));

    let app = Router::new()
        .nest("/api/v1/auth", auth_router(auth_api_state))
        .nest("/api/v1/clients", clients_router(clients_state))
        .nest("/api/v1/advocates", advocates_router(advocates_state))
        .nest("/api/v1/internships", internships_router(internships_state))
        .nest("/api/v1/messages", messaging_router(messaging_state))
        .nest("/api/v1/notifications", notifications_router(notifications_state))
        .nest("/api/v1/admin", admin_router(admin_state))
        .nest("/api/v1/search", search_router(search_state))
        .nest("/health", health_router(health_state.clone()))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    health_state.set_ready();

    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("LexLink Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
