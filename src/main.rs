//! Quartermaster Server - equipment checkout
//!
//! REST API server for role-based equipment requests and returns.

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quartermaster_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("quartermaster_server={},tower_http=debug", config.logging.level).into());

    if config.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Quartermaster Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Database migrations completed");

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    services.auth.ensure_admin(&config.admin).await?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication and own profile
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/name", put(api::auth::update_name))
        .route("/auth/phone", put(api::auth::update_phone))
        // Users
        .route("/users", get(api::users::list_users).delete(api::users::delete_all_users))
        .route("/users/demote-managers", post(api::users::demote_managers))
        .route("/users/demote-chiefs", post(api::users::demote_chiefs))
        .route("/users/:id", put(api::users::update_user).delete(api::users::delete_user))
        .route("/users/:id/promote-chief", post(api::users::promote_chief))
        .route("/users/:id/demote-chief", post(api::users::demote_chief))
        .route(
            "/users/:id/responsibility",
            put(api::users::assign_responsibility).delete(api::users::remove_responsibility),
        )
        // Responsibilities
        .route("/responsibilities", get(api::responsibilities::list_responsibilities))
        .route("/responsibilities/by-name/:name", get(api::responsibilities::get_responsibility_by_name))
        .route("/responsibilities/:id", get(api::responsibilities::get_responsibility))
        .route("/responsibilities/:id/description", put(api::responsibilities::update_description))
        .route(
            "/responsibilities/:id/items",
            get(api::responsibilities::list_items).post(api::responsibilities::create_item),
        )
        .route("/responsibilities/:id/requests", get(api::responsibilities::list_requests))
        .route("/responsibilities/:id/counts", get(api::responsibilities::counts))
        // Items
        .route("/items/mine", get(api::items::list_my_items))
        .route("/items/:id", put(api::items::rename_item).delete(api::items::delete_item))
        .route("/items/:id/requests", get(api::items::list_item_requests))
        .route("/items/:id/my-request", get(api::items::my_request))
        // Requests
        .route("/requests", post(api::requests::create_request))
        .route("/requests/mine", get(api::requests::list_my_requests))
        .route("/requests/mine/counts", get(api::requests::my_counts))
        .route("/requests/:id/approve", post(api::requests::approve_request))
        .route("/requests/:id/deny", post(api::requests::deny_request))
        // Events
        .route("/events", get(api::events::list_events).post(api::events::create_event))
        .route(
            "/events/:id",
            get(api::events::get_event)
                .put(api::events::update_event)
                .delete(api::events::delete_event),
        )
        .route("/events/:id/activate", post(api::events::activate_event))
        .route("/events/:id/switch-to-return", post(api::events::switch_to_return))
        .route("/events/:id/switch-to-active", post(api::events::switch_to_active))
        .route("/events/:id/complete", post(api::events::complete_event))
        .route("/events/:id/responsibilities", get(api::events::list_attached))
        .route("/events/:id/available-responsibilities", get(api::events::list_unattached))
        .route(
            "/events/:id/responsibilities/:responsibility_id",
            post(api::events::attach_responsibility).delete(api::events::detach_responsibility),
        )
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
