use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

mod auth;
mod config;
mod database;
mod handlers;
mod services;
mod sheet;
mod utils;

use auth::JwtManager;
use config::Settings;
use database::{DbPool, NewMember, Repository, StaffRole, StaffStatus};
use services::{ImportService, ReportsService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,crm_api_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting CRM API Server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // Initialize database pool
    let db_pool = DbPool::new(&settings.database).await?;
    info!("✅ Database connection established");

    // Initialize repository and bootstrap schema
    let repository = Arc::new(Repository::new(db_pool));
    repository.ensure_schema().await?;
    info!("✅ Schema ready");

    seed_admin(&repository, &settings).await?;

    // Initialize services
    let jwt = Arc::new(JwtManager::new(
        &settings.auth.jwt_secret,
        settings.auth.token_ttl_seconds,
    ));
    let import_service = Arc::new(ImportService::new(repository.clone()));
    let reports_service = Arc::new(ReportsService::new(repository.clone()));

    // Build router
    let app = build_router(
        repository,
        jwt,
        import_service,
        reports_service,
        settings.import.max_upload_bytes,
    );

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the first admin account on an empty team table so the instance
/// is loggable at all.
async fn seed_admin(repository: &Arc<Repository>, settings: &Settings) -> Result<()> {
    let (Some(email), Some(password)) = (
        settings.auth.bootstrap_admin_email.as_deref(),
        settings.auth.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if !repository.team_is_empty().await? {
        return Ok(());
    }

    let password_hash = auth::password::hash(password)?;
    repository
        .create_member(NewMember {
            person_id: utils::ids::person_id(),
            name: "Administrator".to_string(),
            email: email.to_lowercase(),
            phone: None,
            password_hash,
            role: StaffRole::Admin,
            status: StaffStatus::Active,
        })
        .await?;
    info!("✅ Bootstrap admin {} created", email);
    Ok(())
}

fn build_router(
    repository: Arc<Repository>,
    jwt: Arc<JwtManager>,
    import_service: Arc<ImportService>,
    reports_service: Arc<ReportsService>,
    max_upload_bytes: usize,
) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/auth/login", post(handlers::auth::login_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route(
            "/api/leads",
            get(handlers::leads::list_leads_handler).post(handlers::leads::create_lead_handler),
        )
        .route(
            "/api/leads/{id}",
            put(handlers::leads::update_lead_handler)
                .delete(handlers::leads::delete_lead_handler),
        )
        .route(
            "/api/leads/{id}/follow-up",
            post(handlers::leads::save_follow_up_handler),
        )
        .route(
            "/api/leads/{id}/history",
            get(handlers::leads::lead_history_handler),
        )
        .route("/api/leads/import", post(handlers::leads::import_leads_handler))
        .route("/api/leads/template", get(handlers::leads::lead_template_handler))
        .route(
            "/api/follow-ups/due",
            get(handlers::followups::due_follow_ups_handler),
        )
        .route(
            "/api/tasks",
            get(handlers::tasks::list_tasks_handler).post(handlers::tasks::create_task_handler),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::tasks::update_task_handler)
                .delete(handlers::tasks::delete_task_handler),
        )
        .route(
            "/api/notes",
            get(handlers::notes::list_notes_handler).post(handlers::notes::create_note_handler),
        )
        .route(
            "/api/notes/{id}",
            put(handlers::notes::update_note_handler)
                .delete(handlers::notes::delete_note_handler),
        )
        .route(
            "/api/team",
            get(handlers::team::list_team_handler).post(handlers::team::create_member_handler),
        )
        .route(
            "/api/team/{id}",
            put(handlers::team::update_member_handler)
                .delete(handlers::team::delete_member_handler),
        )
        .route(
            "/api/clients",
            get(handlers::clients::list_clients_handler)
                .post(handlers::clients::create_client_handler),
        )
        .route(
            "/api/clients/{id}",
            put(handlers::clients::update_client_handler)
                .delete(handlers::clients::delete_client_handler),
        )
        .route(
            "/api/clients/import",
            post(handlers::clients::import_clients_handler),
        )
        .route(
            "/api/clients/template",
            get(handlers::clients::client_template_handler),
        )
        .route(
            "/api/reports/dashboard",
            get(handlers::reports::dashboard_handler),
        )
        .route("/api/reports/summary", get(handlers::reports::summary_handler))
        .layer(middleware::from_fn(auth::middleware::auth_middleware))
        .layer(Extension(import_service))
        .layer(Extension(reports_service));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Shared state
        .layer(Extension(repository))
        .layer(Extension(jwt))
        // CORS
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        // Body limit for spreadsheet imports
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
