//! # Server Configuration
//!
//! Application state, the router and the OpenAPI document.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::session_middleware;
use crate::config::AppConfig;
use crate::handlers::{self, account, dashboard};
use crate::identity::IdentityProvider;
use crate::storage::ObjectStorage;
use crate::telemetry::trace_id_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_body_bytes;

    let dashboard_routes = Router::new()
        .route("/me", get(dashboard::me))
        .route("/events", get(dashboard::list_events))
        .route("/event", post(dashboard::create_event))
        // GET reads by slug, PUT writes by id; one segment serves both
        .route(
            "/event/{key}",
            get(dashboard::get_event).put(dashboard::update_event),
        )
        .route("/verify-slug", post(dashboard::verify_slug))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/auth/register", post(account::register))
        .route("/auth/confirm", post(account::confirm))
        .route("/auth/login", post(account::login))
        .route("/auth/forgot-password", post(account::forgot_password))
        .route("/auth/reset-password", post(account::reset_password))
        .route("/auth/logout", post(account::logout))
        .route("/me", get(account::me))
        .nest("/dashboard", dashboard_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Binds the configured address and serves `state` until the process stops.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state
        .config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::account::register,
        crate::handlers::account::confirm,
        crate::handlers::account::login,
        crate::handlers::account::forgot_password,
        crate::handlers::account::reset_password,
        crate::handlers::account::logout,
        crate::handlers::account::me,
        crate::handlers::dashboard::me,
        crate::handlers::dashboard::list_events,
        crate::handlers::dashboard::get_event,
        crate::handlers::dashboard::create_event,
        crate::handlers::dashboard::update_event,
        crate::handlers::dashboard::verify_slug,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::error::ValidationIssue,
            crate::identity::AuthTokens,
            crate::validation::RegisterRequest,
            crate::validation::ConfirmRequest,
            crate::validation::LoginRequest,
            crate::validation::ForgotPasswordRequest,
            crate::validation::ResetPasswordRequest,
            crate::handlers::types::SuccessResponse,
            crate::handlers::types::EmailResponse,
            crate::handlers::types::LoginResponse,
            crate::handlers::types::CompanyDto,
            crate::handlers::types::CompanyResponse,
            crate::handlers::types::AddressDto,
            crate::handlers::types::EventConfigDto,
            crate::handlers::types::EventDto,
            crate::handlers::types::EventDetailDto,
            crate::handlers::types::EventResponse,
            crate::handlers::types::EventsResponse,
            crate::handlers::types::VerifySlugRequest,
            crate::handlers::types::VerifySlugResponse,
            crate::handlers::types::HealthResponse,
            crate::models::event::EventStatus,
            crate::models::event_config::ConfirmationType,
        )
    ),
    tags(
        (name = "root", description = "Service info and health probes"),
        (name = "auth", description = "Account registration, login and recovery"),
        (name = "dashboard", description = "Company events, behind the session cookie")
    ),
    info(
        title = "Eventosnow API",
        description = "Company accounts and event management for the Eventosnow dashboard",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
