//! Formsmith API gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting on the public submission endpoint
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    extract::FromRef,
    routing::{delete, get, patch, post},
    Router,
};
use formsmith_common::{
    auth::JwtManager,
    config::AppConfig,
    db::DbPool,
    metrics,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Formsmith API gateway v{}", formsmith_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Token verifier for the AuthContext extractor
    let jwt_secret = config.auth.jwt_secret.clone().unwrap_or_else(|| {
        warn!("No JWT secret configured, using an insecure development secret");
        "insecure-dev-secret".to_string()
    });
    let jwt = Arc::new(JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs));

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        jwt,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Public intake gets its own rate limit; everything else is
    // guarded by the AuthContext extractor in the handlers.
    let limiter = middleware::rate_limit::create_rate_limiter(
        state.config.rate_limit.requests_per_second,
        state.config.rate_limit.burst,
    );
    let public_routes = if state.config.rate_limit.enabled {
        Router::new()
            .route(
                "/public/forms/{slug}/submissions",
                post(handlers::submissions::submit),
            )
            .layer(axum::middleware::from_fn(move |req, next| {
                middleware::rate_limit::rate_limit_middleware(req, next, limiter.clone())
            }))
    } else {
        Router::new().route(
            "/public/forms/{slug}/submissions",
            post(handlers::submissions::submit),
        )
    };

    // API routes
    let api_routes = Router::new()
        // Dashboard overview
        .route("/dashboard", get(handlers::dashboard::overview))
        // Project endpoints
        .route("/projects", post(handlers::projects::create_project))
        .route("/projects", get(handlers::projects::list_projects))
        .route("/projects/{id}", patch(handlers::projects::rename_project))
        .route("/projects/{id}", delete(handlers::projects::delete_project))
        // Form endpoints
        .route("/forms", post(handlers::forms::create_form))
        .route("/forms/{id}", get(handlers::forms::get_form))
        .route("/forms/{id}", patch(handlers::forms::rename_form))
        .route("/forms/{id}", delete(handlers::forms::delete_form))
        // Field endpoints
        .route("/forms/{id}/fields", post(handlers::fields::create_field))
        .route(
            "/forms/{id}/fields/reorder",
            post(handlers::fields::reorder_fields),
        )
        .route(
            "/forms/{id}/fields/{field_id}",
            patch(handlers::fields::update_field),
        )
        .route(
            "/forms/{id}/fields/{field_id}",
            delete(handlers::fields::delete_field),
        )
        // Submission and insight endpoints
        .route(
            "/forms/{id}/submissions",
            get(handlers::submissions::list_submissions),
        )
        .route("/forms/{id}/insights", get(handlers::insights::get_insights));

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/v1", api_routes)
        .merge(public_routes)
        .route_layer(axum::middleware::from_fn(
            middleware::metrics::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
