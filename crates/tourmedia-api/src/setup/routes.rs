//! Route configuration and setup

use crate::constants::{
    API_PREFIX, MULTIPART_OVERHEAD_BYTES, PUBLIC_UPLOADS_ROUTE, STATIC_CACHE_CONTROL,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tourmedia_core::{Config, UploadMode};
use tourmedia_processing::IntakeLimits;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let upload_limit = upload_body_limit(&state.media.limits);

    tracing::debug!(
        upload_body_limit_bytes = upload_limit,
        request_timeout_secs = config.request_timeout_secs(),
        "Configuring routes"
    );

    let api_routes = Router::new()
        .route(
            &format!("{}/media/{{content_domain}}/{{mode}}", API_PREFIX),
            post(handlers::media_upload::upload_media)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            &format!("{}/media", API_PREFIX),
            delete(handlers::media_delete::delete_media),
        )
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/api/openapi.json", get(crate::api_doc::openapi_json))
        .with_state(state);

    let app = api_routes
        .nest_service(PUBLIC_UPLOADS_ROUTE, static_uploads(config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs(),
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Largest body any upload mode can legitimately send.
fn upload_body_limit(limits: &IntakeLimits) -> usize {
    let largest = UploadMode::ALL
        .iter()
        .map(|mode| limits.max_body_bytes(*mode))
        .max()
        .unwrap_or(0);
    usize::try_from(largest.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
}

/// Read-only view of the uploads root, cacheable by anyone.
fn static_uploads(config: &Config) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(config.uploads_root()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CROSS_ORIGIN_RESOURCE_POLICY,
            HeaderValue::from_static("cross-origin"),
        ))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
