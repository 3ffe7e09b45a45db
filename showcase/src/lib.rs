//! # showcase
//!
//! A small HTTP API whose purpose is its generated OpenAPI documentation. The endpoints return
//! fixed answers; the interesting parts are the request shapes they document and the image upload
//! filter on `POST /users/cheese`.
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | POST | `/cats/meow` | `Meow!` |
//! | GET | `/cats/bye-meow` | `Meow!` |
//! | POST | `/users/what` | `Just a typical answer.` |
//! | GET | `/users/why` | `Just a typical answer.` |
//! | POST | `/users/cheese` | `{"type": <uploaded MIME type>, "result": "Just a typical answer."}` |
//! | GET | `/api/docs` | Interactive API documentation |
//! | GET | `/api/docs/openapi.json` | Raw OpenAPI document |
//! | GET | `/healthz` | `OK` |
//!
//! The documentation path is configurable (see [`config::DocsConfig`]).
//!
//! ## Quick start
//!
//! ```bash
//! showcase -f config.yaml
//! ```
//!
//! With no config file every setting falls back to its default and the server listens on
//! `0.0.0.0:5000`.
pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod services;
pub mod telemetry;
pub mod uploads;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use services::{Cats, Users};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use uploads::ImageFilter;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .image_filter(Arc::new(ImageFilter::new(&config.uploads)))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    #[builder(default)]
    pub cats: Cats,
    #[builder(default)]
    pub users: Users,
    pub image_filter: Arc<ImageFilter>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let image_filter = Arc::new(ImageFilter::new(&config.uploads));
        AppState::builder().config(config).image_filter(image_filter).build()
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url serializes with a trailing slash, browsers send the bare origin
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// The upload route gets its own body limit, sized from the upload filter, so oversized bodies
/// are cut off before they are fully buffered.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let body_limit = state.image_filter.body_limit();
    debug!(body_limit, "Upload body limit");

    let router = Router::new()
        .route("/cats/meow", post(api::handlers::cats::meow))
        .route("/cats/bye-meow", get(api::handlers::cats::bye_meow))
        .route("/users/what", post(api::handlers::users::what))
        .route("/users/why", get(api::handlers::users::why))
        .route(
            "/users/cheese",
            post(api::handlers::users::upload_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state.clone())
        .merge(openapi::docs_router(&state.config.docs));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(move || std::future::ready(metric_handle.render())))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The configured router, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::from_config(config.clone());
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Server is running on http://localhost:{}{} (listening on {})",
            self.config.port, self.config.docs.path, bind_addr
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{AppState, build_router};
    use crate::config::CorsOrigin;
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::{HeaderName, HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_healthz() {
        let server = create_test_app();

        let response = server.get("/healthz").await;

        response.assert_status(StatusCode::OK);
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_docs_are_served() {
        let server = create_test_app();

        server.get("/api/docs").await.assert_status(StatusCode::OK);
        server.get("/api/docs/openapi.json").await.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_docs_path_is_configurable() {
        let mut config = create_test_config();
        config.docs.path = "/reference".to_string();
        let server = crate::test_utils::create_test_app_with_config(config);

        server.get("/reference").await.assert_status(StatusCode::OK);
        server.get("/reference/openapi.json").await.assert_status(StatusCode::OK);
        server.get("/api/docs").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = create_test_app();

        server.get("/dogs/woof").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_wildcard() {
        let server = create_test_app();

        let response = server
            .get("/cats/bye-meow")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("https://cats.example"))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://cats.example".parse().unwrap())];
        config.cors.allow_credentials = true;
        let server = crate::test_utils::create_test_app_with_config(config);

        let allowed = server
            .get("/cats/bye-meow")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("https://cats.example"))
            .await;
        assert_eq!(allowed.header("access-control-allow-origin"), "https://cats.example");
        assert_eq!(allowed.header("access-control-allow-credentials"), "true");

        let denied = server
            .get("/cats/bye-meow")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("https://dogs.example"))
            .await;
        assert!(denied.maybe_header("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_metrics_disabled_by_default() {
        let server = create_test_app();

        server.get("/internal/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }

    // The Prometheus recorder is process-global, so only this test may enable metrics.
    #[tokio::test]
    async fn test_build_router_with_metrics_enabled() {
        let mut config = create_test_config();
        config.enable_metrics = true;

        let state = AppState::from_config(config);
        let router = build_router(&state).expect("Failed to build router");
        let server = axum_test::TestServer::new(router).expect("Failed to create test server");

        server.get("/cats/bye-meow").await.assert_status(StatusCode::OK);

        let metrics_response = server.get("/internal/metrics").await;
        metrics_response.assert_status(StatusCode::OK);
        let metrics_content = metrics_response.text();
        assert!(metrics_content.contains("# HELP") || metrics_content.contains("# TYPE"));
    }
}
