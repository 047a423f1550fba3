//! Photo describer: accepts a raw image over HTTP, asks a vision-language model
//! for a short Latvian description, folds the diacritics out of it and answers
//! with JSON.

pub mod api;
pub mod config;
pub mod describe;
pub mod errors;
pub mod telemetry;
pub mod transient;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub use config::Config;
pub use describe::{fold_diacritics, DescriptionService};
pub use errors::Error;

/// Builds the application router from a loaded config.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let state = Arc::new(api::AppState {
        service: DescriptionService::new(config)?,
        temp_dir: config.temp_dir(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // The CORS layer only answers preflights; plain responses get the headers here.
    let headers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(cors);

    Ok(Router::new()
        .route("/", any(api::describe_photo))
        .route("/healthz", get(api::healthz))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(headers)
        .with_state(state))
}

/// Serves the router until `shutdown` resolves.
pub async fn serve(
    config: &Config,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(config)?;
    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    tracing::info!("🚀 Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
