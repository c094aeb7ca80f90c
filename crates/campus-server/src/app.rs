use crate::permissions::extract;
use crate::{AppConfig, routes};
use axum::routing::get;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayerBuilder;
use http::{Method, header};
use protect_axum::GrantsLayer;
use sea_orm::DatabaseConnection;
use sentry_tower::NewSentryLayer;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[cfg(test)]
mod tests;

fn api_cors(origins: &[String]) -> anyhow::Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(
            origins
                .iter()
                .map(|origin| origin.parse())
                .collect::<Result<Vec<_>, _>>()?,
        )
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600)))
}

/// The versioned API without the process wide layers.
pub(crate) fn api_router() -> Router {
    Router::new()
        .nest("/status", routes::api::v0::status::create_router())
        .nest("/accounts", routes::api::v0::accounts::create_router())
        .nest("/courses", routes::api::v0::courses::create_router())
        .nest("/forums", routes::api::v0::forums::create_router())
        .nest("/messages", routes::api::v0::messages::create_router())
        .nest("/notifications", routes::api::v0::notifications::create_router())
        .nest("/assistants", routes::api::v0::assistants::create_router())
        .nest("/dashboard", routes::api::v0::dashboard::create_router())
}

pub fn create_app(app_config: AppConfig, origins: &[String], seaorm_pool: DatabaseConnection) -> anyhow::Result<Router> {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayerBuilder::new()
        .with_prefix("api")
        .with_default_metrics()
        .build_pair();

    if origins.is_empty() {
        tracing::info!("no cors origins configured");
    }

    let app = Router::new()
        .merge(routes::swagger::create_router())
        .nest("/api/v0", api_router().layer(api_cors(origins)?))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(
            // Router layers are called bottom to top
            // ServiceBuilder layers are called top to bottom
            ServiceBuilder::new()
                .layer(NewSentryLayer::new_from_top())
                .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
                .layer(prometheus_layer)
                .layer(TraceLayer::new_for_http())
                .layer(Extension(app_config))
                .layer(Extension(seaorm_pool))
                .layer(GrantsLayer::with_extractor(extract)),
        )
        .with_state(());
    Ok(app)
}
