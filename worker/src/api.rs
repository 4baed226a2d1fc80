use std::sync::Arc;

use crate::downloader::Downloader;
use crate::metrics::MetricsSink;

pub mod account;
pub mod demo;
pub mod metrics;

pub struct ApiState {
    pub downloader: Arc<Downloader>,
    pub metrics: Arc<dyn MetricsSink>,
}

pub fn router(downloader: Arc<Downloader>, metrics: Arc<dyn MetricsSink>) -> axum::Router {
    axum::Router::new()
        .route("/account/login", axum::routing::post(account::login))
        .route("/demo/:sharing_code", axum::routing::post(demo::add))
        .route("/health", axum::routing::get(health))
        .route("/metrics", axum::routing::get(metrics::get))
        .with_state(Arc::new(ApiState {
            downloader,
            metrics,
        }))
}

async fn health() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}
