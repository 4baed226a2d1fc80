use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use common::{Envelope, ProcessingMetrics};

use super::ApiState;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub processing_metrics: ProcessingMetrics,
}

pub async fn get(State(state): State<Arc<ApiState>>) -> Response {
    match state.metrics.summary().await {
        Ok(processing_metrics) => Json(Envelope {
            error: false,
            data: MetricsResponse { processing_metrics },
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Loading process times: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Envelope::err("Could not load metrics")),
            )
                .into_response()
        }
    }
}
