use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use common::{Envelope, Message};

use super::ApiState;

#[tracing::instrument(skip(state))]
pub async fn add(
    State(state): State<Arc<ApiState>>,
    Path(sharing_code): Path<String>,
) -> (StatusCode, Json<Envelope<Message>>) {
    if sharing_code.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::err("Please add a sharing code")),
        );
    }

    state.downloader.add(sharing_code);

    (StatusCode::OK, Json(Envelope::ok("Sharing code added")))
}
