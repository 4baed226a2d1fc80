use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use common::{Envelope, Message};
use serde::Deserialize;

use super::ApiState;
use crate::platform::LoginDetails;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub auth_code: Option<String>,
}

/// Hands the platform credentials to the worker, only accepted once.
///
/// The first attempt usually triggers a verification mail, so the code from
/// that mail has to be part of the same request.
#[tracing::instrument(skip(state, request), fields(username = ?request.username))]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<LoginRequest>,
) -> (StatusCode, Json<Envelope<Message>>) {
    if !state.downloader.begin_init() {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::err("Already initialized")),
        );
    }

    let details = LoginDetails {
        account_name: request.username,
        password: request.password,
        auth_code: request.auth_code,
        sha_sentryfile: None,
    };

    tokio::spawn(state.downloader.clone().init(details));

    (
        StatusCode::OK,
        Json(Envelope::ok("Trying to log in to the platform!")),
    )
}
