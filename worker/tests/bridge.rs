mod support;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use common::SharingCode;
use pretty_assertions::assert_eq;
use worker::platform::{bridge, LoginDetails, PlatformClient, PlatformError, RawMatch, RoundStats};

type Seen = Arc<Mutex<Vec<serde_json::Value>>>;

fn sidecar(seen: Seen) -> axum::Router {
    axum::Router::new()
        .route("/connect", axum::routing::post(|| async { StatusCode::OK }))
        .route("/launch", axum::routing::post(|| async { StatusCode::OK }))
        .route(
            "/logon",
            axum::routing::post(
                |State(seen): State<Seen>, Json(body): Json<serde_json::Value>| async move {
                    let rejected = body["password"] == "wrong";
                    seen.lock().unwrap().push(body);

                    if rejected {
                        return Err((StatusCode::UNAUTHORIZED, "InvalidPassword"));
                    }
                    // base64 of "sentry"
                    Ok(Json(serde_json::json!({ "machineAuth": "c2VudHJ5" })))
                },
            ),
        )
        .route(
            "/game",
            axum::routing::post(
                |State(seen): State<Seen>, Json(body): Json<serde_json::Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(serde_json::json!({
                        "matches": [{
                            "matchtime": 1600000000,
                            "roundstatsall": [
                                {},
                                { "map": "http://replay.test/730/a.dem.bz2" },
                            ],
                        }],
                    }))
                },
            ),
        )
        .with_state(seen)
}

fn details(password: &str) -> LoginDetails {
    LoginDetails {
        account_name: "worker".to_owned(),
        password: password.to_owned(),
        auth_code: Some("F4K3C".to_owned()),
        sha_sentryfile: Some(b"0123456789abcdefghij".to_vec()),
    }
}

#[tokio::test]
async fn full_login() {
    let seen = Seen::default();
    let client = bridge::Client::new(support::serve(sidecar(seen.clone())).await);

    client.connect().await.unwrap();
    let outcome = client.log_on(&details("hunter2")).await.unwrap();
    client.launch().await.unwrap();

    assert_eq!(Some(b"sentry".to_vec()), outcome.machine_auth);
    assert_eq!(
        serde_json::json!({
            "accountName": "worker",
            "password": "hunter2",
            "authCode": "F4K3C",
            "shaSentryfile": "MDEyMzQ1Njc4OWFiY2RlZmdoaWo=",
        }),
        seen.lock().unwrap()[0]
    );
}

#[tokio::test]
async fn rejected_log_on() {
    let client = bridge::Client::new(support::serve(sidecar(Seen::default())).await);

    let result = client.log_on(&details("wrong")).await;

    assert!(
        matches!(&result, Err(PlatformError::Rejected(m)) if m == "InvalidPassword"),
        "{:?}",
        result
    );
}

#[tokio::test]
async fn request_game() {
    let seen = Seen::default();
    let client = bridge::Client::new(support::serve(sidecar(seen.clone())).await);

    let code = SharingCode {
        match_id: 3106049990460440633,
        outcome_id: 3106056003414655216,
        token_id: 11842,
    };
    let matches = client.request_game(&code).await.unwrap();

    assert_eq!(
        vec![RawMatch {
            matchtime: 1600000000,
            roundstatsall: vec![
                RoundStats { map: None },
                RoundStats {
                    map: Some("http://replay.test/730/a.dem.bz2".to_owned())
                },
            ],
        }],
        matches
    );
    assert_eq!(Some("http://replay.test/730/a.dem.bz2"), matches[0].replay_link());
    assert_eq!(
        serde_json::json!({
            "matchId": 3106049990460440633u64,
            "outcomeId": 3106056003414655216u64,
            "tokenId": 11842,
        }),
        seen.lock().unwrap()[0]
    );
}

#[tokio::test]
async fn unreachable_bridge() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = bridge::Client::new(format!("http://{}/", addr));

    assert!(matches!(
        client.connect().await,
        Err(PlatformError::Transport(_))
    ));
}
