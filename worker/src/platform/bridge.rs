use base64::Engine;
use serde::{Deserialize, Serialize};

use common::SharingCode;

use super::{LogOnOutcome, LoginDetails, PlatformClient, PlatformError, RawMatch};

/// Talks to the sidecar process that holds the actual platform and
/// coordinator connections.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogOnRequest<'d> {
    account_name: &'d str,
    password: &'d str,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_code: Option<&'d str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha_sentryfile: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogOnResponse {
    #[serde(default)]
    machine_auth: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GameResponse {
    matches: Vec<RawMatch>,
}

impl Client {
    pub fn new<IS>(base_url: IS) -> Self
    where
        IS: Into<String>,
    {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<reqwest::Response, PlatformError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            return Err(PlatformError::Rejected(message));
        }
        if !status.is_success() {
            tracing::error!(?path, "Bridge responded with {}", status);
            return Err(PlatformError::Transport(format!(
                "Bridge responded with {}",
                status
            )));
        }

        Ok(response)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, PlatformError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        self.post(path, body)
            .await?
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))
    }
}

#[async_trait::async_trait]
impl PlatformClient for Client {
    #[tracing::instrument(skip(self))]
    async fn connect(&self) -> Result<(), PlatformError> {
        self.post("/connect", &serde_json::json!({})).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, details), fields(account = ?details.account_name))]
    async fn log_on(&self, details: &LoginDetails) -> Result<LogOnOutcome, PlatformError> {
        let engine = base64::engine::general_purpose::STANDARD;

        let request = LogOnRequest {
            account_name: &details.account_name,
            password: &details.password,
            auth_code: details.auth_code.as_deref(),
            sha_sentryfile: details.sha_sentryfile.as_ref().map(|sha| engine.encode(sha)),
        };

        let response: LogOnResponse = self.post_json("/logon", &request).await?;

        let machine_auth = match response.machine_auth {
            Some(encoded) => Some(engine.decode(encoded).map_err(|e| {
                PlatformError::Transport(format!("Malformed machine auth: {}", e))
            })?),
            None => None,
        };

        Ok(LogOnOutcome { machine_auth })
    }

    #[tracing::instrument(skip(self))]
    async fn launch(&self) -> Result<(), PlatformError> {
        self.post("/launch", &serde_json::json!({})).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn request_game(&self, code: &SharingCode) -> Result<Vec<RawMatch>, PlatformError> {
        let response: GameResponse = self.post_json("/game", code).await?;
        Ok(response.matches)
    }
}
