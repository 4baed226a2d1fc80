//! Seam towards the game platform: account login, the game client and the
//! coordinator that resolves sharing codes into match metadata.

use common::SharingCode;

pub mod bridge;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Platform transport: {0}")]
    Transport(String),
    #[error("Log-on rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginDetails {
    pub account_name: String,
    pub password: String,
    /// One-time code from the verification mail.
    pub auth_code: Option<String>,
    /// SHA-1 of the stored machine-auth blob.
    pub sha_sentryfile: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogOnOutcome {
    /// Fresh machine-auth bytes, should replace the stored sentry file.
    pub machine_auth: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct RoundStats {
    /// Download link of the replay, only set on the last round.
    #[serde(default)]
    pub map: Option<String>,
}

/// Match metadata as returned by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct RawMatch {
    /// Unix seconds
    pub matchtime: i64,
    #[serde(default)]
    pub roundstatsall: Vec<RoundStats>,
}

impl RawMatch {
    pub fn replay_link(&self) -> Option<&str> {
        self.roundstatsall.last().and_then(|r| r.map.as_deref())
    }

    /// Milliseconds, the unit the coordinator stores match dates in.
    pub fn timestamp_millis(&self) -> i64 {
        self.matchtime * 1000
    }
}

#[async_trait::async_trait]
pub trait PlatformClient: Send + Sync {
    async fn connect(&self) -> Result<(), PlatformError>;

    async fn log_on(&self, details: &LoginDetails) -> Result<LogOnOutcome, PlatformError>;

    /// Starts the game client, which is what the coordinator talks to.
    async fn launch(&self) -> Result<(), PlatformError>;

    async fn request_game(&self, code: &SharingCode) -> Result<Vec<RawMatch>, PlatformError>;
}
