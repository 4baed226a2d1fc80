use analysis::sharecode::SharecodeError;
use analysis::AnalysisError;

use crate::fetch::FetchError;
use crate::platform::PlatformError;

/// Why a login or a queued sharing code did not make it through.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Transient transport failure: {0}")]
    TransientTransport(String),
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),
    #[error("Malformed sharing code: {0}")]
    MalformedInput(#[from] SharecodeError),
    #[error("Incomplete match data: {0}")]
    IncompleteMatchData(String),
    #[error("Replay could not be decoded: {0}")]
    DecodeFailure(#[source] AnalysisError),
    #[error("Retrieving replay: {0}")]
    Fetch(#[from] FetchError),
    #[error("Analysis task: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<PlatformError> for WorkerError {
    fn from(value: PlatformError) -> Self {
        match value {
            PlatformError::Transport(m) => Self::TransientTransport(m),
            PlatformError::Rejected(m) => Self::AuthenticationRejected(m),
        }
    }
}

impl From<AnalysisError> for WorkerError {
    fn from(value: AnalysisError) -> Self {
        match value {
            AnalysisError::MissingTeamScore(side) => Self::IncompleteMatchData(format!(
                "Replay ended without a round count for the {:?} team",
                side
            )),
            other => Self::DecodeFailure(other),
        }
    }
}
