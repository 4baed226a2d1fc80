use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sha1::{Digest, Sha1};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::WorkerError;
use crate::platform::{LoginDetails, PlatformClient, PlatformError};

/// Failed relogins in a row before relogins pause for [`RELOGIN_COOLDOWN`].
pub const MAX_RELOGIN_FAILS: u32 = 5;
pub const RELOGIN_COOLDOWN: Duration = Duration::from_secs(60 * 60);
pub const RELOGIN_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    NotReady,
    PlatformConnected,
    LoggedIn,
    ClientReady,
    LoginError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloginOutcome {
    /// Too many failures recently, nothing was attempted.
    Suppressed,
    Recovered,
    /// Attempted and failed, the caller should retry after [`RELOGIN_RETRY_DELAY`].
    Failed,
}

/// Machine-auth blob of the platform account, stored in `data/sentry`.
#[derive(Debug, Clone)]
pub struct SentryFile {
    path: PathBuf,
}

impl SentryFile {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    /// SHA-1 of the stored blob, `None` if nothing was stored yet.
    pub async fn sha(&self) -> std::io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(content) => Ok(Some(Sha1::digest(&content).to_vec())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn store(&self, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(&self.path, bytes).await
    }
}

/// Owns the platform login and decides when a lost session gets retried.
pub struct SessionController {
    platform: Arc<dyn PlatformClient>,
    sentry: SentryFile,
    state: watch::Sender<LoginState>,

    details: Option<LoginDetails>,
    relogin_attempts: u32,
    last_failed_relogin: Option<Instant>,
}

impl SessionController {
    pub fn new(platform: Arc<dyn PlatformClient>, sentry: SentryFile) -> Self {
        let (state, _) = watch::channel(LoginState::NotReady);

        Self {
            platform,
            sentry,
            state,
            details: None,
            relogin_attempts: 0,
            last_failed_relogin: None,
        }
    }

    pub fn current_state(&self) -> LoginState {
        *self.state.borrow()
    }

    /// Observe state changes without going through the controller.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    pub fn relogin_attempts(&self) -> u32 {
        self.relogin_attempts
    }

    fn set_state(&self, state: LoginState) {
        tracing::debug!(?state, "Login state changed");
        self.state.send_replace(state);
    }

    /// Logs in and launches the game client, resolving once the client is
    /// ready.
    ///
    /// Losing the connection before the log-on went through is retried after
    /// [`RELOGIN_RETRY_DELAY`] as long as the details carry an auth code,
    /// a rejected log-on never is.
    #[tracing::instrument(skip(self, details), fields(account = ?details.account_name))]
    pub async fn connect(&mut self, details: LoginDetails) -> Result<(), WorkerError> {
        self.details = Some(details.clone());

        let mut reconnects = 0;
        loop {
            match self.login_once(details.clone()).await {
                Err(LoginFailure::Unauthenticated(e))
                    if details.auth_code.is_some() && reconnects < MAX_RELOGIN_FAILS =>
                {
                    reconnects += 1;
                    tracing::warn!("Connection lost before log-on, reconnecting: {}", e);
                    tokio::time::sleep(RELOGIN_RETRY_DELAY).await;
                }
                Err(failure) => return Err(failure.into()),
                Ok(()) => return Ok(()),
            }
        }
    }

    async fn login_once(&mut self, mut details: LoginDetails) -> Result<(), LoginFailure> {
        self.set_state(LoginState::NotReady);

        if let Err(e) = self.platform.connect().await {
            return Err(self.transport_failure(e, false));
        }
        tracing::info!("Connected to the platform");
        self.set_state(LoginState::PlatformConnected);

        match self.sentry.sha().await {
            Ok(sha) => details.sha_sentryfile = sha,
            Err(e) => tracing::warn!("Reading sentry file: {}", e),
        };

        let outcome = match self.platform.log_on(&details).await {
            Ok(o) => o,
            Err(e) => return Err(self.transport_failure(e, false)),
        };
        tracing::info!("Logged in");
        self.set_state(LoginState::LoggedIn);

        if let Some(machine_auth) = outcome.machine_auth {
            if let Err(e) = self.sentry.store(&machine_auth).await {
                tracing::error!("Storing sentry file: {}", e);
            }
        }

        if let Err(e) = self.platform.launch().await {
            return Err(self.transport_failure(e, true));
        }
        tracing::info!("Game client launched and ready");
        self.set_state(LoginState::ClientReady);

        Ok(())
    }

    fn transport_failure(&self, error: PlatformError, authenticated: bool) -> LoginFailure {
        match error {
            PlatformError::Rejected(message) => {
                tracing::error!("Log-on rejected: {}", message);
                self.set_state(LoginState::NotReady);
                LoginFailure::Rejected(message)
            }
            PlatformError::Transport(message) => {
                tracing::error!("Platform connection failed: {}", message);
                self.set_state(LoginState::LoginError);
                if authenticated {
                    LoginFailure::Authenticated(message)
                } else {
                    LoginFailure::Unauthenticated(message)
                }
            }
        }
    }

    /// Logs in again with the last known details, unless too many attempts
    /// failed within [`RELOGIN_COOLDOWN`].
    #[tracing::instrument(skip(self), fields(attempts = self.relogin_attempts))]
    pub async fn relogin(&mut self) -> ReloginOutcome {
        let details = match self.details.clone() {
            Some(d) => d,
            None => {
                tracing::warn!("Relogin without ever logging in");
                return ReloginOutcome::Suppressed;
            }
        };

        // Someone else got the session back while this caller waited for it
        if self.current_state() != LoginState::LoginError {
            tracing::debug!(state = ?self.current_state(), "Relogin no longer needed");
            return ReloginOutcome::Recovered;
        }

        if self.relogin_attempts > MAX_RELOGIN_FAILS {
            let cooled_down = self
                .last_failed_relogin
                .map(|last| last.elapsed() >= RELOGIN_COOLDOWN)
                .unwrap_or(true);
            if !cooled_down {
                tracing::debug!("Relogin suppressed");
                return ReloginOutcome::Suppressed;
            }

            self.relogin_attempts = 0;
        }

        match self.login_once(details).await {
            Ok(()) => {
                tracing::info!("Relogin succeeded");
                self.relogin_attempts = 0;
                ReloginOutcome::Recovered
            }
            Err(e) => {
                self.relogin_attempts += 1;
                self.last_failed_relogin = Some(Instant::now());
                tracing::error!(attempts = self.relogin_attempts, "Relogin failed: {}", e);
                ReloginOutcome::Failed
            }
        }
    }

    /// The coordinator connection broke while the client was in use.
    pub fn mark_disconnected(&self) {
        tracing::warn!("Marking session as disconnected");
        self.set_state(LoginState::LoginError);
    }
}

#[derive(Debug, thiserror::Error)]
enum LoginFailure {
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Authenticated(String),
}

impl From<LoginFailure> for WorkerError {
    fn from(value: LoginFailure) -> Self {
        match value {
            LoginFailure::Rejected(m) => Self::AuthenticationRejected(m),
            LoginFailure::Unauthenticated(m) | LoginFailure::Authenticated(m) => {
                Self::TransientTransport(m)
            }
        }
    }
}
