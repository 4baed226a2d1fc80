use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::Instrument;

use analysis::heatmap::RadarDirectory;
use analysis::{sharecode, ReplayAggregator, ReplayDecoder};
use common::demo_analysis::Match;

use crate::error::WorkerError;
use crate::fetch::ReplayFetcher;
use crate::metrics::{MetricsSink, ProcessTime};
use crate::platform::{LoginDetails, PlatformClient, PlatformError};
use crate::report::Reporter;
use crate::session::{LoginState, ReloginOutcome, SentryFile, SessionController, RELOGIN_RETRY_DELAY};

/// Everything the pipeline talks to.
pub struct Components {
    pub platform: Arc<dyn PlatformClient>,
    pub fetcher: Arc<dyn ReplayFetcher>,
    pub decoder: Arc<dyn ReplayDecoder + Send + Sync>,
    pub reporter: Arc<dyn Reporter>,
    pub metrics: Arc<dyn MetricsSink>,
    pub radars: RadarDirectory,
    /// Where replays are downloaded to, `data/demos` by default.
    pub demo_dir: PathBuf,
    pub sentry: SentryFile,
}

#[derive(Debug, Default)]
struct Queue {
    pending: VecDeque<String>,
    busy: bool,
}

/// Processes queued sharing codes strictly one after another.
pub struct Downloader {
    queue: Mutex<Queue>,
    initialized: AtomicBool,

    session: tokio::sync::Mutex<SessionController>,
    state: tokio::sync::watch::Receiver<LoginState>,

    platform: Arc<dyn PlatformClient>,
    fetcher: Arc<dyn ReplayFetcher>,
    decoder: Arc<dyn ReplayDecoder + Send + Sync>,
    reporter: Arc<dyn Reporter>,
    metrics: Arc<dyn MetricsSink>,
    radars: RadarDirectory,
    demo_dir: PathBuf,
}

impl Downloader {
    pub fn new(components: Components) -> Arc<Self> {
        let session = SessionController::new(components.platform.clone(), components.sentry);
        let state = session.subscribe();

        Arc::new(Self {
            queue: Mutex::new(Queue::default()),
            initialized: AtomicBool::new(false),
            session: tokio::sync::Mutex::new(session),
            state,
            platform: components.platform,
            fetcher: components.fetcher,
            decoder: components.decoder,
            reporter: components.reporter,
            metrics: components.metrics,
            radars: components.radars,
            demo_dir: components.demo_dir,
        })
    }

    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn login_state(&self) -> LoginState {
        *self.state.borrow()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Claims the one-time initialization, `false` if it was already claimed.
    pub fn begin_init(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    /// Number of codes waiting, not counting the one in flight.
    pub fn pending(&self) -> usize {
        self.queue().pending.len()
    }

    /// Logs in with the given details and starts working the queue.
    ///
    /// Callers claim the initialization with [`Downloader::begin_init`] first.
    pub async fn init(self: Arc<Self>, details: LoginDetails) -> Result<(), WorkerError> {
        let result = self.session.lock().await.connect(details).await;
        match result {
            Ok(()) => {
                self.drain().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                Err(e)
            }
        }
    }

    /// Queues a sharing code, processing starts in the background.
    pub fn add<S>(self: &Arc<Self>, code: S)
    where
        S: Into<String>,
    {
        let code = code.into();
        tracing::debug!("{} added to the download queue", code);
        self.queue().pending.push_back(code);

        tokio::spawn(self.clone().drain());
    }

    /// Works through the queue until it is empty or the session is not usable.
    pub fn drain(self: Arc<Self>) -> BoxFuture<'static, ()> {
        async move {
            loop {
                let state = self.login_state();
                if state == LoginState::LoginError {
                    // The drain holding the queue relogins once its item is done
                    if self.queue().busy {
                        return;
                    }
                    if !self.attempt_relogin().await {
                        return;
                    }
                    continue;
                }

                let code = {
                    let mut queue = self.queue();
                    if queue.busy || state != LoginState::ClientReady {
                        return;
                    }

                    match queue.pending.pop_front() {
                        Some(code) => {
                            queue.busy = true;
                            code
                        }
                        None => return,
                    }
                };

                let span = tracing::info_span!("Demo", code = %code);
                self.work(code).instrument(span).await;

                self.queue().busy = false;
            }
        }
        .boxed()
    }

    /// Returns true if the session is usable again.
    async fn attempt_relogin(self: &Arc<Self>) -> bool {
        let outcome = self.session.lock().await.relogin().await;

        match outcome {
            ReloginOutcome::Recovered => true,
            ReloginOutcome::Suppressed => false,
            ReloginOutcome::Failed => {
                let this = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(RELOGIN_RETRY_DELAY).await;
                    this.drain().await;
                });
                false
            }
        }
    }

    async fn work(&self, code: String) {
        let started = tokio::time::Instant::now();

        let result = self.process(&code).await;

        let report = match &result {
            Ok((path, m)) => {
                tracing::info!("Replay processed");
                let sample = ProcessTime::now(started.elapsed(), path.to_string_lossy());
                if let Err(e) = self.metrics.record(sample).await {
                    tracing::error!("Storing process time: {}", e);
                }
                Some(m)
            }
            Err(e) => {
                tracing::error!("Processing failed: {}", e);
                None
            }
        };

        if let Err(e) = self.reporter.report(report).await {
            tracing::error!("Reporting result: {}", e);
        }
    }

    async fn process(&self, code: &str) -> Result<(PathBuf, Match), WorkerError> {
        let sharing_code = sharecode::decode(code)?;
        tracing::debug!(?sharing_code, "Requesting game");

        let mut matches = match self.platform.request_game(&sharing_code).await {
            Ok(m) => m,
            Err(e) => {
                if let PlatformError::Transport(_) = e {
                    self.session.lock().await.mark_disconnected();
                }
                return Err(e.into());
            }
        };

        if matches.len() != 1 {
            return Err(WorkerError::IncompleteMatchData(format!(
                "Expected exactly one match but got {}",
                matches.len()
            )));
        }
        let raw = matches.remove(0);

        let link = raw.replay_link().ok_or_else(|| {
            WorkerError::IncompleteMatchData("Last round has no replay link".to_owned())
        })?;

        let archive = self.fetcher.download(link, &self.demo_dir).await?;
        let replay = self.fetcher.decompress(&archive).await?;

        let result = self.analyse(&replay, raw.timestamp_millis()).await?;
        Ok((replay, result))
    }

    async fn analyse(&self, replay: &Path, match_timestamp: i64) -> Result<Match, WorkerError> {
        let aggregator = ReplayAggregator::new(replay, match_timestamp, self.radars.clone());
        let decoder = self.decoder.clone();

        let result = tokio::task::spawn_blocking(move || aggregator.process(&*decoder)).await??;
        Ok(result)
    }
}
