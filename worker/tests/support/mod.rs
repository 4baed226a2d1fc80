#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use analysis::events::{PlayerEntity, ReplayEvent, ReplaySummary, TeamScore};
use analysis::heatmap::RadarDirectory;
use analysis::RecordedReplay;
use common::demo_analysis::{Match, Side};
use common::{ProcessingMetrics, SharingCode};
use tokio::sync::mpsc;

use worker::fetch::{FetchError, ReplayFetcher};
use worker::metrics::{summarize, MetricsError, MetricsSink, ProcessTime};
use worker::platform::{LogOnOutcome, LoginDetails, PlatformClient, PlatformError, RawMatch, RoundStats};
use worker::report::{ReportError, Reporter};
use worker::session::SentryFile;
use worker::{Components, Downloader};

/// Scripted platform, everything succeeds unless told otherwise.
#[derive(Default)]
pub struct FakePlatform {
    pub fail_connect: AtomicBool,
    pub reject_log_on: AtomicBool,
    pub fail_game: AtomicBool,
    pub omit_link: AtomicBool,
    /// Consumed one per connect, `true` fails that connect.
    pub connect_script: Mutex<VecDeque<bool>>,
    pub matches_per_game: Mutex<Option<usize>>,
    pub machine_auth: Mutex<Option<Vec<u8>>>,

    pub connects: AtomicUsize,
    pub launches: AtomicUsize,
    pub log_ons: Mutex<Vec<LoginDetails>>,
    pub requested: Mutex<Vec<SharingCode>>,
}

impl FakePlatform {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<SharingCode> {
        self.requested.lock().unwrap().clone()
    }
}

pub fn replay_link(code: &SharingCode) -> String {
    format!("http://replays.test/730/{}_{}.dem.bz2", code.match_id, code.outcome_id)
}

#[async_trait::async_trait]
impl PlatformClient for FakePlatform {
    async fn connect(&self) -> Result<(), PlatformError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let scripted = self.connect_script.lock().unwrap().pop_front();
        let fail = scripted.unwrap_or_else(|| self.fail_connect.load(Ordering::SeqCst));
        if fail {
            return Err(PlatformError::Transport("connection reset".to_owned()));
        }
        Ok(())
    }

    async fn log_on(&self, details: &LoginDetails) -> Result<LogOnOutcome, PlatformError> {
        self.log_ons.lock().unwrap().push(details.clone());

        if self.reject_log_on.load(Ordering::SeqCst) {
            return Err(PlatformError::Rejected("InvalidPassword".to_owned()));
        }
        Ok(LogOnOutcome {
            machine_auth: self.machine_auth.lock().unwrap().clone(),
        })
    }

    async fn launch(&self) -> Result<(), PlatformError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn request_game(&self, code: &SharingCode) -> Result<Vec<RawMatch>, PlatformError> {
        self.requested.lock().unwrap().push(*code);

        if self.fail_game.load(Ordering::SeqCst) {
            return Err(PlatformError::Transport("coordinator gone".to_owned()));
        }

        let count = self.matches_per_game.lock().unwrap().unwrap_or(1);
        let link = if self.omit_link.load(Ordering::SeqCst) {
            None
        } else {
            Some(replay_link(code))
        };
        Ok((0..count)
            .map(|_| RawMatch {
                matchtime: 1_600_000_000 + code.token_id as i64,
                roundstatsall: vec![
                    RoundStats { map: None },
                    RoundStats { map: link.clone() },
                ],
            })
            .collect())
    }
}

/// Writes an empty file per download and tracks how many run at once.
#[derive(Default)]
pub struct FakeFetcher {
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub links: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ReplayFetcher for FakeFetcher {
    async fn download(&self, link: &str, folder: &Path) -> Result<PathBuf, FetchError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.links.lock().unwrap().push(link.to_owned());

        tokio::task::yield_now().await;

        let name = worker::fetch::file_name(link).ok_or_else(|| FetchError::InvalidLink(link.to_owned()))?;
        let path = folder.join(name);
        tokio::fs::write(&path, b"").await?;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(path)
    }

    async fn decompress(&self, archive: &Path) -> Result<PathBuf, FetchError> {
        Ok(worker::fetch::decompressed_path(archive))
    }
}

/// Forwards every report into a channel.
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<Option<Match>>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Option<Match>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Reporter for ChannelReporter {
    async fn report(&self, result: Option<&Match>) -> Result<(), ReportError> {
        let _ = self.tx.send(result.cloned());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMetrics {
    pub samples: Mutex<Vec<ProcessTime>>,
}

#[async_trait::async_trait]
impl MetricsSink for MemoryMetrics {
    async fn record(&self, sample: ProcessTime) -> Result<(), MetricsError> {
        self.samples.lock().unwrap().push(sample);
        Ok(())
    }

    async fn summary(&self) -> Result<ProcessingMetrics, MetricsError> {
        Ok(summarize(&self.samples.lock().unwrap()))
    }
}

pub fn login() -> LoginDetails {
    LoginDetails {
        account_name: "worker".to_owned(),
        password: "hunter2".to_owned(),
        auth_code: None,
        sha_sentryfile: None,
    }
}

pub fn code(n: u64) -> String {
    analysis::sharecode::encode(&SharingCode {
        match_id: 3_100_000_000_000_000_000 + n,
        outcome_id: 3_200_000_000_000_000_000 + n,
        token_id: n as u16,
    })
}

fn player(user_id: i32, steam_id64: &str, name: &str, side: Side) -> PlayerEntity {
    PlayerEntity {
        user_id,
        steam_id64: steam_id64.to_owned(),
        steam_id3: 2000 + user_id as u32,
        name: name.to_owned(),
        is_fake: false,
        side: Some(side),
        kills: 0,
        deaths: 0,
        assists: 0,
        mvps: 0,
        score: 0,
        round_headshots: vec![1, 0],
    }
}

/// A short replay on de_dust2, `ct` missing leaves the match incomplete.
pub fn replay(ct: Option<u32>) -> RecordedReplay {
    RecordedReplay::new(vec![
        ReplayEvent::PlayerCreated(player(1, "76561198236134832", "Excel", Side::Terrorist)),
        ReplayEvent::PlayerCreated(player(2, "76561197966517722", "cute", Side::CounterTerrorist)),
        ReplayEvent::PlayerJump { user_id: 1 },
        ReplayEvent::End(ReplaySummary {
            map_name: "de_dust2".to_owned(),
            playback_time: 2100.0,
            teams: vec![
                TeamScore {
                    side: Side::Terrorist,
                    score: Some(16),
                },
                TeamScore {
                    side: Side::CounterTerrorist,
                    score: ct,
                },
            ],
        }),
    ])
}

pub struct Harness {
    pub downloader: Arc<Downloader>,
    pub platform: Arc<FakePlatform>,
    pub fetcher: Arc<FakeFetcher>,
    pub metrics: Arc<MemoryMetrics>,
    pub reports: mpsc::UnboundedReceiver<Option<Match>>,
    pub data: tempfile::TempDir,
}

impl Harness {
    pub fn new(platform: FakePlatform, replay: RecordedReplay) -> Self {
        let data = tempfile::tempdir().unwrap();
        let demos = data.path().join("demos");
        std::fs::create_dir_all(&demos).unwrap();

        let platform = Arc::new(platform);
        let fetcher = Arc::new(FakeFetcher::default());
        let metrics = Arc::new(MemoryMetrics::default());
        let (reporter, reports) = ChannelReporter::new();

        let downloader = Downloader::new(Components {
            platform: platform.clone(),
            fetcher: fetcher.clone(),
            decoder: Arc::new(replay),
            reporter: Arc::new(reporter),
            metrics: metrics.clone(),
            radars: RadarDirectory::new(data.path().join("radar")),
            demo_dir: demos,
            sentry: SentryFile::new(data.path().join("sentry")),
        });

        Self {
            downloader,
            platform,
            fetcher,
            metrics,
            reports,
            data,
        }
    }

    pub async fn next_report(&mut self) -> Option<Match> {
        self.reports.recv().await.expect("reporter dropped")
    }
}

/// Serves `router` on a random local port, returning its base url.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
