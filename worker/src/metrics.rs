use std::path::PathBuf;

use common::ProcessingMetrics;
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Accessing process times: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding process time: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How long one replay took from dequeue to finished analysis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTime {
    /// Completion time in unix milliseconds
    pub log_time: i64,
    /// Milliseconds
    pub processing_time: u64,
    pub demo: String,
}

impl ProcessTime {
    pub fn now<S>(processing_time: std::time::Duration, demo: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            log_time: chrono::Utc::now().timestamp_millis(),
            processing_time: processing_time.as_millis() as u64,
            demo: demo.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait MetricsSink: Send + Sync {
    async fn record(&self, sample: ProcessTime) -> Result<(), MetricsError>;

    async fn summary(&self) -> Result<ProcessingMetrics, MetricsError>;
}

/// Process times as JSON lines, `data/process_times.jsonl` by default.
pub struct ProcessTimeStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl ProcessTimeStore {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<ProcessTime>, MetricsError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    tracing::warn!("Skipping malformed process time: {}", e);
                    None
                }
            })
            .collect())
    }
}

/// `average` is 0 and `longest` is -1 without any samples.
pub fn summarize(samples: &[ProcessTime]) -> ProcessingMetrics {
    let all: Vec<u64> = samples.iter().map(|s| s.processing_time).collect();

    let total: u64 = all.iter().sum();
    let average = if all.is_empty() {
        0.0
    } else {
        total as f64 / all.len() as f64
    };
    let longest = all.iter().max().map(|l| *l as i64).unwrap_or(-1);

    ProcessingMetrics {
        all,
        average,
        longest,
    }
}

#[async_trait::async_trait]
impl MetricsSink for ProcessTimeStore {
    async fn record(&self, sample: ProcessTime) -> Result<(), MetricsError> {
        let mut line = serde_json::to_vec(&sample)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }

    async fn summary(&self) -> Result<ProcessingMetrics, MetricsError> {
        let _guard = self.lock.lock().await;
        let samples = self.load().await?;
        Ok(summarize(&samples))
    }
}
