use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Replay link {0:?} has no file name")]
    InvalidLink(String),
    #[error("Requesting replay: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Replay host responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("Writing replay: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decompression exited with {0}")]
    Decompress(std::process::ExitStatus),
}

/// Gets a replay archive onto disk and unpacks it.
#[async_trait::async_trait]
pub trait ReplayFetcher: Send + Sync {
    /// Downloads `link` into `folder`, returning the path of the archive.
    async fn download(&self, link: &str, folder: &Path) -> Result<PathBuf, FetchError>;

    /// Unpacks the archive next to itself, returning the path of the replay.
    async fn decompress(&self, archive: &Path) -> Result<PathBuf, FetchError>;
}

pub struct HttpFetcher {
    http: reqwest::Client,
    bzip2: PathBuf,
}

impl HttpFetcher {
    pub fn new<P>(bzip2: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            http: reqwest::Client::new(),
            bzip2: bzip2.into(),
        }
    }
}

/// Last path segment of the link, ignoring any query.
pub fn file_name(link: &str) -> Option<&str> {
    let path = link.split(&['?', '#'][..]).next().unwrap_or(link);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

/// `x.dem.bz2` unpacks to `x.dem`, anything else gets `.out` appended.
pub fn decompressed_path(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".bz2") {
        Some(stem) if !stem.is_empty() => archive.with_file_name(stem),
        _ => archive.with_file_name(format!("{}.out", name)),
    }
}

#[async_trait::async_trait]
impl ReplayFetcher for HttpFetcher {
    #[tracing::instrument(skip(self, folder))]
    async fn download(&self, link: &str, folder: &Path) -> Result<PathBuf, FetchError> {
        let name = file_name(link).ok_or_else(|| FetchError::InvalidLink(link.to_owned()))?;
        let path = folder.join(name);

        tracing::debug!("Downloading replay {} to {:?}", name, path);

        let response = self.http.get(link).send().await?;
        if !response.status().is_success() {
            tracing::error!("Replay host responded with {}", response.status());
            return Err(FetchError::Status(response.status()));
        }

        // Convert the stream into an `AsyncRead`.
        let body = response
            .bytes_stream()
            .map(|b| b.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));
        let body_reader = tokio_util::io::StreamReader::new(body);
        futures::pin_mut!(body_reader);

        // Overwrites whatever an earlier run left behind
        let mut file = tokio::io::BufWriter::new(tokio::fs::File::create(&path).await?);

        tokio::io::copy(&mut body_reader, &mut file).await?;
        file.flush().await?;

        tracing::debug!("Replay {} downloaded", name);
        Ok(path)
    }

    #[tracing::instrument(skip(self))]
    async fn decompress(&self, archive: &Path) -> Result<PathBuf, FetchError> {
        let status = tokio::process::Command::new(&self.bzip2)
            .arg("-d")
            .arg("-f")
            .arg(archive)
            .status()
            .await?;

        if !status.success() {
            return Err(FetchError::Decompress(status));
        }

        let target = decompressed_path(archive);
        tracing::debug!("Decompressed into {:?}", target);
        Ok(target)
    }
}
