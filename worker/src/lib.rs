pub mod api;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod platform;
pub mod report;
pub mod session;

pub use config::Config;
pub use downloader::{Components, Downloader};
pub use error::WorkerError;

/// Creates `data/` and `data/demos/` if they are missing.
pub async fn prepare_folders(config: &Config) -> std::io::Result<()> {
    for folder in [config.data_dir.clone(), config.demos_dir()] {
        if !tokio::fs::try_exists(&folder).await.unwrap_or(false) {
            tokio::fs::create_dir_all(&folder).await?;
            tracing::info!("Created {:?}", folder);
        }
    }

    Ok(())
}
