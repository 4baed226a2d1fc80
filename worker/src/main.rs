use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use worker::fetch::HttpFetcher;
use worker::metrics::{MetricsSink, ProcessTimeStore};
use worker::platform::bridge;
use worker::report::MasterClient;
use worker::session::SentryFile;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("worker") || meta.target().contains("analysis")
        }));
    tracing::subscriber::set_global_default(registry)?;

    let config = worker::Config::parse();

    tracing::info!("Starting...");

    worker::prepare_folders(&config).await?;

    let decoder = config.decoder().ok_or("DEMO_DECODER must name a program")?;

    let master = Arc::new(MasterClient::new(
        config.master_server_url.clone(),
        config.demo_worker_password.clone(),
        config.worker_address.clone(),
    ));
    let metrics: Arc<dyn MetricsSink> = Arc::new(ProcessTimeStore::new(config.process_times_path()));

    let downloader = worker::Downloader::new(worker::Components {
        platform: Arc::new(bridge::Client::new(config.platform_bridge_url.clone())),
        fetcher: Arc::new(HttpFetcher::new(config.bzip2.clone())),
        decoder: Arc::new(decoder),
        reporter: master.clone(),
        metrics: metrics.clone(),
        radars: analysis::heatmap::RadarDirectory::new(config.radar_dir.clone()),
        demo_dir: config.demos_dir(),
        sentry: SentryFile::new(config.sentry_path()),
    });

    let router = worker::api::router(downloader, metrics);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!("Listening on {:?}", listener.local_addr()?);

    tokio::spawn(async move {
        if let Err(e) = master.register().await {
            tracing::error!("Could not register worker: {}", e);
        }
    });

    axum::serve(listener, router).await?;

    Ok(())
}
