use std::path::PathBuf;

#[derive(Debug, Clone, clap::Parser)]
#[command(about = "Downloads and analyses match replays for the coordinator")]
pub struct Config {
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub http_port: u16,

    /// Base url of the coordinator
    #[arg(long, env = "MASTER_SERVER_URL")]
    pub master_server_url: String,

    #[arg(long, env = "DEMO_WORKER_PASSWORD")]
    pub demo_worker_password: String,

    /// Address under which the coordinator reaches this worker
    #[arg(long, env = "WORKER_ADDRESS")]
    pub worker_address: String,

    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Folder with the `<map>.txt` radar calibration files
    #[arg(long, env = "RADAR_DIR", default_value = "radar")]
    pub radar_dir: PathBuf,

    #[arg(long, env = "PLATFORM_BRIDGE_URL", default_value = "http://127.0.0.1:7000")]
    pub platform_bridge_url: String,

    /// Command printing the events of the replay given as last argument
    #[arg(long, env = "DEMO_DECODER", default_value = "demo-events")]
    pub demo_decoder: String,

    #[arg(long, env = "BZIP2", default_value = "bzip2")]
    pub bzip2: PathBuf,
}

impl Config {
    pub fn demos_dir(&self) -> PathBuf {
        self.data_dir.join("demos")
    }

    pub fn sentry_path(&self) -> PathBuf {
        self.data_dir.join("sentry")
    }

    pub fn process_times_path(&self) -> PathBuf {
        self.data_dir.join("process_times.jsonl")
    }

    /// Splits [`Config::demo_decoder`] into the program and its leading
    /// arguments.
    pub fn decoder(&self) -> Option<analysis::ExternalDecoder> {
        let mut parts = self.demo_decoder.split_whitespace();
        let program = parts.next()?;

        Some(analysis::ExternalDecoder::new(program).with_args(parts))
    }
}
