pub mod aggregator;
pub mod decoder;
pub mod events;
pub mod heatmap;
pub mod maps;
pub mod sharecode;
pub mod stats;

pub use aggregator::{AnalysisError, ReplayAggregator};
pub use decoder::{DecodeError, ExternalDecoder, RecordedReplay, ReplayDecoder};
