pub mod demo_analysis;

/// The identifiers a sharing code resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingCode {
    pub match_id: u64,
    pub outcome_id: u64,
    pub token_id: u16,
}

/// Response body used by every endpoint of the worker API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Envelope<T> {
    pub error: bool,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub message: String,
}

impl Envelope<Message> {
    pub fn ok<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            error: false,
            data: Message {
                message: message.into(),
            },
        }
    }

    pub fn err<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            error: true,
            data: Message {
                message: message.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessingMetrics {
    pub all: Vec<u64>,
    pub average: f64,
    pub longest: i64,
}
