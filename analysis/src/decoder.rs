use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::events::ReplayEvent;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Starting decoder: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Reading decoder output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decoder did not provide an output stream")]
    MissingOutput,
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Decoder exited with {0}")]
    Exited(std::process::ExitStatus),
    #[error("Decoder reported: {0}")]
    Reported(String),
    #[error("Replay ended without an end marker")]
    Truncated,
}

pub type EventStream<'s> = Box<dyn Iterator<Item = Result<ReplayEvent, DecodeError>> + 's>;

/// Turns a replay file into its stream of events.
pub trait ReplayDecoder {
    fn decode<'s>(&'s self, path: &Path) -> Result<EventStream<'s>, DecodeError>;
}

/// Runs an external dump tool that writes one JSON encoded [`ReplayEvent`]
/// per line to stdout.
#[derive(Debug, Clone)]
pub struct ExternalDecoder {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalDecoder {
    pub fn new<P>(program: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl ReplayDecoder for ExternalDecoder {
    #[tracing::instrument(skip(self))]
    fn decode<'s>(&'s self, path: &Path) -> Result<EventStream<'s>, DecodeError> {
        tracing::debug!("Starting {:?}", self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(DecodeError::Spawn)?;

        let stdout = child.stdout.take().ok_or(DecodeError::MissingOutput)?;

        Ok(Box::new(EventLines {
            lines: BufReader::new(stdout).lines(),
            child: Some(child),
        }))
    }
}

struct EventLines {
    lines: Lines<BufReader<ChildStdout>>,
    child: Option<Child>,
}

impl Iterator for EventLines {
    type Item = Result<ReplayEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => {
                    let event = serde_json::from_str::<ReplayEvent>(&line).map_err(DecodeError::from);
                    return Some(match event {
                        Ok(ReplayEvent::Error { message }) => Err(DecodeError::Reported(message)),
                        other => other,
                    });
                }
                Some(Err(e)) => return Some(Err(DecodeError::Io(e))),
                None => {
                    let mut child = self.child.take()?;
                    return match child.wait() {
                        Ok(status) if status.success() => None,
                        Ok(status) => Some(Err(DecodeError::Exited(status))),
                        Err(e) => Some(Err(DecodeError::Io(e))),
                    };
                }
            }
        }
    }
}

impl Drop for EventLines {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // Stopped reading early, the tool may still be writing
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Plays back events that were already decoded, ignoring the path.
#[derive(Debug, Clone, Default)]
pub struct RecordedReplay {
    events: Vec<ReplayEvent>,
}

impl RecordedReplay {
    pub fn new(events: Vec<ReplayEvent>) -> Self {
        Self { events }
    }
}

impl ReplayDecoder for RecordedReplay {
    fn decode<'s>(&'s self, _path: &Path) -> Result<EventStream<'s>, DecodeError> {
        Ok(Box::new(self.events.iter().cloned().map(|event| match event {
            ReplayEvent::Error { message } => Err(DecodeError::Reported(message)),
            other => Ok(other),
        })))
    }
}
