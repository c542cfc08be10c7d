use thiserror::Error;

use super::ProbeStage;

/// Failure while talking to one MX host.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no socket address resolved for {host}")]
    NoAddress { host: String },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("{stage} refused with {code}: {message}")]
    Refused {
        stage: ProbeStage,
        code: u16,
        message: String,
    },
}

impl ProbeError {
    pub(crate) fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
