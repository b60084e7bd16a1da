use std::{error::Error as StdError, fmt, sync::Arc};

use thiserror::Error;

type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Failure raised by the remote API client. Never retried.
///
/// Sources are reference counted so an envelope carrying the error can be
/// replayed to every subscriber of a query.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("failed to reach {endpoint}: {source}")]
    Connect {
        endpoint: &'static str,
        #[source]
        source: Cause,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("{endpoint} response body is empty")]
    EmptyBody { endpoint: &'static str },

    #[error("failed to parse {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },
}

impl TransportError {
    pub fn connect<E>(endpoint: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Connect { endpoint, source: Arc::new(source) }
    }

    pub fn decode(endpoint: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { endpoint, source: Arc::new(source) }
    }
}

/// How one half of a weather refresh settled, as reported in a join failure.
#[derive(Debug, Clone)]
pub enum BranchOutcome {
    Status(String),
    MissingResult,
    Failed(TransportError),
}

impl fmt::Display for BranchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchOutcome::Status(status) => write!(f, "status is {status}"),
            BranchOutcome::MissingResult => f.write_str("status is ok but result is missing"),
            BranchOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Everything a repository operation can settle into besides a value.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("response status is {status}")]
    ServerStatus { status: String },

    /// Always names both halves, even when only one of them failed.
    #[error("realtime response {realtime}, daily response {daily}")]
    Join {
        realtime: BranchOutcome,
        daily: BranchOutcome,
    },

    #[error(
        "daily forecast is misaligned: {sky_days} sky entries vs {temperature_days} temperature entries"
    )]
    MisalignedForecast {
        sky_days: usize,
        temperature_days: usize,
    },
}

impl RepositoryError {
    /// First transport failure behind this error, if any.
    pub fn transport_cause(&self) -> Option<&TransportError> {
        match self {
            RepositoryError::Transport(err) => Some(err),
            RepositoryError::Join { realtime, daily } => [realtime, daily].into_iter().find_map(
                |outcome| match outcome {
                    BranchOutcome::Failed(err) => Some(err),
                    _ => None,
                },
            ),
            _ => None,
        }
    }
}

/// Failures of the selected-place store. Not folded into envelopes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no place has been saved yet")]
    NotSaved,

    #[error("failed to access place store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize place record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("stored place record is corrupt: {0}")]
    Decode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn join_message_names_both_halves() {
        let err = RepositoryError::Join {
            realtime: BranchOutcome::Status("ok".into()),
            daily: BranchOutcome::Status("failed".into()),
        };

        let msg = err.to_string();
        assert!(msg.contains("realtime response status is ok"));
        assert!(msg.contains("daily response status is failed"));
    }

    #[test]
    fn join_failure_exposes_transport_cause() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer");
        let err = RepositoryError::Join {
            realtime: BranchOutcome::Failed(TransportError::connect("realtime", reset)),
            daily: BranchOutcome::Status("ok".into()),
        };

        assert!(err.to_string().contains("connection reset by peer"));

        let cause = err.transport_cause().expect("realtime half failed");
        let source = cause.source().expect("connect error has a source");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn store_encode_and_decode_failures_read_differently() {
        let decode = serde_json::from_str::<u8>("{").unwrap_err();
        let encode = serde_json::to_string(&std::collections::HashMap::from([(vec![1u8], 1)]))
            .unwrap_err();

        assert!(StoreError::Encode(encode).to_string().starts_with("failed to serialize"));
        assert!(StoreError::Decode(decode).to_string().starts_with("stored place record is corrupt"));
    }

    #[test]
    fn server_status_has_no_transport_cause() {
        let err = RepositoryError::ServerStatus { status: "failed".into() };
        assert!(err.transport_cause().is_none());
        assert_eq!(err.to_string(), "response status is failed");
    }
}
