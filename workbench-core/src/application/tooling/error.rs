use thiserror::Error;

/// Failures of the transport itself. Tool failures travel as
/// [`InvocationResult::Failure`](super::InvocationResult) instead.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot start tool server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool server '{server}': {message}")]
    Transport { server: String, message: String },
    #[error("tool server '{server}' sent malformed JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server '{server}' answered with error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool server '{server}' exited")]
    Terminated { server: String },
    #[error("request to tool server '{server}' was abandoned")]
    Cancelled { server: String },
}

impl TransportError {
    pub fn server(&self) -> &str {
        match self {
            Self::Spawn { server, .. }
            | Self::Transport { server, .. }
            | Self::InvalidJson { server, .. }
            | Self::Rpc { server, .. }
            | Self::Terminated { server }
            | Self::Cancelled { server } => server,
        }
    }
}
