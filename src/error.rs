//! Error types for the laneq crate

use thiserror::Error;

use crate::lane::Action;

/// Main error type for the laneq crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action '{action}' is not legal in state '{state}'")]
    InvalidAction { action: Action, state: String },

    #[error("episode already over: state '{state}' is at the horizon")]
    EpisodeOver { state: String },

    #[error("no legal actions available in state '{state}'")]
    NoLegalActions { state: String },

    #[error("state '{state}' is outside the declared bucket domain: {detail}")]
    StateSpaceViolation { state: String, detail: String },

    #[error("opponent pool is empty: register at least one policy before sampling")]
    EmptyOpponentPool,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid state key '{key}': {detail}")]
    InvalidStateKey { key: String, detail: String },

    #[error("unknown action identifier '{token}'")]
    UnknownAction { token: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
