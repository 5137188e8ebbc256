//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the session run
//! so `main` can propagate with `?`.

use marrow_core::config::ConfigError;
use marrow_core::{LivesError, RunnerError, SessionError, StoreError};
use marrow_observer::ServerError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The profile store could not be opened or written.
    #[error("profile store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// Lives bookkeeping failed.
    #[error("lives error: {source}")]
    Lives {
        /// The underlying lives error.
        #[from]
        source: LivesError,
    },

    /// The configured selection does not name a known catalog entry.
    #[error("selection error: {message}")]
    Selection {
        /// Description of the bad selection.
        message: String,
    },

    /// The session refused to start.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },

    /// The session loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// The harvest sync client could not be built.
    #[error("sync error: {message}")]
    Sync {
        /// Description of the sync failure.
        message: String,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}
