//! Error types for the `agora` binary.
//!
//! [`SimError`] is the top-level error type that wraps all possible
//! failure modes of the three subcommands.

/// Top-level error for the `agora` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The API server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: agora_api::ServerError,
    },

    /// A request made by the command-line client failed.
    #[error("client error: {source}")]
    Client {
        /// The underlying client error.
        #[from]
        source: crate::api_client::ClientError,
    },

    /// The engine rejected an operation the workload driver expected to succeed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: agora_engine::EngineError,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },

    /// A workload actor task panicked or was cancelled.
    #[error("actor task failed: {message}")]
    Actor {
        /// Description of the task failure.
        message: String,
    },

    /// Filesystem failure outside configuration loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while printing a response.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
