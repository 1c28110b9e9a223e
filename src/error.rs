//! Error types for the cold-start handshake.

/// Top-level error type for the splash startup flow.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Storage fault raised by the engine while initializing.
    ///
    /// Fatal for the current attempt; surfaced to the user through a
    /// blocking dialog and never retried automatically.
    #[error("storage error: {0}")]
    Storage(String),

    /// The configured splash theme is not one this build knows how to render.
    #[error("unsupported theme: {0:?}")]
    UnsupportedTheme(String),

    /// Configuration parse or serialization error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial startup context is no longer accepting commands.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, StartupError>;
