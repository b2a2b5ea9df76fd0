//! Error types for the session layer.

/// Failure to persist round history.
///
/// Never fatal: the session actor logs it and carries on.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("history i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An in-memory sink's lock was poisoned by a panicking writer.
    #[error("history sink lock poisoned")]
    Poisoned,
}
