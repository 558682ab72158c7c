//! Session-level errors.
//!
//! The engine's typed errors pass through unchanged; everything the hosting
//! layer adds on top (codecs, snapshots, transports, providers) gets its own
//! variant here.

use skirmish_core::EngineError;

/// Errors surfaced by the hosting layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The engine rejected the event (or replay diverged).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A peer frame carried an event type this build does not know.
    /// Typically a version skew between peers.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    #[error("codec failure: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("snapshot encoding failure: {0}")]
    Snapshot(#[from] bincode::Error),

    /// A received snapshot does not match its own replayed history.
    #[error("snapshot fingerprint mismatch (expected {expected}, got {actual})")]
    FingerprintMismatch { expected: String, actual: String },

    #[error("decision provider failure: {0}")]
    Provider(String),

    #[error("transport closed")]
    TransportClosed,

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
