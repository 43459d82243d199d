//! Error types for the digestion subsystem.

use thiserror::Error;

/// Result type for digestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the waveform and fingerprint paths
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid worker configuration; the worker refuses to start
    #[error("Configuration error: {0}")]
    Config(String),

    /// Waveform blob shorter than its fixed header
    #[error("Waveform blob truncated: {actual} bytes is shorter than the header")]
    TruncatedHeader { actual: usize },

    /// Waveform blob version this build does not understand
    #[error("Unsupported waveform binary version: {0}")]
    UnsupportedVersion(u16),

    /// Waveform blob whose length disagrees with its header
    #[error("Invalid waveform blob length: expected {expected} bytes, got {actual}")]
    InvalidBlobLength { expected: usize, actual: usize },

    /// Digest that cannot be represented in the binary header
    #[error("Invalid digest shape: {0}")]
    InvalidDigestShape(String),

    /// Requested resource not found (e.g. a track with no embedded artwork)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Artwork mime type with no known decoder
    #[error("Unsupported image mime type: {0}")]
    UnsupportedMimeType(String),

    /// Image decoding error (wraps image::ImageError)
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Worker task has stopped; no further requests will be answered
    #[error("Waveform worker has stopped")]
    WorkerStopped,

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
