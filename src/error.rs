/// Error types for derivative generation
///
/// Covers the three places a run can go wrong:
/// - Configuration (override file unreadable or invalid)
/// - Discovery (none of the expected sources exist)
/// - Per-derivative work (decode, encode, write, task join)

use std::path::PathBuf;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// None of the configured source files exist
    #[error("no existing images found in {}", .dir.display())]
    NoImagesFound { dir: PathBuf },

    /// Config file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `Config`
    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config parsed but holds values we cannot use
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Source image could not be opened or decoded
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Resized image could not be encoded
    #[error("failed to encode {}: {message}", .path.display())]
    Encode { path: PathBuf, message: String },

    /// Generic I/O failure (write, open, metadata)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest serialization failed
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A background job panicked or was cancelled
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl OptimizeError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
