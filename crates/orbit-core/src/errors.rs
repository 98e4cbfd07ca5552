//! Error types for frames and storage.

use std::path::PathBuf;

use thiserror::Error;

/// A frame received on the socket that could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The payload was not JSON, or did not match any known frame shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised by file-backed storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is not valid JSON: {source}")]
    Json {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_frame_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = FrameError::from(json_err);
        assert!(err.to_string().starts_with("malformed frame"));
    }

    #[test]
    fn io_error_mentions_path() {
        let err = StorageError::Io {
            path: PathBuf::from("/tmp/orbit/local.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/orbit/local.json"));
        assert!(msg.contains("denied"));
    }
}
