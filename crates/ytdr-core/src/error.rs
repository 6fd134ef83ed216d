//! Error types for the ytdr core library
//!
//! Provides a single error enum with human-readable messages,
//! step wrapping for the resolution pipeline and Tauri-compatible
//! serialization.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Pipeline step that produced an error during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning the raw user input into a video ID
    IdentifierLookup,
    /// Fetching the video info document
    MetadataRetrieval,
    /// Decoding the video info document into streams
    Parsing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::IdentifierLookup => "identifier lookup",
            Stage::MetadataRetrieval => "metadata retrieval",
            Stage::Parsing => "parsing",
        };
        f.write_str(name)
    }
}

/// Error type for all ytdr operations
///
/// Implements Display for human-readable messages and Serialize
/// for Tauri command compatibility.
#[derive(Error, Debug)]
pub enum YtdrError {
    /// Input could not be turned into a valid video ID
    #[error("Invalid video identifier: {0}")]
    InvalidIdentifier(String),

    /// Connection-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a status other than 200
    #[error("Unexpected HTTP status {status} from {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Video info document reported `status=fail`
    #[error("Server reported failure: {0}")]
    UpstreamFailure(String),

    /// Video info document carried a status that is neither `ok` nor `fail`
    #[error("Non-success response status found in the server's answer: {0}")]
    UnexpectedStatus(String),

    /// Video info document has no `status` key
    #[error("No response status found in the server's answer")]
    MissingStatus,

    /// Video info document has no `player_response` key
    #[error("No stream map found in the server's answer")]
    MissingStreamMap,

    /// `player_response` is not a JSON document of the expected shape
    #[error("Malformed player response: {0}")]
    MalformedPlayerResponse(#[from] serde_json::Error),

    /// Video cannot be played, therefore cannot be downloaded
    #[error("Cannot play back or download video: {0}")]
    Unplayable(String),

    /// A ciphered stream URL could not be resolved
    #[error("Cipher resolution failed: {0}")]
    CipherResolutionFailed(String),

    /// No stream to select or download
    #[error("Empty stream list")]
    EmptyStreamList,

    /// Local filesystem failure (directory or file creation)
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    /// Transfer failed after the body started streaming
    #[error("Download failed: {0}")]
    Download(String),

    /// The configured SOCKS5 proxy string is unusable
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    /// Every candidate stream failed to download
    #[error("All {attempts} candidate streams failed, last error: {last}")]
    StreamsExhausted {
        attempts: usize,
        #[source]
        last: Box<YtdrError>,
    },

    /// Wraps an error with the resolution step that produced it
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<YtdrError>,
    },
}

impl YtdrError {
    /// Wraps `self` with the resolution step that produced it
    pub fn at(self, stage: Stage) -> Self {
        YtdrError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, unwrapping stage and exhaustion wrappers
    pub fn root(&self) -> &YtdrError {
        match self {
            YtdrError::Stage { source, .. } => source.root(),
            YtdrError::StreamsExhausted { last, .. } => last.root(),
            other => other,
        }
    }

    /// Returns the resolution step, if the error was wrapped with one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            YtdrError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl Serialize for YtdrError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for ytdr operations
pub type Result<T> = std::result::Result<T, YtdrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_identifier() {
        let error = YtdrError::InvalidIdentifier("too short".to_string());
        assert_eq!(error.to_string(), "Invalid video identifier: too short");
    }

    #[test]
    fn test_error_display_upstream_failure() {
        let error = YtdrError::UpstreamFailure("private video".to_string());
        assert_eq!(error.to_string(), "Server reported failure: private video");
    }

    #[test]
    fn test_error_display_upstream_status() {
        let error = YtdrError::UpstreamStatus {
            status: 404,
            url: "https://example.com/x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected HTTP status 404 from https://example.com/x"
        );
    }

    #[test]
    fn test_error_display_empty_stream_list() {
        assert_eq!(YtdrError::EmptyStreamList.to_string(), "Empty stream list");
    }

    #[test]
    fn test_stage_wrapping_names_the_step() {
        let error = YtdrError::MissingStatus.at(Stage::Parsing);
        assert_eq!(
            error.to_string(),
            "parsing failed: No response status found in the server's answer"
        );
        assert_eq!(error.stage(), Some(Stage::Parsing));
        assert!(matches!(error.root(), YtdrError::MissingStatus));
    }

    #[test]
    fn test_root_unwraps_exhaustion() {
        let error = YtdrError::StreamsExhausted {
            attempts: 2,
            last: Box::new(YtdrError::Download("connection reset".to_string())),
        };
        assert!(error.to_string().starts_with("All 2 candidate streams failed"));
        assert!(matches!(error.root(), YtdrError::Download(_)));
        assert_eq!(error.stage(), None);
    }

    #[test]
    fn test_error_serialize() {
        let error = YtdrError::EmptyStreamList;
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Empty stream list\"");
    }

    #[test]
    fn test_error_serialize_with_message() {
        let error = YtdrError::Unplayable("embedding disabled".to_string());
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Cannot play back or download video: embedding disabled\"");
    }
}
