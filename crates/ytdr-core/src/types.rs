//! Core data types for ytdr
//!
//! Contains the main data structures used throughout the library.

use serde::{Deserialize, Serialize};

/// One downloadable media variant of a video
///
/// `url` is always directly fetchable: ciphered formats are resolved
/// before a `Stream` is built. All fields implement Serialize and
/// Deserialize for Tauri compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Platform quality label (e.g., "hd720", "medium")
    pub quality: String,

    /// MIME type with codecs (e.g., "video/mp4; codecs=\"avc1.64001F, mp4a.40.2\"")
    #[serde(rename = "type")]
    pub mime_type: String,

    /// Directly fetchable media URL
    pub url: String,

    /// Video title, empty when the server omits it
    pub title: String,

    /// Channel name, empty when the server omits it
    pub author: String,
}

/// Result of resolving one video: its ID, the raw info document and the
/// stream menu in server order
#[derive(Debug, Clone)]
pub struct VideoSession {
    video_id: String,
    video_info: String,
    streams: Vec<Stream>,
}

impl VideoSession {
    pub(crate) fn new(video_id: String, video_info: String, streams: Vec<Stream>) -> Self {
        Self {
            video_id,
            video_info,
            streams,
        }
    }

    /// The canonical 11-character video ID
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// The raw `get_video_info` body the streams were decoded from
    pub fn video_info(&self) -> &str {
        &self.video_info
    }

    /// Streams in the order the server listed them
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Title shared by every stream, empty if unknown
    pub fn title(&self) -> &str {
        self.streams.first().map(|s| s.title.as_str()).unwrap_or_default()
    }
}

/// Event sent on the progress channel during a download
///
/// `Percent` levels are strictly increasing within one attempt and never
/// exceed 100. Every attempt ends with exactly one terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Progress {
    /// Integer percentage checkpoint
    Percent(u8),
    /// Body fully written; carries the number of bytes written
    Completed(u64),
    /// Attempt failed; the destination may be partially written
    Aborted,
}

impl Progress {
    /// Whether this event ends the attempt
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Progress::Percent(_))
    }
}
