//! URL helper functions for YouTube
//!
//! Provides video ID extraction from user input and builders for the
//! video info request URL.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Result, YtdrError};

/// Default endpoint serving the form-encoded video info document
pub const VIDEO_INFO_ENDPOINT: &str = "https://youtube.com/get_video_info";

const EMBED_BASE_URL: &str = "https://youtube.googleapis.com/v/";

/// Characters that never appear in a valid video ID
const RESERVED_CHARS: &[char] = &['?', '&', '/', '<', '%', '='];

/// Characters that mark the input as a URL rather than a bare ID
const URL_MARKER_CHARS: &[char] = &['"', '?', '&', '/', '<', '%', '='];

/// Extraction patterns, from most to least specific
const ID_PATTERNS: [&str; 3] = [
    r#"(?:v|embed|watch\?v)(?:=|/)([^"&?/=%]{11})"#,
    r#"(?:=|/)([^"&?/=%]{11})"#,
    r#"([^"&?/=%]{11})"#,
];

static ID_REGEXES: Lazy<Vec<Regex>> =
    Lazy::new(|| ID_PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect());

/// Extracts the video ID from a bare ID or any YouTube URL shape
///
/// Inputs that look like URLs go through every pattern in order; each
/// pattern that matches replaces the working value with its capture, so
/// a later pattern runs against the result of an earlier one.
///
/// # Arguments
/// * `input` - Bare ID, watch URL, embed URL or youtu.be short URL
///
/// # Returns
/// The video ID (at least 10 characters, no reserved characters)
///
/// # Errors
/// Returns `InvalidIdentifier` if the result still contains a reserved
/// character or is shorter than 10 characters
///
/// # Example
/// ```
/// use ytdr_core::url::extract_video_id;
/// let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
/// assert_eq!(id, "dQw4w9WgXcQ");
/// ```
pub fn extract_video_id(input: &str) -> Result<String> {
    let mut video_id = input.to_string();

    if video_id.contains("youtu") || video_id.contains(URL_MARKER_CHARS) {
        for re in ID_REGEXES.iter() {
            if let Some(m) = re.captures(&video_id).and_then(|caps| caps.get(1)) {
                video_id = m.as_str().to_string();
            }
        }
    }

    debug!("Found video id: '{}'", video_id);

    if video_id.contains(RESERVED_CHARS) {
        return Err(YtdrError::InvalidIdentifier(format!(
            "invalid characters in video id '{}'",
            video_id
        )));
    }
    if video_id.len() < 10 {
        return Err(YtdrError::InvalidIdentifier(format!(
            "the video id must be at least 10 characters long, got '{}'",
            video_id
        )));
    }

    Ok(video_id)
}

/// Builds the embed URL passed as `eurl` to the video info endpoint
///
/// # Example
/// ```
/// use ytdr_core::url::build_embed_url;
/// assert_eq!(build_embed_url("dQw4w9WgXcQ"), "https://youtube.googleapis.com/v/dQw4w9WgXcQ");
/// ```
pub fn build_embed_url(video_id: &str) -> String {
    format!("{}{}", EMBED_BASE_URL, video_id)
}

/// Builds the video info request URL for an ID
///
/// # Arguments
/// * `endpoint` - Video info endpoint, normally [`VIDEO_INFO_ENDPOINT`]
/// * `video_id` - Extracted video ID
///
/// # Example
/// ```
/// use ytdr_core::url::{build_video_info_url, VIDEO_INFO_ENDPOINT};
/// let url = build_video_info_url(VIDEO_INFO_ENDPOINT, "dQw4w9WgXcQ");
/// assert_eq!(
///     url,
///     "https://youtube.com/get_video_info?video_id=dQw4w9WgXcQ&eurl=https%3A%2F%2Fyoutube.googleapis.com%2Fv%2FdQw4w9WgXcQ"
/// );
/// ```
pub fn build_video_info_url(endpoint: &str, video_id: &str) -> String {
    format!(
        "{}?video_id={}&eurl={}",
        endpoint,
        urlencoding::encode(video_id),
        urlencoding::encode(&build_embed_url(video_id))
    )
}
