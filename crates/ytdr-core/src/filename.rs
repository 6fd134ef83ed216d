//! File name helpers
//!
//! Builds safe output file names from video titles and stream MIME types.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters rejected by at least one of Windows, macOS and Linux
static ILLEGAL_CHARS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"[:/<>"\\|?*]"#).ok());

static SPACE_RUNS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(" {2,}").ok());

/// Extension used when the MIME type is unknown
const FALLBACK_EXTENSION: &str = ".mov";

/// Removes characters illegal in file names and collapses runs of spaces
///
/// Applying it twice gives the same result as applying it once.
///
/// # Example
/// ```
/// use ytdr_core::filename::sanitize_filename;
/// assert_eq!(sanitize_filename("AC/DC: Live  at <River> Plate?"), "ACDC Live at River Plate");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let mut name = name.to_string();

    if let Some(re) = ILLEGAL_CHARS.as_ref() {
        name = re.replace_all(&name, "").into_owned();
    }
    if let Some(re) = SPACE_RUNS.as_ref() {
        name = re.replace_all(&name, " ").into_owned();
    }

    name
}

/// Maps a stream MIME type (codecs suffix allowed) to a file extension
///
/// # Example
/// ```
/// use ytdr_core::filename::extension_for_mime_type;
/// assert_eq!(extension_for_mime_type("video/mp4; codecs=\"avc1.42001E\""), ".mp4");
/// assert_eq!(extension_for_mime_type("application/octet-stream"), ".mov");
/// ```
pub fn extension_for_mime_type(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "video/mp4" | "audio/mp4" => ".mp4",
        "video/webm" | "audio/webm" => ".webm",
        "video/3gpp" => ".3gp",
        "video/x-flv" => ".flv",
        "video/quicktime" => ".mov",
        _ => FALLBACK_EXTENSION,
    }
}

/// Builds the output file name for a stream: sanitized title plus extension
///
/// Falls back to the video ID when the title sanitizes to nothing.
pub fn stream_file_name(title: &str, mime_type: &str, video_id: &str) -> String {
    let mut base = sanitize_filename(title).trim().to_string();
    if base.is_empty() {
        base = video_id.to_string();
    }
    format!("{}{}", base, extension_for_mime_type(mime_type))
}
