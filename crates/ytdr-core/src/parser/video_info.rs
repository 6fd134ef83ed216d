//! Video info parser for YouTube
//!
//! Decodes the `get_video_info` body: a form-encoded document whose
//! `player_response` value is itself a JSON document listing the formats.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::{Result, YtdrError};
use crate::parser::cipher::CipherResolver;
use crate::types::Stream;

// ---------------------------------------------------------------------------
// player_response JSON layer
// ---------------------------------------------------------------------------

/// Decodes `null` the same way as an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed view of the `player_response` document
///
/// Every field is optional on the wire; missing or `null` values decode to
/// empty defaults instead of failing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub playability_status: PlayabilityStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub streaming_data: StreamingData,
    #[serde(deserialize_with = "null_as_default")]
    pub video_details: VideoDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayabilityStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

impl PlayabilityStatus {
    pub fn is_unplayable(&self) -> bool {
        self.status == "UNPLAYABLE"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamingData {
    #[serde(deserialize_with = "null_as_default")]
    pub formats: Vec<Format>,
}

/// One entry of `streamingData.formats`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Format {
    pub itag: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub mime_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quality: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cipher: String,
    #[serde(deserialize_with = "null_as_default")]
    pub signature_cipher: String,
}

impl Format {
    /// The cipher token, whichever of the two keys carries it
    fn cipher_token(&self) -> Option<&str> {
        [self.cipher.as_str(), self.signature_cipher.as_str()]
            .into_iter()
            .find(|c| !c.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoDetails {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parses a form-encoded body into a multimap, keeping repeated keys
///
/// # Example
/// ```
/// use ytdr_core::parser::video_info::parse_query;
/// let map = parse_query("a=1&b=two+words&a=3");
/// assert_eq!(map["a"], vec!["1", "3"]);
/// assert_eq!(map["b"], vec!["two words"]);
/// ```
pub fn parse_query(raw: &str) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in ::url::form_urlencoded::parse(raw.trim().as_bytes()) {
        map.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    map
}

/// Decodes a video info body into the stream menu
///
/// # Arguments
/// * `raw` - Body returned by the video info endpoint
/// * `resolver` - Used for formats that only carry a cipher token
///
/// # Returns
/// Streams in server order, each with a directly fetchable URL
///
/// # Errors
/// - `MissingStatus` - no `status` key
/// - `UpstreamFailure` - `status=fail`
/// - `UnexpectedStatus` - any other non-`ok` status
/// - `MissingStreamMap` - no `player_response` key
/// - `MalformedPlayerResponse` - `player_response` is not valid JSON
/// - `Unplayable` - the video cannot be played back
/// - `CipherResolutionFailed` - a ciphered format could not be resolved
/// - `EmptyStreamList` - no usable format
pub fn parse_video_info(raw: &str, resolver: &dyn CipherResolver) -> Result<Vec<Stream>> {
    let answer = parse_query(raw);

    check_status(&answer)?;

    let player_response = first_value(&answer, "player_response").ok_or(YtdrError::MissingStreamMap)?;
    let player_response: PlayerResponse = serde_json::from_str(player_response)?;

    if player_response.playability_status.is_unplayable() {
        return Err(YtdrError::Unplayable(
            player_response.playability_status.reason,
        ));
    }

    let PlayerResponse {
        streaming_data,
        video_details,
        ..
    } = player_response;

    let mut streams = Vec::with_capacity(streaming_data.formats.len());
    for (position, format) in streaming_data.formats.into_iter().enumerate() {
        if format.mime_type.is_empty() {
            warn!(
                "An error occurred while decoding one of the video's stream's information: stream {}",
                position
            );
            continue;
        }

        let url = if format.url.is_empty() {
            let cipher = format.cipher_token().ok_or_else(|| {
                YtdrError::CipherResolutionFailed(format!(
                    "stream {} has neither a url nor a cipher",
                    position
                ))
            })?;
            resolver.resolve(cipher)?
        } else {
            format.url
        };

        debug!(
            "Title: {} Author: {} Stream found: quality '{}', format '{}'",
            video_details.title, video_details.author, format.quality, format.mime_type
        );

        streams.push(Stream {
            quality: format.quality,
            mime_type: format.mime_type,
            url,
            title: video_details.title.clone(),
            author: video_details.author.clone(),
        });
    }

    if streams.is_empty() {
        return Err(YtdrError::EmptyStreamList);
    }

    Ok(streams)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn first_value<'a>(answer: &'a HashMap<String, Vec<String>>, key: &str) -> Option<&'a str> {
    answer.get(key).and_then(|v| v.first()).map(String::as_str)
}

/// Validates the top-level `status` key
fn check_status(answer: &HashMap<String, Vec<String>>) -> Result<()> {
    let status = first_value(answer, "status").ok_or(YtdrError::MissingStatus)?;
    match status {
        "ok" => Ok(()),
        "fail" => {
            let reason = first_value(answer, "reason")
                .map(str::to_string)
                .unwrap_or_else(|| "no reason given".to_string());
            Err(YtdrError::UpstreamFailure(reason))
        }
        other => Err(YtdrError::UnexpectedStatus(other.to_string())),
    }
}
