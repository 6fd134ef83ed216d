//! Stream selection by quality
//!
//! Quality is a soft preference: when nothing matches, the first stream
//! in server order is used instead.

use crate::error::{Result, YtdrError};
use crate::types::Stream;

/// Picks one stream, preferring an exact quality label
///
/// # Arguments
/// * `streams` - Streams in server order
/// * `quality` - Optional label such as "hd720" (case-sensitive)
///
/// # Errors
/// Returns `EmptyStreamList` if `streams` is empty
pub fn select_stream<'a>(streams: &'a [Stream], quality: Option<&str>) -> Result<&'a Stream> {
    let first = streams.first().ok_or(YtdrError::EmptyStreamList)?;

    let preferred = quality.and_then(|q| streams.iter().find(|s| s.quality == q));
    Ok(preferred.unwrap_or(first))
}

/// Orders streams for download attempts
///
/// Streams matching `quality` come first, then the others; both groups
/// keep server order. The first entry is always what [`select_stream`]
/// returns.
pub fn download_order<'a>(streams: &'a [Stream], quality: Option<&str>) -> Vec<&'a Stream> {
    let Some(quality) = quality else {
        return streams.iter().collect();
    };

    let (mut matching, others): (Vec<&Stream>, Vec<&Stream>) =
        streams.iter().partition(|s| s.quality == quality);
    matching.extend(others);
    matching
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stream(quality: &str, url: &str) -> Stream {
        Stream {
            quality: quality.to_string(),
            mime_type: "video/mp4".to_string(),
            url: url.to_string(),
            title: String::new(),
            author: String::new(),
        }
    }

    fn menu() -> Vec<Stream> {
        vec![
            stream("medium", "https://example.com/1"),
            stream("hd720", "https://example.com/2"),
            stream("small", "https://example.com/3"),
            stream("hd720", "https://example.com/4"),
        ]
    }

    #[test]
    fn test_select_without_quality_takes_first() {
        let streams = menu();
        assert_eq!(select_stream(&streams, None).unwrap().url, "https://example.com/1");
    }

    #[test]
    fn test_select_first_matching_quality() {
        let streams = menu();
        assert_eq!(
            select_stream(&streams, Some("hd720")).unwrap().url,
            "https://example.com/2"
        );
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let streams = menu();
        assert_eq!(
            select_stream(&streams, Some("hd1080")).unwrap().url,
            "https://example.com/1"
        );
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let streams = menu();
        assert_eq!(
            select_stream(&streams, Some("HD720")).unwrap().url,
            "https://example.com/1"
        );
    }

    #[test]
    fn test_select_empty_list() {
        assert!(matches!(select_stream(&[], None), Err(YtdrError::EmptyStreamList)));
        assert!(matches!(
            select_stream(&[], Some("hd720")),
            Err(YtdrError::EmptyStreamList)
        ));
    }

    #[test]
    fn test_download_order_with_quality() {
        let streams = menu();
        let urls: Vec<&str> = download_order(&streams, Some("hd720"))
            .iter()
            .map(|s| s.url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/2",
                "https://example.com/4",
                "https://example.com/1",
                "https://example.com/3"
            ]
        );
    }

    #[test]
    fn test_download_order_without_quality() {
        let streams = menu();
        let order = download_order(&streams, None);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0].url, "https://example.com/1");
        assert_eq!(order[3].url, "https://example.com/4");
    }

    fn arb_streams() -> impl Strategy<Value = Vec<Stream>> {
        prop::collection::vec(
            prop::sample::select(vec!["small", "medium", "hd720", "hd1080"]),
            1..8,
        )
        .prop_map(|qualities| {
            qualities
                .iter()
                .enumerate()
                .map(|(i, q)| stream(q, &format!("https://example.com/{}", i)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_select_matches_or_falls_back(streams in arb_streams()) {
            let selected = select_stream(&streams, Some("hd720")).unwrap();
            match streams.iter().find(|s| s.quality == "hd720") {
                Some(expected) => prop_assert_eq!(selected, expected),
                None => prop_assert_eq!(selected, &streams[0]),
            }
        }

        #[test]
        fn prop_download_order_starts_with_selection(streams in arb_streams()) {
            let order = download_order(&streams, Some("hd720"));
            prop_assert_eq!(order.len(), streams.len());
            prop_assert_eq!(order[0], select_stream(&streams, Some("hd720")).unwrap());
        }
    }
}
