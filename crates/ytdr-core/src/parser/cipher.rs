//! Cipher resolution for protected stream URLs
//!
//! Formats without a plain `url` carry a `cipher` (or `signatureCipher`)
//! token instead. The token is a form-encoded envelope:
//!
//! ```text
//! s=<scrambled signature>&sp=sig&url=https%3A%2F%2Fr1.googlevideo.com%2Fvideoplayback%3F...
//! ```
//!
//! Unscrambling `s` depends on the current player script, so the
//! transform itself is supplied by the caller.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, YtdrError};

/// Turns an opaque cipher token into a directly fetchable URL
pub trait CipherResolver: Send + Sync {
    /// Resolve `cipher` into a fully qualified URL
    ///
    /// # Errors
    /// Returns `CipherResolutionFailed` if the token cannot be resolved
    fn resolve(&self, cipher: &str) -> Result<String>;
}

/// Signature transform taken from the player script
pub type SignatureTransform = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolver for the `s`/`sp`/`url` envelope
///
/// Without a transform it only handles envelopes whose signature is not
/// scrambled, and fails on the rest.
#[derive(Clone, Default)]
pub struct SignatureCipherResolver {
    transform: Option<SignatureTransform>,
}

impl SignatureCipherResolver {
    /// Resolver without a signature transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that unscrambles signatures with `transform`
    pub fn with_transform<F>(transform: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            transform: Some(Arc::new(transform)),
        }
    }
}

impl fmt::Debug for SignatureCipherResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureCipherResolver")
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

impl CipherResolver for SignatureCipherResolver {
    fn resolve(&self, cipher: &str) -> Result<String> {
        let mut url = None;
        let mut signature = None;
        let mut signature_param = None;

        for (key, value) in ::url::form_urlencoded::parse(cipher.as_bytes()) {
            match key.as_ref() {
                "url" => url = Some(value.into_owned()),
                "s" => signature = Some(value.into_owned()),
                "sp" => signature_param = Some(value.into_owned()),
                _ => {}
            }
        }

        let url = url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| YtdrError::CipherResolutionFailed("cipher has no url".to_string()))?;
        ensure_fetchable(&url)?;

        let Some(signature) = signature else {
            return Ok(url);
        };

        let transform = self.transform.as_ref().ok_or_else(|| {
            YtdrError::CipherResolutionFailed(
                "signature is scrambled and no signature transform is configured".to_string(),
            )
        })?;
        let deciphered = transform(&signature).ok_or_else(|| {
            YtdrError::CipherResolutionFailed("signature transform rejected the signature".to_string())
        })?;

        let param = signature_param
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "signature".to_string());
        let separator = if url.contains('?') { '&' } else { '?' };

        Ok(format!(
            "{}{}{}={}",
            url,
            separator,
            param,
            urlencoding::encode(&deciphered)
        ))
    }
}

/// Rejects anything that is not an absolute http(s) URL
fn ensure_fetchable(url: &str) -> Result<()> {
    let parsed = ::url::Url::parse(url)
        .map_err(|e| YtdrError::CipherResolutionFailed(format!("cipher url '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        scheme => Err(YtdrError::CipherResolutionFailed(format!(
            "cipher url '{}' is not fetchable over {}",
            url, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA_URL: &str = "https://r1.googlevideo.com/videoplayback?itag=18&expire=1";

    fn envelope(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[test]
    fn test_unscrambled_envelope_returns_url() {
        let resolver = SignatureCipherResolver::new();
        let url = resolver.resolve(&envelope(&[("url", MEDIA_URL)])).unwrap();
        assert_eq!(url, MEDIA_URL);
    }

    #[test]
    fn test_scrambled_signature_uses_transform() {
        let resolver = SignatureCipherResolver::with_transform(|s| Some(s.chars().rev().collect()));
        let cipher = envelope(&[("s", "CBA"), ("sp", "sig"), ("url", MEDIA_URL)]);
        let url = resolver.resolve(&cipher).unwrap();
        assert_eq!(url, format!("{}&sig=ABC", MEDIA_URL));
    }

    #[test]
    fn test_default_signature_param() {
        let resolver = SignatureCipherResolver::with_transform(|s| Some(s.to_string()));
        let cipher = envelope(&[("s", "XYZ"), ("url", "https://r1.googlevideo.com/videoplayback")]);
        let url = resolver.resolve(&cipher).unwrap();
        assert_eq!(url, "https://r1.googlevideo.com/videoplayback?signature=XYZ");
    }

    #[test]
    fn test_scrambled_signature_without_transform_fails() {
        let resolver = SignatureCipherResolver::new();
        let cipher = envelope(&[("s", "CBA"), ("url", MEDIA_URL)]);
        assert!(matches!(
            resolver.resolve(&cipher),
            Err(YtdrError::CipherResolutionFailed(_))
        ));
    }

    #[test]
    fn test_transform_rejection_fails() {
        let resolver = SignatureCipherResolver::with_transform(|_| None);
        let cipher = envelope(&[("s", "CBA"), ("url", MEDIA_URL)]);
        assert!(matches!(
            resolver.resolve(&cipher),
            Err(YtdrError::CipherResolutionFailed(_))
        ));
    }

    #[test]
    fn test_missing_url_fails() {
        let resolver = SignatureCipherResolver::new();
        match resolver.resolve("s=abc&sp=sig") {
            Err(YtdrError::CipherResolutionFailed(msg)) => assert!(msg.contains("no url")),
            other => panic!("Expected CipherResolutionFailed error, got {:?}", other),
        }
        assert!(resolver.resolve("").is_err());
    }

    #[test]
    fn test_debug_hides_transform() {
        let resolver = SignatureCipherResolver::with_transform(|s| Some(s.to_string()));
        assert_eq!(
            format!("{:?}", resolver),
            "SignatureCipherResolver { has_transform: true }"
        );
    }

    #[test]
    fn test_relative_url_fails() {
        let resolver = SignatureCipherResolver::new();
        assert!(matches!(
            resolver.resolve("url=not-a-url"),
            Err(YtdrError::CipherResolutionFailed(_))
        ));
    }

    #[test]
    fn test_non_http_url_fails() {
        let resolver = SignatureCipherResolver::with_transform(|s| Some(s.to_string()));
        for target in ["ftp://example.com/video", "file:///etc/passwd", "data:text/plain,hi"] {
            let cipher = envelope(&[("s", "ABC"), ("url", target)]);
            match resolver.resolve(&cipher) {
                Err(YtdrError::CipherResolutionFailed(msg)) => assert!(msg.contains("not fetchable")),
                other => panic!("Expected CipherResolutionFailed error, got {:?}", other),
            }
        }
    }
}
