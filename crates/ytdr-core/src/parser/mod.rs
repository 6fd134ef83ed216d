//! Parsers for YouTube responses
//!
//! Contains the video info decoder and the cipher resolution it relies on.

pub mod cipher;
pub mod video_info;

pub use cipher::{CipherResolver, SignatureCipherResolver, SignatureTransform};
pub use video_info::{parse_query, parse_video_info};
