//! ytdr Core Library
//!
//! Provides async API for resolving YouTube videos into downloadable
//! streams and saving them to disk with progress reporting.
//!
//! # Overview
//!
//! This crate provides a complete download pipeline with:
//! - Video ID extraction from watch, embed and short URLs
//! - A video info decoder for the form-encoded/JSON response
//! - Pluggable cipher resolution for protected stream URLs
//! - Quality selection with fallback and per-stream retry on download
//! - Streaming download with integer percentage progress
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use ytdr_core::{Progress, YoutubeDownloader, Result, progress_channel};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let downloader = YoutubeDownloader::new()?;
//!
//!     // Resolve the stream menu
//!     let session = downloader
//!         .decode_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!
//!     // Drain progress on another task so the writer never waits
//!     let (tx, mut rx) = progress_channel();
//!     let printer = tokio::spawn(async move {
//!         while let Some(event) = rx.recv().await {
//!             if let Progress::Percent(level) = event {
//!                 println!("{}%", level);
//!             }
//!         }
//!     });
//!
//!     downloader
//!         .start_download_with_quality(&session, Path::new("video.mp4"), "hd720", &tx)
//!         .await?;
//!     drop(tx);
//!     let _ = printer.await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Stream URLs
//!
//! Stream URLs carry an `expire` parameter and stop working after a few
//! hours. Resolve again instead of caching them.

mod client;
pub mod download;
mod downloader;
mod error;
pub mod filename;
pub mod parser;
pub mod selector;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, YoutubeClient};

// Re-export error types
pub use error::{Result, Stage, YtdrError};

// Re-export parser functions
pub use parser::{CipherResolver, SignatureCipherResolver, parse_video_info};

// Re-export main downloader API
pub use downloader::YoutubeDownloader;

// Re-export download engine
pub use download::{PROGRESS_CHANNEL_CAPACITY, ProgressTracker, download_to_file, progress_channel};

// Re-export data types
pub use types::{Progress, Stream, VideoSession};

// Re-export helpers for convenience
pub use filename::sanitize_filename;
pub use selector::select_stream;
pub use crate::url::{build_video_info_url, extract_video_id};
