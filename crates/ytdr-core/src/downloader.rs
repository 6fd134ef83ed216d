//! Main downloader API for YouTube
//!
//! Provides the high-level API combining the HTTP client, the video info
//! parser, stream selection and the download engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Instrument, info, info_span, warn};

use crate::client::{ClientConfig, YoutubeClient};
use crate::download::download_to_file;
use crate::error::{Result, Stage, YtdrError};
use crate::filename::stream_file_name;
use crate::parser::{CipherResolver, SignatureCipherResolver, parse_video_info};
use crate::selector::download_order;
use crate::types::{Progress, Stream, VideoSession};
use crate::url::extract_video_id;

/// Main downloader API for YouTube
///
/// Resolves user input into a [`VideoSession`] and downloads one of its
/// streams, trying the next stream when an attempt fails.
pub struct YoutubeDownloader {
    client: YoutubeClient,
    resolver: Arc<dyn CipherResolver>,
    output_dir: Option<PathBuf>,
}

impl YoutubeDownloader {
    /// Create a new downloader with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new downloader with custom client configuration
    ///
    /// # Errors
    /// - `InvalidProxy` if the configured proxy cannot be used
    /// - `Transport` if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = YoutubeClient::with_config(&config)?;
        Ok(Self::with_client(client, config.output_dir))
    }

    /// Create a downloader around an existing client
    pub fn with_client(client: YoutubeClient, output_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            resolver: Arc::new(SignatureCipherResolver::new()),
            output_dir,
        }
    }

    /// Replace the resolver used for ciphered stream URLs
    pub fn with_cipher_resolver(mut self, resolver: Arc<dyn CipherResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve a URL or ID into its stream menu
    ///
    /// # Arguments
    /// * `input` - Bare video ID or watch/embed/short URL
    ///
    /// # Errors
    /// Every error is wrapped in [`YtdrError::Stage`] naming the step that
    /// failed; use [`YtdrError::root`] to inspect the cause.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> ytdr_core::Result<()> {
    /// use ytdr_core::YoutubeDownloader;
    /// let downloader = YoutubeDownloader::new()?;
    /// let session = downloader.decode_url("https://youtu.be/dQw4w9WgXcQ").await?;
    /// for stream in session.streams() {
    ///     println!("{} {}", stream.quality, stream.mime_type);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn decode_url(&self, input: &str) -> Result<VideoSession> {
        let video_id = extract_video_id(input).map_err(|e| e.at(Stage::IdentifierLookup))?;

        let span = info_span!("session", video_id = %video_id);
        async {
            let video_info = self
                .client
                .fetch_video_info(&video_id)
                .await
                .map_err(|e| e.at(Stage::MetadataRetrieval))?;

            let streams = parse_video_info(&video_info, self.resolver.as_ref())
                .map_err(|e| e.at(Stage::Parsing))?;
            info!("Resolved {} streams", streams.len());

            Ok::<_, YtdrError>(VideoSession::new(video_id.clone(), video_info, streams))
        }
        .instrument(span)
        .await
    }

    /// Download the first stream that succeeds, in server order
    ///
    /// # Errors
    /// - `EmptyStreamList` if the session has no streams
    /// - `StreamsExhausted` carrying the last error once every stream failed
    pub async fn start_download(
        &self,
        session: &VideoSession,
        destination: &Path,
        progress: &mpsc::Sender<Progress>,
    ) -> Result<()> {
        self.download_candidates(session, None, |_| destination.to_path_buf(), progress)
            .await
            .map(|_| ())
    }

    /// Download preferring streams of `quality`, falling back to the others
    ///
    /// # Errors
    /// Same as [`YoutubeDownloader::start_download`]
    pub async fn start_download_with_quality(
        &self,
        session: &VideoSession,
        destination: &Path,
        quality: &str,
        progress: &mpsc::Sender<Progress>,
    ) -> Result<()> {
        self.download_candidates(
            session,
            Some(quality),
            |_| destination.to_path_buf(),
            progress,
        )
        .await
        .map(|_| ())
    }

    /// Download into the output folder, naming the file after the title
    ///
    /// The extension follows each attempted stream's MIME type. Streams of
    /// `quality` are tried first when one is given.
    ///
    /// # Returns
    /// Path of the written file
    ///
    /// # Errors
    /// - `Filesystem` if no output folder is configured and the home
    ///   directory is unknown
    /// - otherwise as [`YoutubeDownloader::start_download`]
    pub async fn start_download_file(
        &self,
        session: &VideoSession,
        quality: Option<&str>,
        progress: &mpsc::Sender<Progress>,
    ) -> Result<PathBuf> {
        let output_dir = self.output_dir()?;
        self.download_candidates(
            session,
            quality,
            |stream| {
                output_dir.join(stream_file_name(
                    &stream.title,
                    &stream.mime_type,
                    session.video_id(),
                ))
            },
            progress,
        )
        .await
    }

    /// Folder used by [`YoutubeDownloader::start_download_file`]
    pub fn output_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join("Movies").join("youtubedr"))
            .ok_or_else(|| {
                YtdrError::Filesystem(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "home directory not found",
                ))
            })
    }

    async fn download_candidates<F>(
        &self,
        session: &VideoSession,
        quality: Option<&str>,
        destination_for: F,
        progress: &mpsc::Sender<Progress>,
    ) -> Result<PathBuf>
    where
        F: Fn(&Stream) -> PathBuf,
    {
        let candidates = download_order(session.streams(), quality);
        if candidates.is_empty() {
            return Err(YtdrError::EmptyStreamList);
        }

        let span = info_span!("session", video_id = %session.video_id());
        async {
            let mut last_error = None;
            let mut attempts = 0;

            for stream in candidates {
                let destination = destination_for(stream);
                info!("Download url={}", stream.url);
                info!("Download to file={}", destination.display());
                attempts += 1;

                match download_to_file(&self.client, &stream.url, &destination, progress).await {
                    Ok(_) => return Ok(destination),
                    Err(e) => {
                        warn!("Stream '{}' failed, trying next: {}", stream.quality, e);
                        last_error = Some(e);
                    }
                }
            }

            Err(YtdrError::StreamsExhausted {
                attempts,
                last: Box::new(last_error.unwrap_or(YtdrError::EmptyStreamList)),
            })
        }
        .instrument(span)
        .await
    }
}
