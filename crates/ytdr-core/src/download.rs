//! Media download with progress reporting
//!
//! Streams a response body to disk and reports integer percentage levels
//! on a bounded channel. The writer waits when the channel is full, so
//! the receiver should be drained from another task.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::YoutubeClient;
use crate::error::{Result, YtdrError};
use crate::types::Progress;

/// Capacity of the channel returned by [`progress_channel`]
pub const PROGRESS_CHANNEL_CAPACITY: usize = 128;

const MAX_LEVEL: u8 = 100;

/// Creates a bounded channel sized for one download
pub fn progress_channel() -> (mpsc::Sender<Progress>, mpsc::Receiver<Progress>) {
    mpsc::channel(PROGRESS_CHANNEL_CAPACITY)
}

/// Per-attempt byte counters and level bookkeeping
///
/// At most one level is reported per written chunk, even when a chunk
/// moves the percentage by several points.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    content_length: u64,
    total_written: u64,
    next_level: u8,
    last_reported: Option<u8>,
}

impl ProgressTracker {
    /// Tracker for a body of `content_length` bytes (0 = unknown)
    pub fn new(content_length: u64) -> Self {
        Self {
            content_length,
            total_written: 0,
            next_level: 0,
            last_reported: None,
        }
    }

    /// Bytes written so far
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Declared body length, 0 when unknown
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Records a written chunk and returns the level to report, if any
    ///
    /// Nothing is reported while the content length is unknown.
    pub fn record(&mut self, chunk_len: usize) -> Option<u8> {
        self.total_written += chunk_len as u64;

        if self.content_length == 0 || self.next_level > MAX_LEVEL {
            return None;
        }

        let percent = self.total_written.saturating_mul(100) / self.content_length;
        if percent >= u64::from(self.next_level) {
            let level = self.next_level;
            self.next_level += 1;
            self.last_reported = Some(level);
            return Some(level);
        }
        None
    }

    /// Returns the terminal level to report once the body is complete
    ///
    /// This is 100 unless 100 was already reported.
    pub fn finish(&mut self) -> Option<u8> {
        if self.last_reported == Some(MAX_LEVEL) {
            return None;
        }
        self.next_level = MAX_LEVEL + 1;
        self.last_reported = Some(MAX_LEVEL);
        Some(MAX_LEVEL)
    }
}

async fn report(progress: &mpsc::Sender<Progress>, event: Progress) {
    // A dropped receiver must not fail the download
    if progress.send(event).await.is_err() {
        debug!("progress receiver dropped, event {:?} discarded", event);
    }
}

/// Downloads `url` into `destination`, reporting progress
///
/// Missing parent directories are created and the destination is
/// truncated. On failure the partially written file is left in place.
///
/// # Errors
/// - `Transport` - connection failure
/// - `UpstreamStatus` - status other than 200
/// - `Filesystem` - directory or file creation failed
/// - `Download` - reading the body or writing the file failed midway
pub async fn download_to_file(
    client: &YoutubeClient,
    url: &str,
    destination: &Path,
    progress: &mpsc::Sender<Progress>,
) -> Result<u64> {
    let result = transfer(client, url, destination, progress).await;
    match &result {
        Ok(written) => report(progress, Progress::Completed(*written)).await,
        Err(e) => {
            warn!("download video err={}", e);
            report(progress, Progress::Aborted).await;
        }
    }
    result
}

async fn transfer(
    client: &YoutubeClient,
    url: &str,
    destination: &Path,
    progress: &mpsc::Sender<Progress>,
) -> Result<u64> {
    let response = client.get_media(url).await?;
    let mut tracker = ProgressTracker::new(response.content_length().unwrap_or(0));

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = File::create(destination).await?;

    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| YtdrError::Download(format!("reading body: {}", e)))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| YtdrError::Download(format!("writing {}: {}", destination.display(), e)))?;

        if let Some(level) = tracker.record(chunk.len()) {
            report(progress, Progress::Percent(level)).await;
        }
    }

    file.flush()
        .await
        .map_err(|e| YtdrError::Download(format!("flushing {}: {}", destination.display(), e)))?;

    if tracker.content_length() > 0 && tracker.total_written() < tracker.content_length() {
        return Err(YtdrError::Download(format!(
            "body ended early: {}/{} bytes",
            tracker.total_written(),
            tracker.content_length()
        )));
    }

    if let Some(level) = tracker.finish() {
        report(progress, Progress::Percent(level)).await;
    }

    Ok(tracker.total_written())
}
