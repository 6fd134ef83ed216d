//! Tauri commands for the ytdr downloader
//!
//! This module contains all Tauri command implementations.

use std::path::PathBuf;

use tauri::{AppHandle, Emitter, Runtime, State};
use tokio::sync::mpsc;
use ytdr_core::{
    Progress, Stream, VideoSession, YoutubeDownloader, progress_channel, sanitize_filename,
};

use crate::{DownloaderState, PROGRESS_EVENT};

/// Resolve a YouTube URL or ID into its streams
///
/// # Arguments
/// * `state` - Managed DownloaderState from Tauri
/// * `input` - Bare video ID or watch/embed/short URL
///
/// # Returns
/// Streams in server order
///
/// # Errors
/// Returns error message as String naming the step that failed
#[tauri::command]
pub async fn resolve_video(
    state: State<'_, DownloaderState>,
    input: String,
) -> Result<Vec<Stream>, String> {
    let session = state
        .downloader
        .decode_url(&input)
        .await
        .map_err(|e| e.to_string())?;
    Ok(session.streams().to_vec())
}

/// Resolve and download a video, emitting progress events
///
/// Progress is forwarded to the frontend as `ytdr://progress` events.
///
/// # Arguments
/// * `app` - Handle used to emit progress events
/// * `state` - Managed DownloaderState from Tauri
/// * `input` - Bare video ID or watch/embed/short URL
/// * `destination` - Output file path; empty to use the output folder
///   and a name derived from the title
/// * `quality` - Optional preferred quality label (e.g., "hd720")
///
/// # Returns
/// Path of the written file
///
/// # Errors
/// Returns error message as String if resolution or every download attempt fails
#[tauri::command]
pub async fn download_video<R: Runtime>(
    app: AppHandle<R>,
    state: State<'_, DownloaderState>,
    input: String,
    destination: String,
    quality: Option<String>,
) -> Result<String, String> {
    let downloader = state.downloader.clone();
    let session = downloader
        .decode_url(&input)
        .await
        .map_err(|e| e.to_string())?;

    let (tx, mut rx) = progress_channel();
    let forwarder = tauri::async_runtime::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(e) = app.emit(PROGRESS_EVENT, event) {
                tracing::warn!("failed to emit progress event: {}", e);
            }
        }
    });

    let result =
        download_session(&downloader, &session, &destination, quality.as_deref(), &tx).await;

    // Closing the sender ends the forwarder loop
    drop(tx);
    let _ = forwarder.await;

    result
        .map(|path| path.display().to_string())
        .map_err(|e| e.to_string())
}

/// Pick the download flavour for a command request
///
/// An empty `destination` saves into the output folder under the title;
/// `quality` is honored either way.
async fn download_session(
    downloader: &YoutubeDownloader,
    session: &VideoSession,
    destination: &str,
    quality: Option<&str>,
    progress: &mpsc::Sender<Progress>,
) -> ytdr_core::Result<PathBuf> {
    if destination.trim().is_empty() {
        return downloader.start_download_file(session, quality, progress).await;
    }

    let destination = PathBuf::from(destination);
    match quality {
        Some(quality) => downloader
            .start_download_with_quality(session, &destination, quality, progress)
            .await?,
        None => downloader.start_download(session, &destination, progress).await?,
    }
    Ok(destination)
}

/// Strip characters that are illegal in file names
///
/// # Arguments
/// * `name` - Candidate file name, typically a video title
///
/// # Returns
/// The sanitized name with runs of spaces collapsed
#[tauri::command]
pub fn sanitize_file_name(name: String) -> String {
    sanitize_filename(&name)
}
