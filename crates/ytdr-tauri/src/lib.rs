//! ytdr Tauri Integration
//!
//! Provides Tauri plugin for frontend integration with the ytdr downloader.
//!
//! # Usage
//!
//! Register the plugin in your Tauri application:
//!
//! ```ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(ytdr_tauri::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Then invoke commands from the frontend:
//!
//! ```javascript
//! import { invoke } from '@tauri-apps/api/core';
//! import { listen } from '@tauri-apps/api/event';
//!
//! // List streams
//! const streams = await invoke('plugin:ytdr|resolve_video', { input: 'https://youtu.be/dQw4w9WgXcQ' });
//!
//! // Download with progress
//! await listen('ytdr://progress', (event) => console.log(event.payload));
//! const path = await invoke('plugin:ytdr|download_video', {
//!   input: 'dQw4w9WgXcQ',
//!   destination: '',
//!   quality: 'hd720'
//! });
//! ```

use std::sync::Arc;

use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};
use ytdr_core::{ClientConfig, YoutubeDownloader};

mod commands;

/// Event name carrying [`ytdr_core::Progress`] payloads
pub const PROGRESS_EVENT: &str = "ytdr://progress";

/// Shared downloader for all Tauri commands
///
/// Every downloader method takes `&self`, so an `Arc` is enough for
/// concurrent commands.
pub struct DownloaderState {
    pub(crate) downloader: Arc<YoutubeDownloader>,
}

impl DownloaderState {
    /// Create a new DownloaderState with default configuration
    ///
    /// # Errors
    /// Returns error string if downloader initialization fails
    pub fn new() -> Result<Self, String> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new DownloaderState with custom configuration
    ///
    /// # Errors
    /// Returns error string if the proxy is invalid or the HTTP client
    /// cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self, String> {
        let downloader = YoutubeDownloader::with_config(config).map_err(|e| e.to_string())?;
        Ok(Self {
            downloader: Arc::new(downloader),
        })
    }
}

/// Initialize the ytdr plugin with default configuration
///
/// # Example
/// ```ignore
/// tauri::Builder::default()
///     .plugin(ytdr_tauri::init())
///     .run(tauri::generate_context!())
///     .expect("error while running tauri application");
/// ```
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    init_with_config(ClientConfig::default())
}

/// Initialize the ytdr plugin, e.g. with a SOCKS5 proxy
pub fn init_with_config<R: Runtime>(config: ClientConfig) -> TauriPlugin<R> {
    Builder::new("ytdr")
        .invoke_handler(tauri::generate_handler![
            commands::resolve_video,
            commands::download_video,
            commands::sanitize_file_name
        ])
        .setup(move |app, _api| {
            let state =
                DownloaderState::with_config(config.clone()).map_err(Box::<dyn std::error::Error>::from)?;
            app.manage(state);
            Ok(())
        })
        .build()
}

// Re-export types for convenience
pub use ytdr_core::{Progress, Stream};
