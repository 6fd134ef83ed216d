//! Demo: resolve a video and download it with progress output
//!
//! Run with: RUST_LOG=ytdr_core=debug cargo run --example download -p ytdr-core -- <url-or-id> [quality]
//!
//! Set `YTDR_SOCKS5_PROXY=host:port` to route through a SOCKS5 proxy.

use ytdr_core::{ClientConfig, Progress, YoutubeDownloader, progress_channel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ytdr_core=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "dQw4w9WgXcQ".to_string());
    let quality = args.next();

    let config = ClientConfig {
        socks5_proxy: std::env::var("YTDR_SOCKS5_PROXY").ok(),
        ..ClientConfig::default()
    };
    let downloader = YoutubeDownloader::with_config(config)?;

    println!("Resolving '{}'...\n", input);
    let session = downloader.decode_url(&input).await?;

    println!("{} ({})", session.title(), session.video_id());
    for (i, stream) in session.streams().iter().enumerate() {
        println!("{}. {:<8} {}", i + 1, stream.quality, stream.mime_type);
    }
    println!();

    let (tx, mut rx) = progress_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                Progress::Percent(level) if level % 10 == 0 => println!("  {:>3}%", level),
                Progress::Percent(_) => {}
                Progress::Completed(bytes) => println!("✓ {} bytes written", bytes),
                Progress::Aborted => println!("✗ attempt failed, trying next stream"),
            }
        }
    });

    let result = downloader
        .start_download_file(&session, quality.as_deref(), &tx)
        .await;
    drop(tx);
    let _ = printer.await;

    match result {
        Ok(path) => println!("\nSaved to {}", path.display()),
        Err(e) => println!("\nDownload failed: {}", e),
    }

    Ok(())
}
