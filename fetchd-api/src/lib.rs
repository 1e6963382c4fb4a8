//! Async client for the fetchd download engine's HTTP API.
//!
//! The engine resolves video page URLs into downloadable formats, runs
//! one download at a time and keeps the finished files. This crate
//! wraps its REST surface in typed calls and resilient wire structs.
//!
//! # Example
//!
//! ```no_run
//! use fetchd_api::FetchdClient;
//!
//! #[tokio::main]
//! async fn main() -> fetchd_api::Result<()> {
//!     let client = FetchdClient::new("http://127.0.0.1:5000/api")?;
//!
//!     // Inspect a video before committing to a download
//!     let info = client.video_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     println!("Title: {} ({} formats)", info.title, info.formats.len());
//!
//!     // Kick off a download and watch it
//!     client.start_download(&info.url, "my_video", None).await?;
//!     let status = client.download_status().await?;
//!     println!("{}% {}", status.percent(), status.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
pub mod error;
pub mod types;

pub use client::{FetchdClient, FileDownload, WordKind};
pub use error::{Error, Result};
pub use types::{DownloadEntry, DownloadState, DownloadStatus, VideoFormat, VideoInfo};
