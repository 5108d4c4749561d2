//! imgscrape Core Library
//!
//! This crate downloads a requested number of images matching a text query
//! from the Google Custom Search JSON API, page by page.
//!
//! # Features
//! - Paginated image search with per-page batch truncation
//! - Ordered, atomically written downloads named `<query>_<ordinal>.jpg`
//! - Rate-limited search client
//! - Cancellation between pages and progress callbacks
//! - JSON credential store for front ends

pub mod client;
pub mod controller;
pub mod credentials;
pub mod downloader;
pub mod error;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientConfig, PageFetcher, RateLimiter, SearchClient};
pub use controller::{CancelHandle, ScrapeController};
pub use credentials::CredentialStore;
pub use downloader::{artifact_name, Downloader, FsDownloader};
pub use error::{DownloadError, Result, ScrapeError};
pub use types::{
    Credentials, DownloadTask, Progress, ResultItem, RunReport, RunState, RunStatus,
    SearchRequest, SearchResultPage,
};
