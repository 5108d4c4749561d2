//! Data types for imgscrape
//!
//! This module contains the core data structures used throughout the library.
//! All types implement Serialize and Deserialize for JSON compatibility with Tauri.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Search API credentials
///
/// Serialized as `{"apiKey": .., "searchEngineId": ..}`, the same shape
/// front ends persist between runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Google API key
    pub api_key: String,
    /// Programmable Search Engine identifier (`cx`)
    pub search_engine_id: String,
}

impl Credentials {
    /// Create credentials from a key and engine id
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }

    /// Both fields carry something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.search_engine_id.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// Parameters of a single page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Search text
    pub query: String,
    /// 1-based offset of the first result on the page
    pub start_index: u32,
    /// Credentials forwarded to the search API
    pub credentials: Credentials,
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultPage {
    /// Result items in page order; absent or `null` means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<ResultItem>,
}

impl SearchResultPage {
    /// Create a page from its items
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self { items }
    }
}

/// A single search result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultItem {
    /// Locator of the image, if the result carries one
    #[serde(default)]
    pub link: Option<String>,
    /// Title of the page the image was found on
    #[serde(default)]
    pub title: Option<String>,
    /// MIME type reported by the search API
    #[serde(default)]
    pub mime: Option<String>,
}

impl ResultItem {
    /// Result pointing at `link`
    pub fn with_link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Self::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ResultItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ResultItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One scheduled image download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    /// URI of the image
    pub locator: String,
    /// 0-based position among all items downloaded in the run
    pub sequence_index: u32,
}

impl DownloadTask {
    /// Create a task
    pub fn new(locator: impl Into<String>, sequence_index: u32) -> Self {
        Self {
            locator: locator.into(),
            sequence_index,
        }
    }

    /// 1-based position used in the artifact name
    pub fn ordinal(&self) -> u32 {
        self.sequence_index + 1
    }
}

/// Progress counters of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Number of images the caller asked for
    pub total_requested: u32,
    /// Number of images persisted by completed batches
    pub total_downloaded: u32,
    /// 1-based offset of the next page to fetch
    pub next_start_index: u32,
}

impl RunState {
    /// Fresh state for a run asking for `total_requested` images
    pub fn new(total_requested: u32) -> Self {
        Self {
            total_requested,
            total_downloaded: 0,
            next_start_index: 1,
        }
    }

    /// Images still needed
    pub fn remaining(&self) -> u32 {
        self.total_requested - self.total_downloaded
    }

    /// Requested count has been reached
    pub fn is_satisfied(&self) -> bool {
        self.total_downloaded >= self.total_requested
    }

    /// Account for a fully downloaded batch of `consumed` items.
    ///
    /// The cursor advances by the number of consumed items, not by the size
    /// of the page they came from.
    pub fn record_batch(&mut self, consumed: u32) {
        debug_assert!(consumed <= self.remaining());
        self.total_downloaded += consumed;
        self.next_start_index += consumed;
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Lifecycle of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// No run started yet
    Idle,
    /// Pages are being fetched and downloaded
    Running,
    /// Requested count reached
    Completed,
    /// A page returned no usable results
    Exhausted,
    /// Stopped on request between pages
    Cancelled,
    /// A fetch or download failed
    Failed,
}

impl RunStatus {
    /// The run has ended
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Idle | RunStatus::Running)
    }
}

/// Outcome of a run that ended without error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Terminal status (`Completed`, `Exhausted` or `Cancelled`)
    pub status: RunStatus,
    /// Final counters
    pub state: RunState,
    /// Persisted files in download order
    pub artifacts: Vec<PathBuf>,
}

/// Emitted after each persisted image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 1-based position of the image in the run
    pub ordinal: u32,
    /// Number of images the caller asked for
    pub total_requested: u32,
    /// Where the image was written
    pub path: PathBuf,
}
