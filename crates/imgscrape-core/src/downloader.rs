//! Image downloader
//!
//! Fetches a single image and persists it under a name derived from the
//! search query and the image's ordinal in the run. Files are written to a
//! temporary path in the output directory first and renamed into place, so
//! a failed download never leaves a file under its final name.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::client::{build_http_client, ClientConfig};
use crate::error::{DownloadError, Result};
use crate::types::DownloadTask;

/// Sink for downloaded images
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `task.locator` and persist it for the run searching `query`.
    ///
    /// Returns the path of the persisted artifact.
    async fn download(
        &self,
        query: &str,
        task: &DownloadTask,
    ) -> std::result::Result<PathBuf, DownloadError>;
}

/// Longest query-derived stem, in bytes. Leaves room for `_<u32 ordinal>.jpg`
/// under the common 255-byte file name limit.
pub const MAX_STEM_BYTES: usize = 200;

/// Build the artifact file name for an image.
///
/// Every whitespace character of the query becomes `_`, as do path
/// separators and characters Windows refuses in file names. The stem is cut
/// to at most `MAX_STEM_BYTES` bytes on a character boundary; the ordinal
/// (`sequence_index + 1`) keeps truncated names unique.
///
/// # Examples
/// ```
/// use imgscrape_core::downloader::artifact_name;
///
/// assert_eq!(artifact_name("red panda", 0), "red_panda_1.jpg");
/// assert_eq!(artifact_name("a/b", 4), "a_b_5.jpg");
/// ```
pub fn artifact_name(query: &str, sequence_index: u32) -> String {
    let mut stem = String::with_capacity(query.len().min(MAX_STEM_BYTES));
    for c in query.chars() {
        let c = match c {
            c if c.is_whitespace() => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        };
        if stem.len() + c.len_utf8() > MAX_STEM_BYTES {
            break;
        }
        stem.push(c);
    }
    format!("{}_{}.jpg", stem, sequence_index + 1)
}

/// Downloader writing images into a directory on disk
pub struct FsDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl FsDownloader {
    /// Create a downloader writing into `output_dir` with default client settings
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(output_dir, &ClientConfig::default())
    }

    /// Create a downloader with custom client settings
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(output_dir: impl Into<PathBuf>, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            output_dir: output_dir.into(),
        })
    }

    /// Directory images are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Downloader for FsDownloader {
    async fn download(
        &self,
        query: &str,
        task: &DownloadTask,
    ) -> std::result::Result<PathBuf, DownloadError> {
        let url = reqwest::Url::parse(&task.locator)
            .map_err(|_| DownloadError::InvalidLocator(task.locator.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidLocator(task.locator.clone()));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        let path = self.output_dir.join(artifact_name(query, task.sequence_index));
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| DownloadError::Persist {
                path: path.clone(),
                source,
            })?;

        let dir = self.output_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || persist_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| DownloadError::Persist {
                path: path.clone(),
                source: std::io::Error::other(e),
            })?
            .map_err(|source| DownloadError::Persist {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

/// Write `bytes` to a temp file in `dir`, then rename it onto `target`.
pub(crate) fn persist_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_replaces_each_whitespace() {
        assert_eq!(artifact_name("cat", 0), "cat_1.jpg");
        assert_eq!(artifact_name("big  cat", 2), "big__cat_3.jpg");
        assert_eq!(artifact_name("tab\tcat", 0), "tab_cat_1.jpg");
    }

    #[test]
    fn test_artifact_name_strips_path_characters() {
        assert_eq!(artifact_name("../etc/passwd", 0), ".._etc_passwd_1.jpg");
        assert_eq!(artifact_name("what? <why>", 0), "what___why__1.jpg");
    }

    #[test]
    fn test_artifact_name_caps_long_query() {
        let query = "panda ".repeat(50);
        let name = artifact_name(query.trim(), 0);

        assert!(name.len() <= 255);
        assert!(name.ends_with("_1.jpg"));
        assert_eq!(name.len(), MAX_STEM_BYTES + "_1.jpg".len());

        let last = artifact_name(query.trim(), u32::MAX - 1);
        assert!(last.len() <= 255);
        assert!(last.ends_with("_4294967295.jpg"));
    }

    #[test]
    fn test_artifact_name_cuts_on_char_boundary() {
        // 3-byte characters; 200 is not a multiple of 3
        let query = "漢".repeat(100);
        let name = artifact_name(&query, 0);
        let stem = name.strip_suffix("_1.jpg").unwrap();

        assert_eq!(stem.len(), 198);
        assert!(stem.chars().all(|c| c == '漢'));
    }

    #[test]
    fn test_short_query_is_not_cut() {
        assert_eq!(artifact_name(&"a".repeat(MAX_STEM_BYTES), 0).len(), MAX_STEM_BYTES + 6);
    }

    #[test]
    fn test_artifact_names_are_unique_per_index() {
        let names: std::collections::HashSet<String> =
            (0..50).map(|i| artifact_name("dogs", i)).collect();
        assert_eq!(names.len(), 50);
    }

    #[test]
    fn test_persist_atomically_writes_target_only() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cat_1.jpg");

        persist_atomically(dir.path(), &target, b"jpeg bytes").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg bytes");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_download_rejects_non_http_locator() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = FsDownloader::new(dir.path()).unwrap();

        let result = downloader
            .download("cat", &DownloadTask::new("file:///etc/passwd", 0))
            .await;
        assert!(matches!(result, Err(DownloadError::InvalidLocator(_))));

        let result = downloader.download("cat", &DownloadTask::new("not a url", 0)).await;
        assert!(matches!(result, Err(DownloadError::InvalidLocator(_))));
    }
}
