//! Scrape run controller
//!
//! Drives a run: fetch a page, extract locators, trim the batch to what is
//! still needed, download it in order, advance the counters, repeat until
//! the requested count is reached or a page comes back empty.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{PageFetcher, SearchClient};
use crate::downloader::{Downloader, FsDownloader};
use crate::error::{Result, ScrapeError};
use crate::parser::{extract_locators, plan_batch};
use crate::types::{
    Credentials, DownloadTask, Progress, RunReport, RunState, RunStatus, SearchRequest,
};

type ProgressCallback = Box<dyn Fn(&Progress) + Send + Sync>;

/// Requests cancellation of a running scrape.
///
/// Cancellation is observed before each page fetch; a download already in
/// flight always completes.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Ask the run to stop at the next page boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Runs image scrapes against a page fetcher and a downloader
///
/// # Example
/// ```no_run
/// use imgscrape_core::{Credentials, ScrapeController};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut controller = ScrapeController::with_output_dir("downloads")?;
///     let credentials = Credentials::new("api-key", "engine-id");
///
///     let report = controller.start("red panda", 5, &credentials).await?;
///     println!("{:?}: {} images", report.status, report.state.total_downloaded);
///
///     Ok(())
/// }
/// ```
pub struct ScrapeController<F, D> {
    fetcher: F,
    downloader: D,
    status: RunStatus,
    state: RunState,
    artifacts: Vec<PathBuf>,
    cancel: CancelHandle,
    progress: Option<ProgressCallback>,
}

impl ScrapeController<SearchClient, FsDownloader> {
    /// Controller using the Custom Search API and writing into `output_dir`.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(SearchClient::new()?, FsDownloader::new(output_dir)?))
    }
}

impl<F, D> ScrapeController<F, D>
where
    F: PageFetcher,
    D: Downloader,
{
    /// Create an idle controller
    pub fn new(fetcher: F, downloader: D) -> Self {
        Self {
            fetcher,
            downloader,
            status: RunStatus::Idle,
            state: RunState::default(),
            artifacts: Vec::new(),
            cancel: CancelHandle::default(),
            progress: None,
        }
    }

    /// Call `callback` after every persisted image
    pub fn set_progress<C>(&mut self, callback: C)
    where
        C: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
    }

    /// Handle that stops the current or next run between pages
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Status of the last run
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Counters of the last run
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Files persisted by the last run, including those written before a failure
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Take the fetcher and downloader back
    pub fn into_parts(self) -> (F, D) {
        (self.fetcher, self.downloader)
    }

    /// Download up to `desired_count` images matching `query`.
    ///
    /// # Returns
    /// * `Ok(RunReport)` with status `Completed`, `Exhausted` or `Cancelled`
    /// * `Err(ScrapeError::InvalidRequest)` before any I/O for a zero count,
    ///   blank query or incomplete credentials; the controller is left untouched
    /// * any fetch or download error, after which the status is `Failed` and
    ///   images already written stay in place
    pub async fn start(
        &mut self,
        query: &str,
        desired_count: u32,
        credentials: &Credentials,
    ) -> Result<RunReport> {
        let query = validate(query, desired_count, credentials)?;

        self.state = RunState::new(desired_count);
        self.artifacts.clear();
        self.status = RunStatus::Running;
        info!(query, desired_count, "starting scrape");

        match self.run(query, credentials).await {
            Ok(status) => {
                self.status = status;
                info!(
                    ?status,
                    downloaded = self.state.total_downloaded,
                    requested = self.state.total_requested,
                    "scrape finished"
                );
                Ok(RunReport {
                    status,
                    state: self.state,
                    artifacts: self.artifacts.clone(),
                })
            }
            Err(e) => {
                self.status = RunStatus::Failed;
                warn!(error = %e, persisted = self.artifacts.len(), "scrape failed");
                Err(e)
            }
        }
    }

    async fn run(&mut self, query: &str, credentials: &Credentials) -> Result<RunStatus> {
        self.cancel.reset();

        while !self.state.is_satisfied() {
            if self.cancel.is_cancelled() {
                return Ok(RunStatus::Cancelled);
            }

            let request = SearchRequest {
                query: query.to_string(),
                start_index: self.state.next_start_index,
                credentials: credentials.clone(),
            };
            let page = self.fetcher.fetch(&request).await?;

            let locators = extract_locators(&page);
            if locators.is_empty() {
                info!(start = request.start_index, "no more images found");
                return Ok(RunStatus::Exhausted);
            }

            let batch = plan_batch(locators, self.state.remaining());
            debug!(
                start = request.start_index,
                page_items = page.items.len(),
                batch = batch.len(),
                "downloading batch"
            );

            for (position, locator) in batch.iter().enumerate() {
                let task = DownloadTask::new(
                    locator.as_str(),
                    self.state.total_downloaded + position as u32,
                );
                let path = self
                    .downloader
                    .download(query, &task)
                    .await
                    .map_err(|source| ScrapeError::Download {
                        ordinal: task.ordinal(),
                        locator: task.locator.clone(),
                        source,
                    })?;

                info!(
                    "Downloaded image {}/{}",
                    task.ordinal(),
                    self.state.total_requested
                );
                if let Some(callback) = &self.progress {
                    callback(&Progress {
                        ordinal: task.ordinal(),
                        total_requested: self.state.total_requested,
                        path: path.clone(),
                    });
                }
                self.artifacts.push(path);
            }

            self.state.record_batch(batch.len() as u32);
        }

        Ok(RunStatus::Completed)
    }
}

/// Check caller input and return the trimmed query.
fn validate<'a>(query: &'a str, desired_count: u32, credentials: &Credentials) -> Result<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ScrapeError::InvalidRequest("Search query cannot be empty".to_string()));
    }
    if desired_count == 0 {
        return Err(ScrapeError::InvalidRequest(
            "Number of images must be positive".to_string(),
        ));
    }
    if !credentials.is_complete() {
        return Err(ScrapeError::InvalidRequest(
            "API key and search engine ID are required".to_string(),
        ));
    }
    Ok(query)
}
