//! imgscrape Tauri Integration
//!
//! This crate provides Tauri commands for driving image scrapes from a
//! Tauri 2.0 front end.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imgscrape_tauri::ScraperState;
//! use tauri::Manager;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             let downloads = app.path().download_dir()?;
//!             let config = app.path().app_config_dir()?;
//!             app.manage(ScraperState::new(downloads, config)?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             imgscrape_tauri::commands::scrape_images,
//!             imgscrape_tauri::commands::cancel_scrape,
//!             imgscrape_tauri::commands::load_credentials,
//!             imgscrape_tauri::commands::save_credentials,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! # Commands
//! - `scrape_images` - Download images for a query, emitting `scrape-progress` events
//! - `cancel_scrape` - Stop the running scrape at the next page boundary
//! - `load_credentials` - Read the saved API key and engine id
//! - `save_credentials` - Remember the API key and engine id

pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use imgscrape_core::{
    CancelHandle, CredentialStore, FsDownloader, ScrapeController, SearchClient,
};

/// Controller type driven by the commands
pub type Controller = ScrapeController<SearchClient, FsDownloader>;

/// Shared scraper state.
///
/// The controller sits behind a mutex so only one scrape runs at a time.
/// The cancel handle lives outside it so `cancel_scrape` never waits for the
/// running scrape to release the lock.
pub struct ScraperState {
    controller: Arc<Mutex<Controller>>,
    cancel: CancelHandle,
    credentials: CredentialStore,
}

impl ScraperState {
    /// Create state writing images into `download_dir` and keeping
    /// credentials in `config_dir`.
    ///
    /// # Errors
    /// Returns an error string if the HTTP clients cannot be created.
    pub fn new(download_dir: PathBuf, config_dir: PathBuf) -> Result<Self, String> {
        let controller = ScrapeController::with_output_dir(download_dir).map_err(|e| e.to_string())?;
        let cancel = controller.cancel_handle();
        Ok(Self {
            controller: Arc::new(Mutex::new(controller)),
            cancel,
            credentials: CredentialStore::in_dir(config_dir),
        })
    }

    /// Get a reference to the inner controller.
    pub fn controller(&self) -> &Arc<Mutex<Controller>> {
        &self.controller
    }

    /// Handle cancelling the running scrape.
    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    /// Saved credentials.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }
}
