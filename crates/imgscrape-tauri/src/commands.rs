//! Tauri commands for imgscrape
//!
//! This module contains all Tauri commands that can be invoked from the frontend.

use tauri::{AppHandle, Emitter, State};

use crate::ScraperState;
use imgscrape_core::{Credentials, RunReport, ScrapeError};

/// Event carrying a `Progress` payload after each downloaded image
pub const PROGRESS_EVENT: &str = "scrape-progress";

/// Download `desired_count` images matching `query`.
///
/// Credentials are remembered for the next session before the run starts.
/// Progress is reported through the `scrape-progress` event.
///
/// # Returns
/// * `Ok(RunReport)` when the run completes, runs out of results or is cancelled
/// * `Err(String)` with error message if the request is invalid or the run fails
#[tauri::command]
pub async fn scrape_images(
    app: AppHandle,
    state: State<'_, ScraperState>,
    query: String,
    desired_count: i64,
    credentials: Credentials,
) -> Result<RunReport, String> {
    let desired_count = desired_count_from(desired_count).map_err(|e| e.to_string())?;

    if credentials.is_complete() {
        if let Err(e) = state.credentials().save(&credentials) {
            tracing::warn!(error = %e, "could not save credentials");
        }
    }

    let mut controller = state.controller().lock().await;
    controller.set_progress(move |progress| {
        if let Err(e) = app.emit(PROGRESS_EVENT, progress.clone()) {
            tracing::warn!(error = %e, "could not emit progress event");
        }
    });

    controller
        .start(&query, desired_count, &credentials)
        .await
        .map_err(|e| e.to_string())
}

/// Stop the running scrape before its next page fetch.
#[tauri::command]
pub fn cancel_scrape(state: State<'_, ScraperState>) {
    state.cancel_handle().cancel();
}

/// Read saved credentials.
///
/// # Returns
/// * `Ok(None)` if nothing has been saved yet
/// * `Err(String)` if the credentials file cannot be read
#[tauri::command]
pub fn load_credentials(state: State<'_, ScraperState>) -> Result<Option<Credentials>, String> {
    state.credentials().load().map_err(|e| e.to_string())
}

/// Save credentials for the next session.
#[tauri::command]
pub fn save_credentials(
    state: State<'_, ScraperState>,
    credentials: Credentials,
) -> Result<(), String> {
    state.credentials().save(&credentials).map_err(|e| e.to_string())
}

/// Convert the count typed in the front end.
///
/// Zero, negative and out-of-range values are rejected.
pub fn desired_count_from(value: i64) -> Result<u32, ScrapeError> {
    match u32::try_from(value) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ScrapeError::InvalidRequest(format!(
            "Number of images must be between 1 and {}, got {}",
            u32::MAX,
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_desired_count_zero() {
        assert!(matches!(desired_count_from(0), Err(ScrapeError::InvalidRequest(_))));
    }

    #[test]
    fn test_desired_count_bounds() {
        assert_eq!(desired_count_from(1).unwrap(), 1);
        assert_eq!(desired_count_from(u32::MAX as i64).unwrap(), u32::MAX);
        assert!(desired_count_from(u32::MAX as i64 + 1).is_err());
    }

    proptest! {
        #[test]
        fn non_positive_counts_are_rejected(value in i64::MIN..=0) {
            prop_assert!(matches!(desired_count_from(value), Err(ScrapeError::InvalidRequest(_))));
        }

        #[test]
        fn positive_counts_pass_through(value in 1i64..=u32::MAX as i64) {
            prop_assert_eq!(desired_count_from(value).unwrap() as i64, value);
        }
    }
}
