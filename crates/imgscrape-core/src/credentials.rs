//! Saved search API credentials
//!
//! Front ends keep the last used key and engine id in a small JSON file so
//! users do not have to paste them for every run. The controller itself
//! never reads this file.

use std::path::{Path, PathBuf};

use crate::downloader::persist_atomically;
use crate::error::{Result, ScrapeError};
use crate::types::Credentials;

/// File name used inside a front end's config directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// JSON file holding one set of credentials
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `credentials.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CREDENTIALS_FILE))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read saved credentials; `None` when nothing has been saved yet
    pub fn load(&self) -> Result<Option<Credentials>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error(&self.path, e)),
        };
        let credentials = serde_json::from_str(&raw).map_err(|e| store_error(&self.path, e))?;
        Ok(Some(credentials))
    }

    /// Replace the saved credentials
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| store_error(&dir, e))?;

        let json = serde_json::to_vec_pretty(credentials).map_err(|e| store_error(&self.path, e))?;
        persist_atomically(&dir, &self.path, &json).map_err(|e| store_error(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }

    /// Forget saved credentials
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error(&self.path, e)),
        }
    }
}

fn store_error(path: &Path, e: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::CredentialStore(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path().join("nested"));
        let creds = Credentials::new("key-1", "engine-1");

        store.save(&creds).unwrap();

        assert_eq!(store.load().unwrap(), Some(creds));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"apiKey\""));
        assert!(raw.contains("\"searchEngineId\""));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());

        store.save(&Credentials::new("old", "old")).unwrap();
        store.save(&Credentials::new("new", "new")).unwrap();

        assert_eq!(store.load().unwrap(), Some(Credentials::new("new", "new")));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(ScrapeError::CredentialStore(_))));
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::in_dir(dir.path());
        store.save(&Credentials::new("k", "e")).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
    }
}
