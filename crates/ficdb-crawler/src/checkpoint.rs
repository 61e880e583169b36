//! Generic file-backed checkpoint store.
//!
//! One store type serves any serializable progress document (the subject
//! crawl and any future entity crawls share it instead of drifting apart).
//! Saves go through a write-to-temp-then-rename sequence so a crash mid-write
//! can never corrupt the previous good checkpoint; a missing or corrupt file
//! degrades to the state type's `Default` rather than failing the run.

use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CrawlerError;

pub struct CheckpointStore<S> {
    path: PathBuf,
    _state: PhantomData<fn() -> S>,
}

impl<S> CheckpointStore<S>
where
    S: Serialize + DeserializeOwned + Default,
{
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored state, or a fresh default when the file is missing
    /// or unreadable. Corrupt storage is never fatal — it degrades to
    /// "start from scratch" with a warning.
    #[must_use]
    pub fn load(&self) -> S {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no checkpoint file — starting fresh");
                return S::default();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "checkpoint unreadable — starting fresh"
                );
                return S::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "checkpoint corrupt — starting fresh"
                );
                S::default()
            }
        }
    }

    /// Persist `state`, replacing the previous checkpoint atomically.
    ///
    /// Writes to `<path>.tmp`, fsyncs, then renames over the live file, so
    /// an interrupted save leaves the previous checkpoint intact.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::CheckpointEncode`] if serialization fails, or
    /// [`CrawlerError::CheckpointIo`] on any filesystem failure. Callers
    /// treat either as fatal: progress can no longer be durably tracked.
    pub fn save(&self, state: &S) -> Result<(), CrawlerError> {
        let body = serde_json::to_string_pretty(state).map_err(CrawlerError::CheckpointEncode)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(parent, e))?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path).map_err(|e| self.io_err(&tmp_path, e))?;
        file.write_all(body.as_bytes())
            .map_err(|e| self.io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| self.io_err(&tmp_path, e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| self.io_err(&self.path, e))?;
        Ok(())
    }

    /// Delete the backing file, returning to empty state. A missing file is
    /// already the desired outcome and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::CheckpointIo`] if the file exists but cannot
    /// be removed.
    pub fn reset(&self) -> Result<(), CrawlerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(&self.path, e)),
        }
    }

    /// Write a read-only snapshot of `state` plus a caller-computed summary
    /// to `out_path`, without touching the live checkpoint file.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::CheckpointEncode`] or [`CrawlerError::CheckpointIo`]
    /// on serialization or filesystem failure.
    pub fn export(
        &self,
        state: &S,
        summary: serde_json::Value,
        out_path: &Path,
    ) -> Result<(), CrawlerError> {
        let document = serde_json::json!({
            "summary": summary,
            "state": state,
        });
        let body =
            serde_json::to_string_pretty(&document).map_err(CrawlerError::CheckpointEncode)?;
        fs::write(out_path, body).map_err(|e| self.io_err(out_path, e))?;
        Ok(())
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> CrawlerError {
        CrawlerError::CheckpointIo {
            path: path.to_path_buf(),
            source,
        }
    }
}
