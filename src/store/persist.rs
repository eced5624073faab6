//! Durable snapshots of the feature collection.
//!
//! The JSON file backend never rewrites the document in place: it writes a
//! sibling temp file, fsyncs it and renames it over the target, so a reader
//! (or the next process start) sees either the previous or the new snapshot.

use crate::errors::StoreError;
use crate::feature::FeatureCollection;
use crate::fsutil;
use parking_lot::Mutex;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Where a store keeps its collection between runs.
pub trait SnapshotStorage: Send + Sync {
    /// Reads the last saved snapshot. `Ok(None)` means nothing was saved yet.
    ///
    /// # Errors
    /// [`StoreError::Corrupt`] if a snapshot exists but cannot be parsed.
    fn load(&self) -> Result<Option<FeatureCollection>, StoreError>;

    /// Replaces the saved snapshot as one atomic step.
    ///
    /// # Errors
    /// [`StoreError::Persist`] if the snapshot could not be made durable; the
    /// previous snapshot is then still intact.
    fn save(&self, collection: &FeatureCollection) -> Result<(), StoreError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// GeoJSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_snapshot(&self, collection: &FeatureCollection) -> io::Result<()> {
        let dir = fsutil::ensure_parent_dir(&self.path)?;
        let prefix = format!(
            ".{}.",
            self.path.file_name().map(|s| s.to_string_lossy()).unwrap_or_default()
        );
        let mut tmp = tempfile::Builder::new().prefix(&prefix).suffix(".tmp").tempfile_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, collection)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        fsutil::sync_dir(&dir)
    }
}

impl SnapshotStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<FeatureCollection>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", self.path.display()))),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, collection: &FeatureCollection) -> Result<(), StoreError> {
        self.write_snapshot(collection)
            .map_err(|e| StoreError::Persist(format!("{}: {e}", self.path.display())))
    }

    fn describe(&self) -> String {
        fsutil::absolutize(&self.path).display().to_string()
    }
}

/// Keeps the serialized snapshot in memory. Writes can be made to fail on
/// demand, which is how persistence failures are exercised.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing serialized document.
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        Self { document: Mutex::new(Some(document.into())), fail_writes: AtomicBool::new(false) }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The last successfully saved document.
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.document.lock().clone()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<Option<FeatureCollection>, StoreError> {
        match self.document.lock().as_deref() {
            None => Ok(None),
            Some(doc) => serde_json::from_str(doc)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
        }
    }

    fn save(&self, collection: &FeatureCollection) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persist("memory storage is refusing writes".into()));
        }
        let doc = serde_json::to_string_pretty(collection)
            .map_err(|e| StoreError::Persist(e.to_string()))?;
        *self.document.lock() = Some(doc);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

/// Lets a shared handle be used as the store's storage while the caller keeps
/// its own reference (e.g. to toggle failures).
impl<S: SnapshotStorage + ?Sized> SnapshotStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<FeatureCollection>, StoreError> {
        (**self).load()
    }

    fn save(&self, collection: &FeatureCollection) -> Result<(), StoreError> {
        (**self).save(collection)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
