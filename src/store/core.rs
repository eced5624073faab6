use super::persist::{JsonFileStorage, MemoryStorage, SnapshotStorage};
use crate::errors::StoreError;
use crate::feature::FeatureCollection;
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Longest a mutation waits for the writer lock before failing with
    /// [`StoreError::Busy`].
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { lock_timeout: Duration::from_millis(5_000) }
    }
}

/// Sole owner of the parking spot collection and its backing document.
///
/// Readers get an immutable `Arc` snapshot and never wait on disk I/O.
/// Writers are serialized by `writer`; each one edits a private copy, saves
/// it, and only then publishes it, so a failed save leaves nothing behind.
pub struct FeatureStore {
    storage: Box<dyn SnapshotStorage>,
    current: RwLock<Arc<FeatureCollection>>,
    writer: Mutex<()>,
    options: StoreOptions,
}

impl std::fmt::Debug for FeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStore")
            .field("storage", &self.storage.describe())
            .field("features", &self.len())
            .field("options", &self.options)
            .finish()
    }
}

impl FeatureStore {
    /// Open the GeoJSON document at `path`. A missing file starts an empty
    /// collection; the file is created by the first mutation.
    ///
    /// # Errors
    /// [`StoreError::Corrupt`] if the document exists but cannot be used.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        Self::with_storage(Box::new(JsonFileStorage::new(path)), options)
    }

    /// Open a store on top of any storage backend.
    ///
    /// # Errors
    /// Propagates load failures and invariant violations in the loaded data.
    pub fn with_storage(
        storage: Box<dyn SnapshotStorage>,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let mut collection = storage.load()?.unwrap_or_default();
        collection.settle()?;
        Ok(Self {
            storage,
            current: RwLock::new(Arc::new(collection)),
            writer: Mutex::new(()),
            options,
        })
    }

    /// Empty store that keeps its snapshot in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            current: RwLock::new(Arc::new(FeatureCollection::new())),
            writer: Mutex::new(()),
            options: StoreOptions::default(),
        }
    }

    /// Consistent view of the whole collection as of the last committed mutation.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FeatureCollection> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn describe_storage(&self) -> String {
        self.storage.describe()
    }

    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Run one load-modify-persist cycle under the writer lock.
    ///
    /// `change` edits a private copy of the collection. If it fails, or the
    /// save fails, the published collection is left exactly as it was.
    pub(crate) fn mutate<T>(
        &self,
        change: impl FnOnce(&mut FeatureCollection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let timeout = self.options.lock_timeout;
        let _guard = self.writer.try_lock_for(timeout).ok_or(StoreError::Busy(timeout))?;
        let mut draft = FeatureCollection::clone(&self.current.read());
        let out = change(&mut draft)?;
        self.storage.save(&draft)?;
        *self.current.write() = Arc::new(draft);
        Ok(out)
    }
}
