//! # Gallery Module
//!
//! Coordinates the scanner, the index store and the grouping views behind
//! a small lifecycle state machine.
//!
//! ## Rules
//! - At most one scan or delete runs at a time; a request while busy is
//!   dropped and reported as `Busy`, never queued.
//! - A failed or empty-handed scan leaves the index untouched.
//! - Only indexed images can be deleted, and only while the index is
//!   `Ready`. The entry is removed even if the file itself could not be
//!   deleted.
//!
//! ## Example
//! ```rust,ignore
//! let gallery = Gallery::builder()
//!     .config(GalleryConfig::default())
//!     .backend(Arc::new(SqliteBlobStore::open(&path)?))
//!     .build();
//!
//! gallery.initialize(storage_permission_granted);
//! gallery.rescan()?;
//! for album in gallery.albums() {
//!     println!("{} ({})", album.display_name(), album.len());
//! }
//! ```

mod state;

pub use state::IndexState;

use crate::config::GalleryConfig;
use crate::core::classifier::FilenameClassifier;
use crate::core::entry::Entry;
use crate::core::grouping::{self, Album, TimeWindow};
use crate::core::scanner::{DirectoryScanner, ImageScanner};
use crate::core::store::{BlobStore, InMemoryBlobStore, IndexStore};
use crate::error::{GalleryError, ScanError, StoreError};
use crate::events::{null_sender, Event, EventSender, IndexEvent};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// What a scan request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The index was replaced with the scan result
    Completed { indexed: usize, skipped: usize },
    /// The directory does not exist; the index is unchanged
    NotFound,
    /// Another scan is running; this request was dropped
    Busy,
    /// Storage access is unavailable or the index is not loaded yet
    Blocked,
}

/// What a delete request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The entry left the index; `file_deleted` is false if the file lingers
    Removed { file_deleted: bool },
    /// The path is not indexed; nothing on disk was touched
    NotIndexed,
    /// A scan or another delete is running
    Busy,
    /// Storage access is unavailable or the index is not loaded yet
    Blocked,
}

/// Builder for a [`Gallery`]
pub struct GalleryBuilder {
    config: GalleryConfig,
    backend: Option<Arc<dyn BlobStore>>,
    scanner: Option<Box<dyn ImageScanner>>,
    events: Option<EventSender>,
}

impl GalleryBuilder {
    pub fn new() -> Self {
        Self {
            config: GalleryConfig::default(),
            backend: None,
            scanner: None,
            events: None,
        }
    }

    pub fn config(mut self, config: GalleryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the image directory
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the persistence backend
    pub fn backend(mut self, backend: Arc<dyn BlobStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace the filesystem scanner
    pub fn scanner(mut self, scanner: Box<dyn ImageScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Report progress to a listener
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Gallery {
        let config = self.config;

        let scanner = self.scanner.unwrap_or_else(|| {
            Box::new(
                DirectoryScanner::new(config.scan.clone())
                    .with_classifier(FilenameClassifier::new(&config.classifier_prefix)),
            )
        });
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(InMemoryBlobStore::new()));

        Gallery {
            store: IndexStore::new(backend, config.collection.clone()),
            directory: config.directory,
            scanner,
            state: Mutex::new(IndexState::Uninitialized),
            scanning: AtomicBool::new(false),
            events: self.events.unwrap_or_else(null_sender),
        }
    }
}

impl Default for GalleryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The gallery index and its lifecycle
pub struct Gallery {
    directory: PathBuf,
    store: IndexStore,
    scanner: Box<dyn ImageScanner>,
    state: Mutex<IndexState>,
    scanning: AtomicBool,
    events: EventSender,
}

/// Clears the busy flag and returns to `Ready` however the scan ends
struct ScanGuard<'a> {
    gallery: &'a Gallery,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.gallery.set_state(IndexState::Ready);
        self.gallery.scanning.store(false, Ordering::Release);
    }
}

/// Clears the busy flag when a delete ends
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Gallery {
    pub fn builder() -> GalleryBuilder {
        GalleryBuilder::new()
    }

    pub fn state(&self) -> IndexState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    fn set_state(&self, next: IndexState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            *state = next;
            self.events.send(Event::Index(IndexEvent::StateChanged {
                state: next.to_string(),
            }));
        }
    }

    fn load_store(&self) {
        self.set_state(IndexState::Loading);
        match self.store.load() {
            Ok(entries) => self.events.send(Event::Index(IndexEvent::Loaded {
                total_entries: entries.len(),
            })),
            Err(error) => warn!(%error, "Could not read persisted index; continuing with an empty one"),
        }
    }

    /// Load the persisted index and settle into `Ready` or `PermissionBlocked`.
    ///
    /// Only acts from `Uninitialized`; otherwise returns the current state.
    /// The index is loaded even without storage access so previously
    /// indexed entries stay queryable.
    pub fn initialize(&self, can_access_storage: bool) -> IndexState {
        if self.state() != IndexState::Uninitialized {
            return self.state();
        }

        self.load_store();
        let next = if can_access_storage {
            IndexState::Ready
        } else {
            info!("Storage access denied; scanning disabled");
            IndexState::PermissionBlocked
        };
        self.set_state(next);
        next
    }

    /// Re-evaluate storage access after the platform asked the user again.
    ///
    /// Only acts from `PermissionBlocked`.
    pub fn retry_permission(&self, granted: bool) -> IndexState {
        if self.state() != IndexState::PermissionBlocked || !granted {
            return self.state();
        }

        self.load_store();
        self.set_state(IndexState::Ready);
        IndexState::Ready
    }

    /// Scan the image directory and replace the index with the result.
    ///
    /// Returns `Err` only when the directory could not be listed or the new
    /// index could not be persisted; in both cases the previous index is kept.
    pub fn rescan(&self) -> Result<ScanOutcome, GalleryError> {
        if !self.state().can_scan() && !self.is_scanning() {
            return Ok(ScanOutcome::Blocked);
        }

        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Scan already in progress; request dropped");
            return Ok(ScanOutcome::Busy);
        }
        let _guard = ScanGuard { gallery: self };
        self.set_state(IndexState::Scanning);

        let result = match self.scanner.scan_with_events(&self.directory, &self.events) {
            Ok(result) => result,
            Err(ScanError::DirectoryNotFound { path }) => {
                info!(directory = %path.display(), "Image directory not found; index unchanged");
                return Ok(ScanOutcome::NotFound);
            }
            Err(error) => return Err(error.into()),
        };

        let indexed = result.entries.len();
        let skipped = result.skipped();
        self.store.replace_all(result.entries)?;

        self.events.send(Event::Index(IndexEvent::Replaced {
            total_entries: indexed,
        }));

        Ok(ScanOutcome::Completed { indexed, skipped })
    }

    /// Delete an indexed image from disk and from the index.
    ///
    /// Only acts from `Ready` and only on indexed paths; anything else
    /// leaves the disk alone. A failed file deletion is logged and the index
    /// entry is removed anyway, which can leave the file behind.
    pub fn delete(&self, path: &Path) -> Result<DeleteOutcome, StoreError> {
        match self.state() {
            IndexState::Ready => {}
            IndexState::Scanning => return Ok(DeleteOutcome::Busy),
            state => {
                info!(path = %path.display(), %state, "Delete refused; index not ready");
                return Ok(DeleteOutcome::Blocked);
            }
        }

        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(DeleteOutcome::Busy);
        }
        let _guard = BusyGuard { flag: &self.scanning };

        if self.store.get(path).is_none() {
            info!(path = %path.display(), "Delete refused; path is not indexed");
            return Ok(DeleteOutcome::NotIndexed);
        }

        let file_deleted = match std::fs::remove_file(path) {
            Ok(()) => true,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "File already gone");
                true
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "Could not delete file; removing from index anyway");
                false
            }
        };

        self.store.remove(path)?;

        self.events.send(Event::Index(IndexEvent::Removed {
            path: path.to_path_buf(),
            file_deleted,
        }));

        Ok(DeleteOutcome::Removed { file_deleted })
    }

    /// Copy of every indexed entry
    pub fn entries(&self) -> Vec<Entry> {
        self.store.entries()
    }

    /// Group key to entries, each newest first
    pub fn album_map(&self) -> HashMap<String, Vec<Entry>> {
        grouping::group_by_key(&self.store.entries())
    }

    /// Albums ordered by newest entry
    pub fn albums(&self) -> Vec<Album> {
        grouping::ordered_albums(&self.store.entries())
    }

    /// Albums whose name contains `query`, ignoring case
    pub fn search_albums(&self, query: &str) -> Vec<Album> {
        grouping::filter_albums(&self.albums(), query)
    }

    /// Entries inside `window` relative to the current time
    pub fn entries_since(&self, window: TimeWindow) -> Vec<Entry> {
        self.entries_since_at(window, Utc::now())
    }

    /// Entries inside `window` relative to `now`
    pub fn entries_since_at(&self, window: TimeWindow, now: DateTime<Utc>) -> Vec<Entry> {
        grouping::entries_since(&self.store.entries(), window.duration(), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ScanResult;
    use crate::core::store::{DEFAULT_COLLECTION, ENTRIES_KEY};
    use crate::events::EventChannel;
    use crossbeam_channel::{bounded, Receiver, Sender};
    use std::fs::File;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Scanner that parks until the test releases it
    struct GatedScanner {
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl ImageScanner for GatedScanner {
        fn scan(&self, directory: &Path) -> Result<ScanResult, ScanError> {
            self.scan_with_events(directory, &null_sender())
        }

        fn scan_with_events(&self, _: &Path, _: &EventSender) -> Result<ScanResult, ScanError> {
            let _ = self.entered.send(());
            let _ = self.release.recv();
            Ok(ScanResult {
                entries: vec![Entry::new("/gated/IMG-WA0001.jpg", Utc::now(), "WA0001")],
                errors: Vec::new(),
            })
        }
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    fn gallery_for(dir: &Path) -> (Arc<InMemoryBlobStore>, Gallery) {
        let backend = Arc::new(InMemoryBlobStore::new());
        let gallery = Gallery::builder()
            .directory(dir)
            .backend(backend.clone())
            .build();
        (backend, gallery)
    }

    #[test]
    fn initialize_without_permission_blocks_scanning() {
        let temp_dir = TempDir::new().unwrap();
        let (_, gallery) = gallery_for(temp_dir.path());

        assert_eq!(gallery.initialize(false), IndexState::PermissionBlocked);
        assert_eq!(gallery.rescan().unwrap(), ScanOutcome::Blocked);
    }

    #[test]
    fn retry_with_grant_unblocks() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-WA0001.jpg");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(false);

        assert_eq!(gallery.retry_permission(false), IndexState::PermissionBlocked);
        assert_eq!(gallery.retry_permission(true), IndexState::Ready);
        assert!(matches!(
            gallery.rescan().unwrap(),
            ScanOutcome::Completed { indexed: 1, .. }
        ));
    }

    #[test]
    fn scan_before_initialize_is_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let (_, gallery) = gallery_for(temp_dir.path());

        assert_eq!(gallery.rescan().unwrap(), ScanOutcome::Blocked);
        assert_eq!(gallery.state(), IndexState::Uninitialized);
    }

    #[test]
    fn initialize_twice_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let (_, gallery) = gallery_for(temp_dir.path());

        gallery.initialize(true);
        assert_eq!(gallery.initialize(false), IndexState::Ready);
    }

    #[test]
    fn rescan_replaces_index_and_returns_to_ready() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-20240101-WA0001.jpg");
        touch(&temp_dir, "IMG-20240102-WA0001.png");
        touch(&temp_dir, "notes.txt");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(true);

        let outcome = gallery.rescan().unwrap();

        assert_eq!(outcome, ScanOutcome::Completed { indexed: 2, skipped: 0 });
        assert_eq!(gallery.state(), IndexState::Ready);
        assert!(!gallery.is_scanning());
        assert_eq!(gallery.albums().len(), 1);
        assert_eq!(gallery.albums()[0].key(), "WA0001");
    }

    #[test]
    fn missing_directory_keeps_previous_index() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-WA0001.jpg");
        let backend = Arc::new(InMemoryBlobStore::new());

        let first = Gallery::builder()
            .directory(temp_dir.path())
            .backend(backend.clone())
            .build();
        first.initialize(true);
        first.rescan().unwrap();
        let persisted = backend.get(DEFAULT_COLLECTION, ENTRIES_KEY).unwrap();

        let second = Gallery::builder()
            .directory(temp_dir.path().join("missing"))
            .backend(backend.clone())
            .build();
        second.initialize(true);

        assert_eq!(second.rescan().unwrap(), ScanOutcome::NotFound);
        assert_eq!(second.entries().len(), 1);
        assert_eq!(second.state(), IndexState::Ready);
        assert_eq!(backend.get(DEFAULT_COLLECTION, ENTRIES_KEY).unwrap(), persisted);
    }

    #[test]
    fn concurrent_scan_request_is_dropped() {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);

        let gallery = Arc::new(
            Gallery::builder()
                .scanner(Box::new(GatedScanner {
                    entered: entered_tx,
                    release: release_rx,
                }))
                .build(),
        );
        gallery.initialize(true);

        let worker = {
            let gallery = Arc::clone(&gallery);
            thread::spawn(move || gallery.rescan().unwrap())
        };

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(gallery.state(), IndexState::Scanning);
        assert_eq!(gallery.rescan().unwrap(), ScanOutcome::Busy);

        release_tx.send(()).unwrap();
        let first = worker.join().unwrap();

        assert_eq!(first, ScanOutcome::Completed { indexed: 1, skipped: 0 });
        assert_eq!(gallery.state(), IndexState::Ready);
        assert!(!gallery.is_scanning());
    }

    #[test]
    fn delete_removes_file_and_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(&temp_dir, "IMG-WA0001.jpg");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(true);
        gallery.rescan().unwrap();

        let outcome = gallery.delete(&path).unwrap();

        assert_eq!(outcome, DeleteOutcome::Removed { file_deleted: true });
        assert!(!path.exists());
        assert!(gallery.entries().is_empty());
    }

    #[test]
    fn failed_file_deletion_still_removes_entry() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-WA0001.jpg");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(true);
        gallery.rescan().unwrap();

        // A directory cannot be removed with remove_file
        let blocker = temp_dir.path().join("IMG-WA0002.jpg");
        std::fs::create_dir(&blocker).unwrap();
        gallery
            .store()
            .replace_all(vec![Entry::new(&blocker, Utc::now(), "WA0002")])
            .unwrap();

        let outcome = gallery.delete(&blocker).unwrap();

        assert_eq!(outcome, DeleteOutcome::Removed { file_deleted: false });
        assert!(blocker.exists());
        assert!(gallery.entries().is_empty());
    }

    #[test]
    fn deleting_unindexed_path_leaves_disk_alone() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-WA0001.jpg");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(true);
        gallery.rescan().unwrap();

        let stray = touch(&temp_dir, "never-indexed.jpg");
        let outcome = gallery.delete(&stray).unwrap();

        assert_eq!(outcome, DeleteOutcome::NotIndexed);
        assert!(stray.exists());
        assert_eq!(gallery.entries().len(), 1);
    }

    fn seeded_backend(path: &Path) -> Arc<InMemoryBlobStore> {
        let backend = Arc::new(InMemoryBlobStore::new());
        IndexStore::new(backend.clone(), DEFAULT_COLLECTION)
            .replace_all(vec![Entry::new(path, Utc::now(), "WA0001")])
            .unwrap();
        backend
    }

    #[test]
    fn delete_before_initialize_is_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(&temp_dir, "IMG-WA0001.jpg");
        let gallery = Gallery::builder()
            .directory(temp_dir.path())
            .backend(seeded_backend(&path))
            .build();

        assert_eq!(gallery.delete(&path).unwrap(), DeleteOutcome::Blocked);
        assert!(path.exists());

        gallery.initialize(true);
        assert_eq!(gallery.entries().len(), 1);
        assert_eq!(gallery.delete(&path).unwrap(), DeleteOutcome::Removed { file_deleted: true });
        assert!(gallery.entries().is_empty());
    }

    #[test]
    fn delete_without_storage_access_is_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(&temp_dir, "IMG-WA0001.jpg");
        let gallery = Gallery::builder()
            .directory(temp_dir.path())
            .backend(seeded_backend(&path))
            .build();
        gallery.initialize(false);

        assert_eq!(gallery.delete(&path).unwrap(), DeleteOutcome::Blocked);
        assert!(path.exists());
        assert_eq!(gallery.entries().len(), 1);
        assert_eq!(gallery.state(), IndexState::PermissionBlocked);
    }

    #[test]
    fn delete_during_scan_is_dropped() {
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);

        let gallery = Arc::new(
            Gallery::builder()
                .scanner(Box::new(GatedScanner {
                    entered: entered_tx,
                    release: release_rx,
                }))
                .build(),
        );
        gallery.initialize(true);

        let worker = {
            let gallery = Arc::clone(&gallery);
            thread::spawn(move || gallery.rescan().unwrap())
        };

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            gallery.delete(Path::new("/gated/IMG-WA0001.jpg")).unwrap(),
            DeleteOutcome::Busy
        );

        release_tx.send(()).unwrap();
        worker.join().unwrap();
        assert_eq!(gallery.entries().len(), 1);
    }

    #[test]
    fn lifecycle_emits_state_changes() {
        let temp_dir = TempDir::new().unwrap();
        let (sender, receiver) = EventChannel::new();
        let gallery = Gallery::builder()
            .directory(temp_dir.path())
            .events(sender)
            .build();

        gallery.initialize(true);
        gallery.rescan().unwrap();

        let states: Vec<String> = receiver
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                Event::Index(IndexEvent::StateChanged { state }) => Some(state),
                _ => None,
            })
            .collect();

        assert_eq!(states, vec!["loading", "ready", "scanning", "ready"]);
    }

    #[test]
    fn search_filters_albums() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "IMG-WA0001.jpg");
        touch(&temp_dir, "IMG-WA0777.jpg");
        touch(&temp_dir, "camera.jpg");
        let (_, gallery) = gallery_for(temp_dir.path());
        gallery.initialize(true);
        gallery.rescan().unwrap();

        assert_eq!(gallery.search_albums("").len(), 3);
        assert_eq!(gallery.search_albums("wa07").len(), 1);
        assert_eq!(gallery.search_albums("unknown")[0].len(), 1);
    }
}
