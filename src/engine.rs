//! Thread-safe pairing of one queue and controller.
//!
//! Every mutation goes through a single mutex held only for the duration of
//! a transition. Backend completions and rescans arrive from other threads
//! and are serialized through the same lock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::{LibraryError, PlaybackError};
use crate::library::{Library, LibraryScanner, Track};
use crate::playback::{AudioBackend, BackendEvent, PlaybackController};

/// What happened to a scan's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The queue was replaced with this many tracks.
    Applied { tracks: usize, metadata_failures: usize },
    /// A newer scan was requested meanwhile; this result was dropped.
    Superseded,
}

pub struct Engine<B> {
    controller: Arc<Mutex<PlaybackController<B>>>,
    scanner: LibraryScanner,
    latest_scan: Arc<AtomicU64>,
}

impl<B> Clone for Engine<B> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            scanner: self.scanner.clone(),
            latest_scan: Arc::clone(&self.latest_scan),
        }
    }
}

impl<B: AudioBackend + Send + 'static> Engine<B> {
    pub fn new(controller: PlaybackController<B>, scanner: LibraryScanner) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            scanner,
            latest_scan: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lock the controller for one transition.
    ///
    /// A panic under the lock cannot leave the queue half-updated (every
    /// mutation re-establishes its invariants before returning), so a
    /// poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, PlaybackController<B>> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<T>(&self, f: impl FnOnce(&mut PlaybackController<B>) -> T) -> T {
        f(&mut self.lock())
    }

    /// Read one file's tags off-lock and append it to the queue.
    pub fn add_file(&self, path: impl AsRef<Path>) -> Result<Arc<Track>, LibraryError> {
        let path = path.as_ref();
        let track = Arc::new(self.scanner.load_file(path)?);
        self.lock().add(Arc::clone(&track));
        info!(path = %path.display(), "track added");
        Ok(track)
    }

    /// Consume backend events on a dedicated thread.
    ///
    /// Failures while advancing or decoding are handed to `on_error`; the
    /// thread ends when the backend drops its sender.
    pub fn listen<F>(&self, events: Receiver<BackendEvent>, on_error: F) -> JoinHandle<()>
    where
        F: Fn(PlaybackError) + Send + 'static,
    {
        let engine = self.clone();
        thread::spawn(move || {
            for event in events {
                let result = match event {
                    BackendEvent::Finished(handle) => engine.lock().on_backend_finished(handle),
                    BackendEvent::Failed { handle, error } => {
                        engine.lock().on_backend_failed(handle, error)
                    }
                };
                if let Err(e) = result {
                    on_error(e);
                }
            }
            debug!("backend event channel closed");
        })
    }

    /// Scan `folder` on the calling thread and apply the result unless a
    /// newer scan was requested in the meantime.
    pub fn scan(&self, folder: impl Into<PathBuf>) -> Result<ScanOutcome, LibraryError> {
        let ticket = self.begin_scan();
        run_scan(
            &self.scanner,
            &self.controller,
            &self.latest_scan,
            ticket,
            folder.into(),
        )
    }

    /// Scan `folder` on a worker thread. Last request wins: a result that
    /// finishes after a newer request was made is discarded.
    pub fn rescan(
        &self,
        folder: impl Into<PathBuf>,
    ) -> JoinHandle<Result<ScanOutcome, LibraryError>> {
        let ticket = self.begin_scan();
        let folder = folder.into();
        let scanner = self.scanner.clone();
        let controller = Arc::clone(&self.controller);
        let latest = Arc::clone(&self.latest_scan);
        thread::spawn(move || run_scan(&scanner, &controller, &latest, ticket, folder))
    }

    /// Apply an already-scanned library, subject to the same last-wins rule.
    pub fn apply_library(&self, library: Library) -> ScanOutcome {
        let ticket = self.begin_scan();
        commit(&self.controller, &self.latest_scan, ticket, library)
    }

    fn begin_scan(&self) -> u64 {
        self.latest_scan.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn run_scan<B: AudioBackend>(
    scanner: &LibraryScanner,
    controller: &Mutex<PlaybackController<B>>,
    latest: &AtomicU64,
    ticket: u64,
    folder: PathBuf,
) -> Result<ScanOutcome, LibraryError> {
    // The walk happens without the lock.
    let library = scanner.scan(&folder)?;
    Ok(commit(controller, latest, ticket, library))
}

fn commit<B: AudioBackend>(
    controller: &Mutex<PlaybackController<B>>,
    latest: &AtomicU64,
    ticket: u64,
    library: Library,
) -> ScanOutcome {
    let mut controller = controller.lock().unwrap_or_else(PoisonError::into_inner);

    // Checked under the lock so a newer commit cannot interleave.
    if latest.load(Ordering::SeqCst) != ticket {
        debug!(ticket, folder = %library.folder().display(), "discarding superseded scan");
        return ScanOutcome::Superseded;
    }

    let tracks = library.len();
    let metadata_failures = library.metadata_failures();
    if metadata_failures > 0 {
        warn!(metadata_failures, "some tracks were added with filename-only metadata");
    }
    controller.replace_all(library.into_tracks());
    info!(tracks, "queue replaced from scan");

    ScanOutcome::Applied {
        tracks,
        metadata_failures,
    }
}
