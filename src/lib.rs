//! Platter - folder-based music playback engine
//!
//! This crate provides:
//! - Library scanning of a folder into [`Track`]s (tags via lofty, filename fallback)
//! - Case-insensitive search over title, artist and file name
//! - An ordered [`Queue`] with a current cursor
//! - A [`PlaybackController`] state machine (Stopped / Playing / Paused)
//! - Repeat modes (Off, One, All) and uniform shuffle
//! - Output volume, clamped to `0.0..=1.0`
//! - A rodio-backed [`AudioBackend`](playback::AudioBackend)
//!
//! # Architecture
//!
//! The controller never touches audio directly. It asks a backend to open,
//! start, pause and stop decoders identified by opaque handles, and the
//! backend reports natural completion and late decode failures as
//! [`BackendEvent`]s. [`Engine`] wraps the controller in a single mutex so
//! completions, rescans and user commands are applied one at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use platter::{Engine, LibraryScanner, PlaybackController, RodioBackend, Settings};
//!
//! let settings = Settings::default();
//! let (backend, events) = RodioBackend::spawn(&settings.audio)?;
//! let engine = Engine::new(
//!     PlaybackController::new(backend),
//!     LibraryScanner::new(settings.library.clone()),
//! );
//! engine.listen(events, |e| eprintln!("{e}"));
//! engine.scan("/music")?;
//! engine.with(|c| c.play())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod playback;

pub use audio::RodioBackend;
pub use config::Settings;
pub use engine::{Engine, ScanOutcome};
pub use error::{BackendError, LibraryError, MetadataError, PlaybackError};
pub use library::{Library, LibraryScanner, SearchIndex, Track};
pub use playback::{
    BackendEvent, PlaybackController, PlaybackState, Queue, RepeatMode, ShuffleMode,
};
