//! Error types shared across the engine.
//!
//! Each layer gets its own enum: scanning (`LibraryError`, `MetadataError`),
//! the audio backend (`BackendError`) and the transport/queue contract
//! (`PlaybackError`).

use std::path::PathBuf;

use thiserror::Error;

use crate::playback::PlaybackState;

/// Failures of the queue/transport contract, reported to the shell.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Play (or next/previous) was requested with nothing queued.
    #[error("queue is empty")]
    EmptyQueue,

    /// An index did not address an entry of the queue.
    #[error("index {index} out of range for queue of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// The requested transition is not allowed from the current state.
    #[error("cannot {op} while {state}")]
    InvalidState {
        op: &'static str,
        state: PlaybackState,
    },

    /// The backend could not open or drive the file; playback was stopped.
    #[error("playback failed for {}: {source}", path.display())]
    PlaybackFailed {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Errors raised by an [`AudioBackend`](crate::playback::AudioBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown decoder handle {0}")]
    UnknownHandle(u64),

    #[error("audio thread is not running")]
    Disconnected,

    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
}

/// Per-file metadata failure. Absorbed by the scanner, never fatal.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read tags from {}: {source}", path.display())]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Scan failures for a whole folder or a single added file.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("cannot open folder {}: {source}", path.display())]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot open file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a supported audio file", .0.display())]
    Unsupported(PathBuf),
}

/// Result type for queue and transport operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
