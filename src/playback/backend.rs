//! The seam between the controller and whatever decodes and outputs audio.

use std::fmt;
use std::path::Path;

use crate::error::BackendError;

/// Opaque handle to one opened track inside a backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DecoderHandle(u64);

impl DecoderHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecoderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Asynchronous notifications from a backend.
#[derive(Debug)]
pub enum BackendEvent {
    /// The track behind the handle played to its end.
    Finished(DecoderHandle),
    /// The track behind the handle could not be opened or decoded.
    Failed {
        handle: DecoderHandle,
        error: BackendError,
    },
}

/// Decoding and output, driven by the playback controller.
///
/// Completion is not part of the trait: a backend reports it as
/// [`BackendEvent::Finished`] on a channel consumed by the engine. Every
/// method is called with the engine lock held and must not block on I/O.
pub trait AudioBackend {
    /// Prepare `path` for output, leaving it ready but not playing.
    ///
    /// A backend may fail here, or accept the handle and report a later
    /// decode failure as [`BackendEvent::Failed`].
    fn open(&mut self, path: &Path) -> Result<DecoderHandle, BackendError>;
    /// Start or resume output.
    fn start(&mut self, handle: DecoderHandle) -> Result<(), BackendError>;
    fn pause(&mut self, handle: DecoderHandle) -> Result<(), BackendError>;
    /// Stop output and release the handle.
    fn stop(&mut self, handle: DecoderHandle) -> Result<(), BackendError>;
    /// Output gain in `0.0..=1.0`, applied to current and future tracks.
    fn set_volume(&mut self, volume: f32) -> Result<(), BackendError>;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn open(&mut self, path: &Path) -> Result<DecoderHandle, BackendError> {
        (**self).open(path)
    }

    fn start(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        (**self).start(handle)
    }

    fn pause(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        (**self).pause(handle)
    }

    fn stop(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        (**self).stop(handle)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), BackendError> {
        (**self).set_volume(volume)
    }
}
