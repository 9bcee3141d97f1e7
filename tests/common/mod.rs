//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use platter::library::TagInfo;
use platter::playback::{AudioBackend, DecoderHandle, PlaybackController, RandomPicker};
use platter::{BackendError, Track};

/// Backend that accepts every file and counts live handles.
#[derive(Default)]
pub struct NullBackend {
    next: u64,
    pub live: usize,
}

impl AudioBackend for NullBackend {
    fn open(&mut self, _: &Path) -> Result<DecoderHandle, BackendError> {
        self.next += 1;
        self.live += 1;
        Ok(DecoderHandle::new(self.next))
    }

    fn start(&mut self, _: DecoderHandle) -> Result<(), BackendError> {
        Ok(())
    }

    fn pause(&mut self, _: DecoderHandle) -> Result<(), BackendError> {
        Ok(())
    }

    fn stop(&mut self, _: DecoderHandle) -> Result<(), BackendError> {
        self.live -= 1;
        Ok(())
    }

    fn set_volume(&mut self, _: f32) -> Result<(), BackendError> {
        Ok(())
    }
}

pub fn tracks(n: usize) -> Vec<Arc<Track>> {
    (0..n)
        .map(|i| Arc::new(Track::new(format!("/music/{i:03}.mp3"), TagInfo::default())))
        .collect()
}

pub fn controller(n: usize, seed: u64) -> PlaybackController<NullBackend> {
    let mut c = PlaybackController::with_picker(NullBackend::default(), RandomPicker::seeded(seed));
    c.extend(tracks(n));
    c
}
