//! The playback controller: owns the queue, the transport state machine and
//! the advance policy, and drives an [`AudioBackend`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{BackendError, PlaybackError, Result};
use crate::library::Track;

use super::backend::{AudioBackend, DecoderHandle};
use super::picker::{IndexPicker, RandomPicker, pick_excluding};
use super::queue::Queue;
use super::types::{PlaybackState, RepeatMode, ShuffleMode, Transport};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

pub struct PlaybackController<B> {
    queue: Queue,
    state: PlaybackState,
    repeat: RepeatMode,
    shuffle: ShuffleMode,
    backend: B,
    picker: Box<dyn IndexPicker>,
    handle: Option<DecoderHandle>,
    volume: f32,
}

impl<B: AudioBackend> PlaybackController<B> {
    /// A stopped controller with an empty queue and entropy-seeded shuffle.
    pub fn new(backend: B) -> Self {
        Self::with_picker(backend, RandomPicker::from_entropy())
    }

    pub fn with_picker(backend: B, picker: impl IndexPicker + 'static) -> Self {
        Self {
            queue: Queue::new(),
            state: PlaybackState::Stopped,
            repeat: RepeatMode::Off,
            shuffle: ShuffleMode::Off,
            backend,
            picker: Box::new(picker),
            handle: None,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle_mode(&self) -> ShuffleMode {
        self.shuffle
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.queue.current()
    }

    /// Handle of the track currently loaded in the backend, if any.
    pub fn current_handle(&self) -> Option<DecoderHandle> {
        self.handle
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    // ---- queue mutation ----

    pub fn add(&mut self, track: Arc<Track>) {
        self.queue.add(track);
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        self.queue.extend(tracks);
    }

    /// Remove the entry at `index`. Removing the current track stops playback.
    pub fn remove(&mut self, index: usize) -> Result<Arc<Track>> {
        let removed = self.queue.remove(index)?;
        if removed.was_current {
            debug!(index, "current track removed from queue");
            self.stop();
        }
        Ok(removed.track)
    }

    /// Empty the queue and stop.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.stop();
    }

    /// Swap in a rescanned sequence, keeping the current track when its path
    /// is still present. Otherwise playback stops and the cursor is cleared.
    pub fn replace_all(&mut self, tracks: Vec<Arc<Track>>) {
        if !self.queue.replace_all(tracks) {
            self.stop();
        }
    }

    // ---- modes ----

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn set_shuffle_mode(&mut self, mode: ShuffleMode) {
        self.shuffle = mode;
    }

    /// Cycle repeat `Off -> RepeatAll -> RepeatOne -> Off` and return the new mode.
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    pub fn toggle_shuffle(&mut self) -> ShuffleMode {
        self.shuffle = self.shuffle.toggled();
        self.shuffle
    }

    // ---- volume ----

    /// Set the output volume, clamped to `0.0..=1.0`. NaN leaves it unchanged.
    /// Returns the volume now in effect.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        if volume.is_nan() {
            return self.volume;
        }
        let volume = volume.clamp(0.0, 1.0);
        if let Err(e) = self.backend.set_volume(volume) {
            warn!(volume, error = %e, "backend failed to apply volume");
        }
        self.volume = volume;
        debug!(volume, "volume set");
        volume
    }

    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.set_volume(self.volume + delta)
    }

    // ---- transport ----

    /// Start playback from `Stopped`, or resume from `Paused`.
    pub fn play(&mut self) -> Result<()> {
        self.check(Transport::Play)?;
        let index = self.queue.resolve_current()?;

        if self.state == PlaybackState::Paused {
            if let Some(handle) = self.handle {
                if let Err(source) = self.backend.start(handle) {
                    return Err(self.fail(index, source));
                }
                self.state = PlaybackState::Playing;
                debug!(index, %handle, "resumed");
                return Ok(());
            }
        }

        self.start_at(index)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.check(Transport::Pause)?;
        if let Some(handle) = self.handle {
            if let Err(source) = self.backend.pause(handle) {
                let index = self.queue.current_index().unwrap_or(0);
                return Err(self.fail(index, source));
            }
        }
        self.state = PlaybackState::Paused;
        debug!("paused");
        Ok(())
    }

    /// Stop from any state, releasing the backend handle.
    pub fn stop(&mut self) {
        self.release_handle();
        if self.state != PlaybackState::Stopped {
            debug!(from = %self.state, "stopped");
        }
        self.state = PlaybackState::Stopped;
    }

    /// Pause when playing, otherwise play.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Stopped | PlaybackState::Paused => self.play(),
        }
    }

    /// Jump to `index` and start playing it, whatever the current state.
    pub fn play_at(&mut self, index: usize) -> Result<()> {
        self.queue.select(index)?;
        self.start_at(index)
    }

    /// User "next": forward one entry (or a shuffle draw).
    pub fn next(&mut self) -> Result<()> {
        self.step(Direction::Forward)
    }

    /// User "previous": back one entry (or a shuffle draw).
    pub fn previous(&mut self) -> Result<()> {
        self.step(Direction::Backward)
    }

    /// Apply the advance policy after the current track ended on its own.
    ///
    /// Ignored unless playing; completions can race with user commands.
    pub fn track_finished_naturally(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            debug!(state = %self.state, "ignoring track completion");
            return Ok(());
        }
        let Some(current) = self.queue.current_index() else {
            self.stop();
            return Ok(());
        };

        let target = if self.repeat == RepeatMode::RepeatOne {
            Some(current)
        } else if self.shuffle.is_on() {
            Some(self.draw())
        } else {
            self.sequential(Direction::Forward)
        };

        match target {
            Some(index) => {
                self.queue.select(index)?;
                self.start_at(index)
            }
            None => {
                debug!(index = current, "end of queue");
                self.stop();
                Ok(())
            }
        }
    }

    /// Route a backend completion. Returns `false` for stale handles (a track
    /// that was already replaced or stopped), which are ignored.
    ///
    /// A live handle that finishes while paused (it ran out just before the
    /// pause) is released, so the next `play()` reopens the current track.
    pub fn on_backend_finished(&mut self, handle: DecoderHandle) -> Result<bool> {
        if self.handle != Some(handle) {
            debug!(%handle, "ignoring stale completion");
            return Ok(false);
        }
        if self.state != PlaybackState::Playing {
            debug!(%handle, state = %self.state, "live track ended while not playing");
            self.release_handle();
            return Ok(true);
        }
        self.track_finished_naturally()?;
        Ok(true)
    }

    /// Route an asynchronous open/decode failure. Failures of stale handles
    /// return `Ok(false)`; for the live handle playback stops and the error
    /// is returned for the shell to display.
    pub fn on_backend_failed(
        &mut self,
        handle: DecoderHandle,
        error: BackendError,
    ) -> Result<bool> {
        if self.handle != Some(handle) {
            debug!(%handle, error = %error, "ignoring failure of stale handle");
            return Ok(false);
        }
        let index = self.queue.current_index().unwrap_or(0);
        Err(self.fail(index, error))
    }

    // ---- internals ----

    fn check(&self, op: Transport) -> Result<PlaybackState> {
        self.state.after(op).ok_or(PlaybackError::InvalidState {
            op: op.name(),
            state: self.state,
        })
    }

    fn step(&mut self, direction: Direction) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }

        let target = if self.shuffle.is_on() {
            Some(self.draw())
        } else {
            self.sequential(direction)
        };

        let Some(index) = target else {
            // Off the end with no wrap: stop where we are.
            self.stop();
            return Ok(());
        };

        self.queue.select(index)?;
        match self.state {
            PlaybackState::Playing => self.start_at(index),
            PlaybackState::Paused => {
                // A later play() must open the new track, not resume the old one.
                self.release_handle();
                Ok(())
            }
            PlaybackState::Stopped => Ok(()),
        }
    }

    /// Sequential neighbour of the cursor, honouring `RepeatAll` wrap.
    /// `None` means "ran off the end".
    fn sequential(&self, direction: Direction) -> Option<usize> {
        let last = self.queue.last_index()?;
        let Some(current) = self.queue.current_index() else {
            return Some(0);
        };
        let wrap = self.repeat == RepeatMode::RepeatAll;

        match direction {
            Direction::Forward if current < last => Some(current + 1),
            Direction::Forward => wrap.then_some(0),
            Direction::Backward if current > 0 => Some(current - 1),
            Direction::Backward => wrap.then_some(last),
        }
    }

    fn draw(&mut self) -> usize {
        let len = self.queue.len();
        let current = self.queue.current_index();
        pick_excluding(self.picker.as_mut(), len, current)
    }

    /// Open and start the track at `index`, replacing whatever was loaded.
    fn start_at(&mut self, index: usize) -> Result<()> {
        self.release_handle();

        let Some(track) = self.queue.get(index).cloned() else {
            return Err(PlaybackError::OutOfRange {
                index,
                len: self.queue.len(),
            });
        };

        let handle = match self.backend.open(track.path()) {
            Ok(h) => h,
            Err(source) => return Err(self.fail(index, source)),
        };
        self.handle = Some(handle);

        if let Err(source) = self.backend.start(handle) {
            return Err(self.fail(index, source));
        }

        self.state = PlaybackState::Playing;
        debug!(index, %handle, path = %track.path().display(), "playing");
        Ok(())
    }

    /// Stop after a backend failure and build the error for the shell.
    /// The queue is left untouched.
    fn fail(&mut self, index: usize, source: BackendError) -> PlaybackError {
        let path = self
            .queue
            .get(index)
            .map(|t| t.path().to_path_buf())
            .unwrap_or_default();
        warn!(path = %path.display(), error = %source, "playback failed");
        self.stop();
        PlaybackError::PlaybackFailed { path, source }
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.backend.stop(handle) {
                warn!(%handle, error = %e, "backend failed to stop");
            }
        }
    }
}
