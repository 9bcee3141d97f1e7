//! The play queue: an ordered list of shared tracks plus a cursor.
//!
//! The queue only keeps `current_index` consistent. Stopping playback when
//! the current entry disappears is the controller's job; the return values
//! here tell it when that happened.

use std::path::Path;
use std::sync::Arc;

use crate::error::{PlaybackError, Result};
use crate::library::Track;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Arc<Track>>,
    current: Option<usize>,
}

/// What [`Queue::remove`] took out.
#[derive(Debug, Clone)]
pub struct Removed {
    pub track: Arc<Track>,
    /// The removed entry was the current one.
    pub was_current: bool,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Arc<Track>>) -> Self {
        let current = (!tracks.is_empty()).then_some(0);
        Self { tracks, current }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Track>> {
        self.tracks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Arc<Track>> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    /// First position holding a track with `path`.
    pub fn position_of(&self, path: &Path) -> Option<usize> {
        self.tracks.iter().position(|t| t.path() == path)
    }

    /// Append a track. An empty queue gets `current_index = 0`.
    pub fn add(&mut self, track: Arc<Track>) {
        self.tracks.push(track);
        if self.current.is_none() {
            self.current = Some(0);
        }
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Arc<Track>>) {
        for t in tracks {
            self.add(t);
        }
    }

    /// Remove the entry at `index`, re-deriving `current_index`.
    ///
    /// Removing the current entry moves the cursor to whatever now occupies
    /// that position (the new last entry if the old one was last), or clears
    /// it when the queue becomes empty. Removing an earlier entry shifts the
    /// cursor down so it keeps pointing at the same track.
    pub fn remove(&mut self, index: usize) -> Result<Removed> {
        self.check(index)?;

        let track = self.tracks.remove(index);
        let was_current = self.current == Some(index);

        self.current = match self.current {
            Some(cur) if cur == index => self.last_index().map(|last| index.min(last)),
            Some(cur) if index < cur => Some(cur - 1),
            other => other,
        };

        Ok(Removed { track, was_current })
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }

    /// Swap in a new sequence after a rescan.
    ///
    /// Returns `true` when the current track (matched by path) survived and
    /// the cursor now points at it; otherwise the cursor is cleared.
    pub fn replace_all(&mut self, tracks: Vec<Arc<Track>>) -> bool {
        let current_path = self.current().map(|t| t.path().to_path_buf());
        self.tracks = tracks;
        self.current = current_path.and_then(|p| self.position_of(&p));
        self.current.is_some()
    }

    /// Point the cursor at `index`.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.current = Some(index);
        Ok(())
    }

    /// Resolve the cursor for playback: the current index, or 0 when unset.
    pub(crate) fn resolve_current(&mut self) -> Result<usize> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        let index = self.current.unwrap_or(0);
        self.current = Some(index);
        Ok(index)
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.tracks.len() {
            Ok(())
        } else {
            Err(PlaybackError::OutOfRange {
                index,
                len: self.tracks.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a Arc<Track>;
    type IntoIter = std::slice::Iter<'a, Arc<Track>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
