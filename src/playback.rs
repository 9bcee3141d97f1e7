//! Queue, transport state machine and advance policy.
//!
//! [`PlaybackController`] is the only mutator of [`PlaybackState`]. It owns
//! the [`Queue`] it plays from and talks to audio output through the
//! [`AudioBackend`] trait.

mod backend;
mod controller;
mod picker;
mod queue;
mod types;

pub use backend::{AudioBackend, BackendEvent, DecoderHandle};
pub use controller::PlaybackController;
pub use picker::{IndexPicker, RandomPicker};
pub use queue::{Queue, Removed};
pub use types::{PlaybackState, RepeatMode, ShuffleMode, Transport};

#[cfg(test)]
mod tests;
