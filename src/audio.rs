//! rodio-backed audio output.
//!
//! [`RodioBackend`] implements [`AudioBackend`](crate::playback::AudioBackend)
//! by forwarding commands to an audio thread that owns the output stream and
//! polls sinks for completion.

mod player;
mod sink;
mod thread;

pub use player::RodioBackend;
