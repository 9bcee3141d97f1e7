//! Playback state, repeat/shuffle modes and the transport transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The transport state of the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Transport commands that move between [`PlaybackState`]s.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    Play,
    Pause,
    Stop,
}

impl Transport {
    pub fn name(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
        }
    }
}

impl PlaybackState {
    /// The transition table: the state reached by applying `op`, or `None`
    /// when `op` is not allowed from `self`.
    pub fn after(self, op: Transport) -> Option<Self> {
        use PlaybackState::*;
        match (self, op) {
            (Stopped | Paused, Transport::Play) => Some(Playing),
            (Playing, Transport::Pause) => Some(Paused),
            (_, Transport::Stop) => Some(Stopped),
            (Playing, Transport::Play) | (Stopped | Paused, Transport::Pause) => None,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        })
    }
}

/// What happens when a track ends.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop after the last track of the queue.
    #[default]
    #[serde(alias = "none", alias = "no-loop", alias = "no_loop")]
    Off,
    /// Replay the current track when it ends.
    #[serde(alias = "one", alias = "loop-one", alias = "loop_one", alias = "repeat_one")]
    RepeatOne,
    /// Wrap around to the start of the queue.
    #[serde(alias = "all", alias = "loop-all", alias = "loop_all", alias = "repeat_all")]
    RepeatAll,
}

impl RepeatMode {
    /// Cycle `Off -> RepeatAll -> RepeatOne -> Off`.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::RepeatAll,
            Self::RepeatAll => Self::RepeatOne,
            Self::RepeatOne => Self::Off,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Some(Self::Off),
            "one" | "repeat-one" => Some(Self::RepeatOne),
            "all" | "repeat-all" => Some(Self::RepeatAll),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::RepeatOne => "one",
            Self::RepeatAll => "all",
        })
    }
}

/// Whether "next track" is drawn at random.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ShuffleMode {
    #[default]
    Off,
    On,
}

impl ShuffleMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl From<bool> for ShuffleMode {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for ShuffleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
        })
    }
}
