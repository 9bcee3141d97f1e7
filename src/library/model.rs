use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TrackDisplayField;

use super::display::display_from_fields;
use super::metadata::TagInfo;

/// Codec of a track, derived from its file extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Ogg,
    Xm,
    Mod,
    It,
    S3m,
    /// Any other extension enabled through `library.extensions`.
    Other(String),
}

impl AudioFormat {
    /// Map an extension (case-insensitive, with or without the dot) to a format.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Self::Mp3,
            "wav" => Self::Wav,
            "flac" => Self::Flac,
            "ogg" => Self::Ogg,
            "xm" => Self::Xm,
            "mod" => Self::Mod,
            "it" => Self::It,
            "s3m" => Self::S3m,
            _ => Self::Other(ext),
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .map(Self::from_extension)
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Xm => "xm",
            Self::Mod => "mod",
            Self::It => "it",
            Self::S3m => "s3m",
            Self::Other(ext) => ext,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One playable audio file.
///
/// Tracks are immutable once built: a rescan produces fresh values rather
/// than touching the ones already queued. Queues share them as `Arc<Track>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    path: PathBuf,
    title: String,
    artist: Option<String>,
    album: Option<String>,
    duration: Option<Duration>,
    has_embedded_artwork: bool,
    format: AudioFormat,
    display: String,
}

impl Track {
    /// Build a track with the default "Artist - Title" display label.
    pub fn new(path: impl Into<PathBuf>, tags: TagInfo) -> Self {
        Self::with_display(
            path,
            tags,
            &[TrackDisplayField::Artist, TrackDisplayField::Title],
            " - ",
        )
    }

    /// Build a track whose display label is composed from `fields`.
    ///
    /// `title` falls back to the file stem when the tags carry none.
    pub fn with_display(
        path: impl Into<PathBuf>,
        tags: TagInfo,
        fields: &[TrackDisplayField],
        sep: &str,
    ) -> Self {
        let path = path.into();
        let title = tags
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("UNKNOWN")
                    .to_string()
            });
        let format =
            AudioFormat::from_path(&path).unwrap_or_else(|| AudioFormat::Other(String::new()));
        let display = display_from_fields(
            &path,
            &title,
            tags.artist.as_deref(),
            tags.album.as_deref(),
            &format,
            fields,
            sep,
        );

        Self {
            path,
            title,
            artist: tags.artist,
            album: tags.album,
            duration: tags.duration,
            has_embedded_artwork: tags.has_artwork,
            format,
            display,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn has_embedded_artwork(&self) -> bool {
        self.has_embedded_artwork
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// The filename portion of `path` (with extension).
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

/// A scanned folder: the explicit library value the shell passes around
/// instead of keeping a global "current folder".
#[derive(Debug, Clone, Default)]
pub struct Library {
    folder: PathBuf,
    tracks: Vec<Arc<Track>>,
    metadata_failures: usize,
}

impl Library {
    pub fn new(folder: impl Into<PathBuf>, tracks: Vec<Arc<Track>>) -> Self {
        Self {
            folder: folder.into(),
            tracks,
            metadata_failures: 0,
        }
    }

    pub(crate) fn with_metadata_failures(mut self, n: usize) -> Self {
        self.metadata_failures = n;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// How many files were kept with filename-only metadata.
    pub fn metadata_failures(&self) -> usize {
        self.metadata_failures
    }

    /// Re-sort by display label, case-insensitively.
    pub fn sort_by_display(&mut self) {
        self.tracks
            .sort_by_cached_key(|t| t.display().to_lowercase());
    }

    pub fn into_tracks(self) -> Vec<Arc<Track>> {
        self.tracks
    }
}
