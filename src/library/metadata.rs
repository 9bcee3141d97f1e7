//! Embedded tag reading.
//!
//! The scanner only needs a handful of fields plus "is there a picture";
//! [`MetadataReader`] keeps lofty swappable so tests can feed fixed tags.

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;

use crate::error::MetadataError;

/// The subset of embedded metadata the engine records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub has_artwork: bool,
}

/// Reads tags for a single file. A failure only degrades that one track.
pub trait MetadataReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, MetadataError>;
}

/// Default reader backed by `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyReader;

impl MetadataReader for LoftyReader {
    fn read_tags(&self, path: &Path) -> Result<TagInfo, MetadataError> {
        let tagged = lofty::read_from_path(path).map_err(|source| MetadataError::Tags {
            path: path.to_path_buf(),
            source,
        })?;

        let duration = tagged.properties().duration();
        let mut info = TagInfo {
            duration: (!duration.is_zero()).then_some(duration),
            ..TagInfo::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            info.title = non_empty(tag.title());
            info.artist = non_empty(tag.artist());
            info.album = non_empty(tag.album());
        }

        // Cover art is not always stored in the primary tag (e.g. ID3v2 next to APE).
        info.has_artwork = tagged.tags().iter().any(|t| !t.pictures().is_empty());

        Ok(info)
    }
}

fn non_empty(v: Option<Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
