use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::LibraryError;

use super::metadata::{LoftyReader, MetadataReader, TagInfo};
use super::model::{Library, Track};

/// Walks a folder and turns supported audio files into tracks.
///
/// Scanning only reads the filesystem, so a scanner can run on any thread.
#[derive(Clone)]
pub struct LibraryScanner {
    settings: LibrarySettings,
    extensions: Vec<String>,
    reader: Arc<dyn MetadataReader>,
}

impl LibraryScanner {
    pub fn new(settings: LibrarySettings) -> Self {
        Self::with_reader(settings, LoftyReader)
    }

    pub fn with_reader(settings: LibrarySettings, reader: impl MetadataReader + 'static) -> Self {
        let extensions = settings
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            settings,
            extensions,
            reader: Arc::new(reader),
        }
    }

    /// Whether `path` carries one of the configured extensions.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    /// Scan `dir` into a [`Library`].
    ///
    /// Only an unreadable `dir` fails the scan. Files whose tags cannot be read
    /// are kept with their file stem as title and no artwork.
    pub fn scan(&self, dir: &Path) -> Result<Library, LibraryError> {
        let meta = fs::metadata(dir).map_err(|source| LibraryError::Folder {
            path: dir.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(LibraryError::NotADirectory(dir.to_path_buf()));
        }

        let settings = &self.settings;
        let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

        // Non-recursive = only the root directory.
        let depth_cap = if settings.recursive {
            settings.max_depth
        } else {
            Some(1)
        };
        if let Some(d) = depth_cap {
            walker = walker.max_depth(d);
        }

        let mut seen = HashSet::new();
        let mut tracks: Vec<Arc<Track>> = Vec::new();
        let mut failures = 0usize;

        let entries = walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()));

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.is_supported(path) {
                continue;
            }
            if !seen.insert(path.to_path_buf()) {
                continue;
            }

            let (track, tags_read) = self.track_at(path);
            if !tags_read {
                failures += 1;
            }
            debug!(path = %path.display(), "found track");
            tracks.push(Arc::new(track));
        }

        let mut library = Library::new(dir, tracks).with_metadata_failures(failures);
        if settings.sort_by_display {
            library.sort_by_display();
        }

        info!(
            folder = %dir.display(),
            tracks = library.len(),
            metadata_failures = failures,
            "library scanned"
        );
        Ok(library)
    }

    /// Build a track for one file picked by the user.
    ///
    /// The extension must be one of the configured ones and `path` must be a
    /// readable file; unreadable tags degrade to the file name as in a scan.
    pub fn load_file(&self, path: &Path) -> Result<Track, LibraryError> {
        if !self.is_supported(path) {
            return Err(LibraryError::Unsupported(path.to_path_buf()));
        }
        let meta = fs::metadata(path).map_err(|source| LibraryError::File {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(LibraryError::Unsupported(path.to_path_buf()));
        }
        Ok(self.track_at(path).0)
    }

    /// Read tags for `path`. The flag is false when they were unreadable.
    fn track_at(&self, path: &Path) -> (Track, bool) {
        let (tags, ok) = match self.reader.read_tags(path) {
            Ok(tags) => (tags, true),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "metadata unreadable, using filename");
                (TagInfo::default(), false)
            }
        };
        let track = Track::with_display(
            path,
            tags,
            &self.settings.display_fields,
            &self.settings.display_separator,
        );
        (track, ok)
    }
}

/// Scan `dir` with lofty-backed metadata.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Result<Library, LibraryError> {
    LibraryScanner::new(settings.clone()).scan(dir)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
