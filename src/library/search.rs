//! Case-insensitive substring search over title, artist and file name.

use super::model::Track;

/// Return true when `query` (case-insensitive, taken as given) occurs in
/// the track's title, artist or file name. An empty query matches everything.
pub fn matches(track: &Track, query: &str) -> bool {
    matches_lower(track, &query.to_lowercase())
}

fn matches_lower(track: &Track, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    track.title().to_lowercase().contains(needle)
        || track
            .artist()
            .is_some_and(|a| a.to_lowercase().contains(needle))
        || track.file_name().to_lowercase().contains(needle)
}

/// Lazily filter `tracks` by `query`, preserving order.
///
/// The returned iterator is `Clone` whenever the source iterator is, so a
/// filtered view over a slice can be restarted freely.
pub fn filter<I>(tracks: I, query: &str) -> Filter<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<Track>,
{
    Filter {
        inner: tracks.into_iter(),
        needle: query.to_lowercase(),
    }
}

/// Iterator returned by [`filter`].
#[derive(Debug, Clone)]
pub struct Filter<I> {
    inner: I,
    needle: String,
}

impl<I> Iterator for Filter<I>
where
    I: Iterator,
    I::Item: AsRef<Track>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.inner.find(|t| matches_lower(t.as_ref(), needle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

/// Precomputed lowercase search keys for a fixed track sequence.
///
/// Answers with positions into the sequence it was built from, which is what
/// a shell needs to map a filtered selection back onto the queue.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    keys: Vec<String>,
}

impl SearchIndex {
    pub fn new<I>(tracks: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<Track>,
    {
        let keys = tracks
            .into_iter()
            .map(|t| {
                let t = t.as_ref();
                // NUL keeps a query from matching across field boundaries.
                format!(
                    "{}\0{}\0{}",
                    t.title(),
                    t.artist().unwrap_or_default(),
                    t.file_name()
                )
                .to_lowercase()
            })
            .collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Positions of the tracks matching `query`, in order.
    pub fn matching(&self, query: &str) -> impl Iterator<Item = usize> + Clone + '_ {
        let needle = query.to_lowercase();
        self.keys
            .iter()
            .enumerate()
            .filter(move |(_, key)| needle.is_empty() || key.contains(needle.as_str()))
            .map(|(i, _)| i)
    }
}
