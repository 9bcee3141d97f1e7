//! Library scanning, the `Track` model and text search.
//!
//! A scan turns a folder into an explicit [`Library`] value; the shell owns
//! which folder is current and hands rescans to the engine.

mod display;
mod metadata;
mod model;
mod scan;
mod search;

pub use display::display_from_fields;
pub use metadata::{LoftyReader, MetadataReader, TagInfo};
pub use model::{AudioFormat, Library, Track};
pub use scan::{LibraryScanner, scan};
pub use search::{Filter, SearchIndex, filter, matches};
