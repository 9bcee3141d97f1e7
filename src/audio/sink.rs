//! Utilities for decoding files and creating `rodio` sinks from them.
//!
//! Both run on the audio thread, so file I/O never happens under the
//! engine lock.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};

use crate::error::BackendError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// Open and decode `path`.
pub(super) fn decode(path: &Path) -> Result<FileSource, BackendError> {
    let file = File::open(path)?;
    Decoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` holding `source`.
pub(super) fn create_sink(stream: &OutputStream, source: FileSource, volume: f32) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    sink
}
