use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, trace};

use crate::config::AudioSettings;
use crate::error::BackendError;
use crate::playback::{BackendEvent, DecoderHandle};

use super::sink::{FileSource, create_sink, decode};

/// Commands understood by the audio thread.
pub(super) enum SinkCmd {
    /// Decode `path` into a paused sink under `handle`.
    Load {
        handle: DecoderHandle,
        path: PathBuf,
    },
    Start(DecoderHandle),
    Pause(DecoderHandle),
    Stop(DecoderHandle),
    SetVolume(f32),
    Quit,
}

/// Spawn the thread that owns the output stream and every live sink.
///
/// `ready` receives exactly one message: whether an output device could be
/// opened. Finished sinks are reported on `events` and dropped, and so are
/// files that fail to decode.
pub(super) fn spawn_audio_thread(
    rx: Receiver<SinkCmd>,
    events: Sender<BackendEvent>,
    ready: SyncSender<Result<(), BackendError>>,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(BackendError::NoOutputDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; keep the shell's output clean.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let poll = Duration::from_millis(settings.poll_interval_ms.max(1));
        let mut volume = settings.volume;
        let mut sinks: HashMap<DecoderHandle, Sink> = HashMap::new();

        loop {
            match rx.recv_timeout(poll) {
                Ok(SinkCmd::Load { handle, path }) => {
                    if let Some(source) = load(handle, path, &events) {
                        sinks.insert(handle, create_sink(&stream, source, volume));
                    }
                }
                Ok(SinkCmd::Start(handle)) => match sinks.get(&handle) {
                    Some(s) => s.play(),
                    None => debug!(%handle, "start for unknown sink"),
                },
                Ok(SinkCmd::Pause(handle)) => match sinks.get(&handle) {
                    Some(s) => s.pause(),
                    None => debug!(%handle, "pause for unknown sink"),
                },
                Ok(SinkCmd::Stop(handle)) => {
                    if let Some(s) = sinks.remove(&handle) {
                        s.stop();
                    }
                }
                Ok(SinkCmd::SetVolume(v)) => {
                    volume = v;
                    for s in sinks.values() {
                        s.set_volume(v);
                    }
                }
                Ok(SinkCmd::Quit) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            report_finished(&mut sinks, &events);
        }

        for (_, s) in sinks.drain() {
            s.stop();
        }
    })
}

/// Decode `path` for `handle`, reporting a failure on `events`.
pub(super) fn load(
    handle: DecoderHandle,
    path: PathBuf,
    events: &Sender<BackendEvent>,
) -> Option<FileSource> {
    match decode(&path) {
        Ok(source) => Some(source),
        Err(error) => {
            debug!(%handle, path = %path.display(), %error, "decode failed");
            if events.send(BackendEvent::Failed { handle, error }).is_err() {
                debug!(%handle, "no listener for decode failure");
            }
            None
        }
    }
}

/// A playing sink with nothing left queued has reached the end of its track.
fn report_finished(sinks: &mut HashMap<DecoderHandle, Sink>, events: &Sender<BackendEvent>) {
    let finished: Vec<DecoderHandle> = sinks
        .iter()
        .filter(|(_, s)| !s.is_paused() && s.empty())
        .map(|(h, _)| *h)
        .collect();

    for handle in finished {
        sinks.remove(&handle);
        trace!(%handle, "sink drained");
        if events.send(BackendEvent::Finished(handle)).is_err() {
            debug!(%handle, "no listener for completion");
        }
    }
}
