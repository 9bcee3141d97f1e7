use std::collections::HashSet;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use tracing::debug;

use crate::config::AudioSettings;
use crate::error::BackendError;
use crate::playback::{AudioBackend, BackendEvent, DecoderHandle};

use super::thread::{SinkCmd, spawn_audio_thread};

/// [`AudioBackend`] on rodio's default output device.
///
/// The output stream lives on a dedicated audio thread; this handle only
/// sends it commands, so it can sit behind the engine's mutex. Files are
/// opened and decoded on the audio thread; a failure arrives later as
/// [`BackendEvent::Failed`].
pub struct RodioBackend {
    tx: Sender<SinkCmd>,
    next_id: u64,
    live: HashSet<DecoderHandle>,
    join: Option<JoinHandle<()>>,
}

impl RodioBackend {
    /// Start the audio thread. Returns the backend and the channel on which
    /// it reports finished tracks.
    pub fn spawn(settings: &AudioSettings) -> Result<(Self, Receiver<BackendEvent>), BackendError> {
        let (tx, rx) = mpsc::channel::<SinkCmd>();
        let (events_tx, events_rx) = mpsc::channel::<BackendEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let join = spawn_audio_thread(rx, events_tx, ready_tx, settings.clone());

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = join.join();
                return Err(e);
            }
            Err(_) => return Err(BackendError::Disconnected),
        }

        let backend = Self {
            tx,
            next_id: 0,
            live: HashSet::new(),
            join: Some(join),
        };
        Ok((backend, events_rx))
    }

    fn send(&self, cmd: SinkCmd) -> Result<(), BackendError> {
        self.tx.send(cmd).map_err(|_| BackendError::Disconnected)
    }

    fn ensure_live(&self, handle: DecoderHandle) -> Result<(), BackendError> {
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(BackendError::UnknownHandle(handle.id()))
        }
    }
}

impl AudioBackend for RodioBackend {
    fn open(&mut self, path: &Path) -> Result<DecoderHandle, BackendError> {
        self.next_id += 1;
        let handle = DecoderHandle::new(self.next_id);
        self.send(SinkCmd::Load {
            handle,
            path: path.to_path_buf(),
        })?;
        self.live.insert(handle);
        debug!(%handle, path = %path.display(), "queued for decode");
        Ok(handle)
    }

    fn start(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        self.ensure_live(handle)?;
        self.send(SinkCmd::Start(handle))
    }

    fn pause(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        self.ensure_live(handle)?;
        self.send(SinkCmd::Pause(handle))
    }

    fn stop(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        if self.live.remove(&handle) {
            self.send(SinkCmd::Stop(handle))?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), BackendError> {
        self.send(SinkCmd::SetVolume(volume))
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        let _ = self.send(SinkCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
