use tracing::debug;

use platter::config::Settings;
use platter::playback::{AudioBackend, PlaybackController, RandomPicker};

/// Build a controller with the configured startup volume and repeat/shuffle
/// modes.
pub fn build_controller<B: AudioBackend>(backend: B, settings: &Settings) -> PlaybackController<B> {
    let playback = &settings.playback;
    let picker = match playback.shuffle_seed {
        Some(seed) => RandomPicker::seeded(seed),
        None => RandomPicker::from_entropy(),
    };

    let mut controller = PlaybackController::with_picker(backend, picker);
    controller.set_repeat_mode(playback.repeat);
    controller.set_shuffle_mode(playback.shuffle.into());
    controller.set_volume(settings.audio.volume);
    debug!(
        repeat = %playback.repeat,
        shuffle = playback.shuffle,
        seeded = playback.shuffle_seed.is_some(),
        volume = settings.audio.volume,
        "playback defaults applied"
    );
    controller
}
