use super::*;
use crate::error::{BackendError, PlaybackError};
use crate::library::{TagInfo, Track};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Open(String),
    Start(u64),
    Pause(u64),
    Stop(u64),
    Volume(String),
}

/// Backend that records every call and can be told to reject some files.
#[derive(Default)]
struct FakeBackend {
    calls: Vec<Call>,
    next_id: u64,
    reject: Vec<PathBuf>,
}

impl FakeBackend {
    fn rejecting(path: &str) -> Self {
        Self {
            reject: vec![PathBuf::from(path)],
            ..Self::default()
        }
    }

    fn opened(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Open(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl AudioBackend for FakeBackend {
    fn open(&mut self, path: &Path) -> Result<DecoderHandle, BackendError> {
        self.calls.push(Call::Open(path.display().to_string()));
        if self.reject.iter().any(|p| p == path) {
            return Err(BackendError::Decode {
                path: path.to_path_buf(),
                reason: "unsupported".into(),
            });
        }
        self.next_id += 1;
        Ok(DecoderHandle::new(self.next_id))
    }

    fn start(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        self.calls.push(Call::Start(handle.id()));
        Ok(())
    }

    fn pause(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        self.calls.push(Call::Pause(handle.id()));
        Ok(())
    }

    fn stop(&mut self, handle: DecoderHandle) -> Result<(), BackendError> {
        self.calls.push(Call::Stop(handle.id()));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), BackendError> {
        self.calls.push(Call::Volume(format!("{volume:.2}")));
        Ok(())
    }
}

/// Picker replaying fixed raw draws.
struct Scripted(VecDeque<usize>);

impl IndexPicker for Scripted {
    fn pick_below(&mut self, upper: usize) -> usize {
        self.0.pop_front().unwrap_or(0) % upper
    }
}

fn t(name: &str) -> Arc<Track> {
    Arc::new(Track::new(format!("/music/{name}.mp3"), TagInfo::default()))
}

fn controller(names: &[&str]) -> PlaybackController<FakeBackend> {
    let mut c = PlaybackController::new(FakeBackend::default());
    c.extend(names.iter().map(|n| t(n)));
    c
}

fn current_title<B: AudioBackend>(c: &PlaybackController<B>) -> Option<&str> {
    c.current_track().map(|t| t.title())
}

#[test]
fn starts_stopped_with_modes_off() {
    let c = controller(&[]);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.repeat_mode(), RepeatMode::Off);
    assert_eq!(c.shuffle_mode(), ShuffleMode::Off);
    assert!(c.queue().is_empty());
}

#[test]
fn play_on_empty_queue_fails() {
    let mut c = controller(&[]);
    assert!(matches!(c.play(), Err(PlaybackError::EmptyQueue)));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn play_opens_current_track() {
    let mut c = controller(&["A", "B"]);
    c.play().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.backend().opened(), vec!["/music/A.mp3"]);
    assert_eq!(c.current_handle(), Some(DecoderHandle::new(1)));
}

#[test]
fn play_while_playing_is_invalid() {
    let mut c = controller(&["A"]);
    c.play().unwrap();
    let err = c.play().unwrap_err();
    assert!(matches!(
        err,
        PlaybackError::InvalidState { op: "play", state: PlaybackState::Playing }
    ));
}

#[test]
fn pause_only_from_playing() {
    let mut c = controller(&["A"]);
    assert!(matches!(c.pause(), Err(PlaybackError::InvalidState { .. })));

    c.play().unwrap();
    c.pause().unwrap();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert!(matches!(c.pause(), Err(PlaybackError::InvalidState { .. })));
}

#[test]
fn resume_from_pause_reuses_handle() {
    let mut c = controller(&["A"]);
    c.play().unwrap();
    c.pause().unwrap();
    c.play().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(
        c.backend().calls,
        vec![
            Call::Open("/music/A.mp3".into()),
            Call::Start(1),
            Call::Pause(1),
            Call::Start(1),
        ]
    );
}

#[test]
fn toggle_play_pause_flips_state() {
    let mut c = controller(&["A"]);
    c.toggle_play_pause().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    c.toggle_play_pause().unwrap();
    assert_eq!(c.state(), PlaybackState::Paused);
    c.toggle_play_pause().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn stop_is_valid_from_any_state_and_releases_handle() {
    let mut c = controller(&["A"]);
    c.stop();
    assert_eq!(c.state(), PlaybackState::Stopped);

    c.play().unwrap();
    c.stop();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_handle(), None);
    assert_eq!(c.backend().calls.last(), Some(&Call::Stop(1)));
}

#[test]
fn backend_failure_surfaces_and_stays_stopped() {
    let mut c = PlaybackController::new(FakeBackend::rejecting("/music/A.mp3"));
    c.extend([t("A"), t("B")]);

    let err = c.play().unwrap_err();
    match err {
        PlaybackError::PlaybackFailed { path, source } => {
            assert_eq!(path, PathBuf::from("/music/A.mp3"));
            assert!(matches!(source, BackendError::Decode { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.queue().len(), 2);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn failure_while_advancing_keeps_queue_intact() {
    let mut c = PlaybackController::new(FakeBackend::rejecting("/music/B.mp3"));
    c.extend([t("A"), t("B"), t("C")]);
    c.play().unwrap();

    assert!(matches!(c.next(), Err(PlaybackError::PlaybackFailed { .. })));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.queue().len(), 3);

    // The shell can skip past the broken file.
    c.next().unwrap();
    assert_eq!(current_title(&c), Some("C"));
    c.play().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn next_while_playing_restarts_on_new_index() {
    let mut c = controller(&["A", "B", "C"]);
    c.play().unwrap();
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(current_title(&c), Some("B"));
    assert_eq!(c.backend().opened(), vec!["/music/A.mp3", "/music/B.mp3"]);
    assert!(c.backend().calls.contains(&Call::Stop(1)));
}

#[test]
fn next_while_stopped_only_moves_cursor() {
    let mut c = controller(&["A", "B", "C"]);
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(1));
    assert!(c.backend().calls.is_empty());
}

#[test]
fn next_while_paused_moves_cursor_and_play_opens_new_track() {
    let mut c = controller(&["A", "B"]);
    c.play().unwrap();
    c.pause().unwrap();
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.current_handle(), None);

    c.play().unwrap();
    assert_eq!(c.backend().opened(), vec!["/music/A.mp3", "/music/B.mp3"]);
}

#[test]
fn next_on_last_with_repeat_off_stops_in_place() {
    let mut c = controller(&["A", "B", "C"]);
    c.play_at(2).unwrap();
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn next_on_last_with_repeat_all_wraps() {
    let mut c = controller(&["A", "B", "C"]);
    c.set_repeat_mode(RepeatMode::RepeatAll);
    c.play_at(2).unwrap();
    c.next().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn previous_mirrors_low_boundary() {
    let mut c = controller(&["A", "B", "C"]);
    c.play().unwrap();
    c.previous().unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(0));

    c.set_repeat_mode(RepeatMode::RepeatAll);
    c.play().unwrap();
    c.previous().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(2));

    c.previous().unwrap();
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn user_next_ignores_repeat_one() {
    let mut c = controller(&["A", "B"]);
    c.set_repeat_mode(RepeatMode::RepeatOne);
    c.play().unwrap();
    c.next().unwrap();
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn next_on_empty_queue_fails() {
    let mut c = controller(&[]);
    assert!(matches!(c.next(), Err(PlaybackError::EmptyQueue)));
    assert!(matches!(c.previous(), Err(PlaybackError::EmptyQueue)));
}

#[test]
fn finished_advances_sequentially() {
    let mut c = controller(&["A", "B", "C"]);
    c.play().unwrap();
    c.track_finished_naturally().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(current_title(&c), Some("B"));
}

#[test]
fn finished_on_last_without_repeat_stops_in_place() {
    let mut c = controller(&["A", "B", "C"]);
    c.play_at(2).unwrap();
    c.track_finished_naturally().unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn finished_on_last_with_repeat_all_wraps_and_keeps_playing() {
    let mut c = controller(&["A", "B", "C"]);
    c.set_repeat_mode(RepeatMode::RepeatAll);
    c.play_at(2).unwrap();
    c.track_finished_naturally().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn finished_with_repeat_one_replays_same_index() {
    let mut c = controller(&["A", "B", "C"]);
    c.set_repeat_mode(RepeatMode::RepeatOne);
    c.set_shuffle_mode(ShuffleMode::On);
    c.play_at(1).unwrap();
    for _ in 0..5 {
        c.track_finished_naturally().unwrap();
        assert_eq!(c.current_index(), Some(1));
        assert_eq!(c.state(), PlaybackState::Playing);
    }
    assert_eq!(c.backend().opened().len(), 6);
}

#[test]
fn finished_with_shuffle_uses_injected_draws() {
    // Raw draws index into the queue with the current entry skipped.
    let picker = Scripted(VecDeque::from([2, 0, 1]));
    let mut c = PlaybackController::with_picker(FakeBackend::default(), picker);
    c.extend(["A", "B", "C", "D"].into_iter().map(t));
    c.set_shuffle_mode(ShuffleMode::On);
    c.play().unwrap();

    c.track_finished_naturally().unwrap(); // from 0: candidates [1,2,3], draw 2 -> 3
    assert_eq!(c.current_index(), Some(3));
    c.track_finished_naturally().unwrap(); // from 3: candidates [0,1,2], draw 0 -> 0
    assert_eq!(c.current_index(), Some(0));
    c.track_finished_naturally().unwrap(); // from 0: draw 1 -> 2
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn shuffle_on_two_tracks_always_alternates() {
    let mut c = controller(&["A", "B"]);
    c.set_shuffle_mode(ShuffleMode::On);
    c.set_repeat_mode(RepeatMode::RepeatAll);
    c.play().unwrap();
    let mut last = c.current_index();
    for _ in 0..20 {
        c.track_finished_naturally().unwrap();
        assert_ne!(c.current_index(), last);
        last = c.current_index();
    }
}

#[test]
fn shuffle_on_single_track_repeats_it() {
    let mut c = controller(&["A"]);
    c.set_shuffle_mode(ShuffleMode::On);
    c.play().unwrap();
    c.track_finished_naturally().unwrap();
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Playing);
    c.next().unwrap();
    assert_eq!(c.current_index(), Some(0));
}

#[test]
fn shuffle_applies_to_user_next_and_previous() {
    let picker = Scripted(VecDeque::from([0, 1]));
    let mut c = PlaybackController::with_picker(FakeBackend::default(), picker);
    c.extend(["A", "B", "C"].into_iter().map(t));
    c.set_shuffle_mode(ShuffleMode::On);
    c.play_at(1).unwrap();

    c.next().unwrap(); // from 1: candidates [0,2], draw 0 -> 0
    assert_eq!(c.current_index(), Some(0));
    c.previous().unwrap(); // from 0: candidates [1,2], draw 1 -> 2
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn finished_is_ignored_unless_playing() {
    let mut c = controller(&["A", "B"]);
    c.track_finished_naturally().unwrap();
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn stale_backend_completion_is_ignored() {
    let mut c = controller(&["A", "B", "C"]);
    c.play().unwrap();
    let first = c.current_handle().unwrap();
    c.next().unwrap();

    assert!(!c.on_backend_finished(first).unwrap());
    assert_eq!(c.current_index(), Some(1));

    let second = c.current_handle().unwrap();
    assert!(c.on_backend_finished(second).unwrap());
    assert_eq!(c.current_index(), Some(2));
}

#[test]
fn clear_resets_everything() {
    let mut c = controller(&["A", "B"]);
    c.play().unwrap();
    c.clear();
    assert!(c.queue().is_empty());
    assert_eq!(c.current_index(), None);
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn removing_current_track_stops_playback() {
    let mut c = controller(&["A", "B", "C"]);
    c.play_at(1).unwrap();
    let removed = c.remove(1).unwrap();
    assert_eq!(removed.title(), "B");
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(current_title(&c), Some("C"));
}

#[test]
fn removing_earlier_track_keeps_playing_same_track() {
    let mut c = controller(&["A", "B", "C"]);
    c.play_at(1).unwrap();
    c.remove(0).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(0));
    assert_eq!(current_title(&c), Some("B"));
    let titles: Vec<&str> = c.queue().iter().map(|t| t.title()).collect();
    assert_eq!(titles, vec!["B", "C"]);
}

#[test]
fn remove_out_of_range_reports_and_changes_nothing() {
    let mut c = controller(&["A"]);
    c.play().unwrap();
    assert!(matches!(c.remove(3), Err(PlaybackError::OutOfRange { index: 3, len: 1 })));
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn replace_all_keeps_playing_when_current_survives() {
    let mut c = controller(&["A", "B"]);
    c.play_at(1).unwrap();
    c.replace_all(vec![t("B"), t("C")]);
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(0));

    c.replace_all(vec![t("X")]);
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), None);

    // play() falls back to the first entry.
    c.play().unwrap();
    assert_eq!(current_title(&c), Some("X"));
}

#[test]
fn play_at_validates_index() {
    let mut c = controller(&["A"]);
    assert!(matches!(c.play_at(5), Err(PlaybackError::OutOfRange { .. })));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn mode_setters_have_no_playback_side_effects() {
    let mut c = controller(&["A"]);
    c.play().unwrap();
    let calls = c.backend().calls.len();
    assert_eq!(c.cycle_repeat_mode(), RepeatMode::RepeatAll);
    assert_eq!(c.toggle_shuffle(), ShuffleMode::On);
    c.set_repeat_mode(RepeatMode::Off);
    assert_eq!(c.backend().calls.len(), calls);
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn completion_racing_a_pause_releases_the_spent_handle() {
    let mut c = controller(&["A", "B"]);
    c.play().unwrap();
    let h = c.current_handle().unwrap();
    c.pause().unwrap();

    // The track ran out just before the pause took effect.
    assert!(c.on_backend_finished(h).unwrap());
    assert_eq!(c.state(), PlaybackState::Paused);
    assert_eq!(c.current_handle(), None);
    assert_eq!(c.current_index(), Some(0));
    assert!(c.backend().calls.contains(&Call::Stop(h.id())));

    c.play().unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.backend().opened(), vec!["/music/A.mp3", "/music/A.mp3"]);
    assert_ne!(c.current_handle(), Some(h));
}

#[test]
fn async_failure_of_live_handle_stops_and_reports() {
    let mut c = controller(&["A", "B"]);
    c.play_at(1).unwrap();
    let h = c.current_handle().unwrap();

    let err = c
        .on_backend_failed(
            h,
            BackendError::Decode {
                path: PathBuf::from("/music/B.mp3"),
                reason: "truncated".into(),
            },
        )
        .unwrap_err();
    match err {
        PlaybackError::PlaybackFailed { path, .. } => assert_eq!(path, Path::new("/music/B.mp3")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current_index(), Some(1));
    assert_eq!(c.queue().len(), 2);
    assert_eq!(c.current_handle(), None);
}

#[test]
fn async_failure_of_stale_handle_is_ignored() {
    let mut c = controller(&["A", "B"]);
    c.play().unwrap();
    let first = c.current_handle().unwrap();
    c.next().unwrap();

    let routed = c.on_backend_failed(first, BackendError::Disconnected).unwrap();
    assert!(!routed);
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current_index(), Some(1));
}

#[test]
fn volume_is_clamped_and_forwarded() {
    let mut c = controller(&["A"]);
    assert_eq!(c.volume(), 1.0);

    assert_eq!(c.set_volume(0.5), 0.5);
    assert_eq!(c.set_volume(7.0), 1.0);
    assert_eq!(c.set_volume(-1.0), 0.0);
    assert_eq!(c.set_volume(f32::NAN), 0.0);

    let volumes: Vec<&str> = c
        .backend()
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Volume(v) => Some(v.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(volumes, vec!["0.50", "1.00", "0.00"]);
}

#[test]
fn volume_steps_stay_in_range_and_survive_track_changes() {
    let mut c = controller(&["A", "B"]);
    c.set_volume(0.95);
    assert_eq!(c.adjust_volume(0.1), 1.0);
    let v = c.adjust_volume(-0.1);
    assert!((v - 0.9).abs() < 1e-6);

    c.play().unwrap();
    c.next().unwrap();
    assert!((c.volume() - 0.9).abs() < 1e-6);
    assert_eq!(c.state(), PlaybackState::Playing);
}

#[test]
fn queue_remove_reports_whether_the_cursor_was_hit() {
    let mut queue = Queue::from_tracks(vec![t("A"), t("B")]);
    queue.select(1).unwrap();

    let Removed { track, was_current } = queue.remove(1).unwrap();
    assert_eq!(track.title(), "B");
    assert!(was_current);

    let Removed { was_current, .. } = queue.remove(0).unwrap();
    assert!(was_current);
    assert_eq!(queue.current_index(), None);
}
