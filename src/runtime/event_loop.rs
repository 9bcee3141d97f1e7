use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use platter::config::Settings;
use platter::playback::{AudioBackend, PlaybackController};
use platter::{Engine, LibraryError, PlaybackError, ScanOutcome, SearchIndex};

use super::commands::{Command, HELP, VOLUME_STEP, VolumeChange};

type PendingScan = JoinHandle<Result<ScanOutcome, LibraryError>>;

/// Shell state carried across input lines.
pub struct Session {
    /// Folder the next `rescan` reads.
    pub folder: PathBuf,
    settings: Settings,
    pending: Vec<PendingScan>,
}

impl Session {
    pub fn new(folder: PathBuf, settings: Settings) -> Self {
        Self {
            folder,
            settings,
            pending: Vec::new(),
        }
    }

    /// Wait for every outstanding rescan and report it.
    pub fn finish_scans(&mut self, out: &mut impl Write) -> io::Result<()> {
        for handle in self.pending.drain(..) {
            report_scan(handle, out)?;
        }
        Ok(())
    }

    fn reap_scans(&mut self, out: &mut impl Write) -> io::Result<()> {
        let (done, running): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|h| h.is_finished());
        self.pending = running;
        for handle in done {
            report_scan(handle, out)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Read commands from `input` until `quit` or EOF. Playback is stopped on the
/// way out.
pub fn run<B, R, W>(
    engine: &Engine<B>,
    session: &mut Session,
    input: R,
    mut out: W,
) -> io::Result<()>
where
    B: AudioBackend + Send + 'static,
    R: BufRead,
    W: Write,
{
    let queued = engine.with(|c| c.queue().len());
    writeln!(out, "{queued} tracks queued; type `help` for commands")?;

    for line in input.lines() {
        let line = line?;
        session.reap_scans(&mut out)?;

        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        debug!(?cmd, "shell command");

        if execute(engine, session, cmd, &mut out)? == Flow::Quit {
            break;
        }
        out.flush()?;
    }

    engine.with(|c| c.stop());
    session.finish_scans(&mut out)?;
    Ok(())
}

/// Apply one command and print its result. Output is rendered under the lock
/// and written after it is released.
pub fn execute<B, W>(
    engine: &Engine<B>,
    session: &mut Session,
    cmd: Command,
    out: &mut W,
) -> io::Result<Flow>
where
    B: AudioBackend + Send + 'static,
    W: Write,
{
    let result: Result<(), PlaybackError> = match cmd {
        Command::Play => engine.with(|c| c.play()),
        Command::Pause => engine.with(|c| c.pause()),
        Command::Toggle => engine.with(|c| c.toggle_play_pause()),
        Command::Stop => {
            engine.with(|c| c.stop());
            Ok(())
        }
        Command::Next => engine.with(|c| c.next()),
        Command::Prev => engine.with(|c| c.previous()),
        Command::Goto(n) => engine.with(|c| c.play_at(n - 1)),
        Command::Remove(n) => match engine.with(|c| c.remove(n - 1)) {
            Ok(track) => {
                writeln!(out, "removed {}", track.display())?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        Command::Clear => {
            engine.with(|c| c.clear());
            Ok(())
        }
        Command::Repeat(mode) => {
            let mode = engine.with(|c| match mode {
                Some(m) => {
                    c.set_repeat_mode(m);
                    m
                }
                None => c.cycle_repeat_mode(),
            });
            writeln!(out, "repeat {mode}")?;
            Ok(())
        }
        Command::Shuffle(mode) => {
            let mode = engine.with(|c| match mode {
                Some(m) => {
                    c.set_shuffle_mode(m);
                    m
                }
                None => c.toggle_shuffle(),
            });
            writeln!(out, "shuffle {mode}")?;
            Ok(())
        }
        Command::Search(query) => {
            let lines = engine.with(|c| search(c, &query));
            write_lines(out, &lines)?;
            Ok(())
        }
        Command::List => {
            let lines = engine.with(|c| list(c));
            write_lines(out, &lines)?;
            Ok(())
        }
        Command::Status => {
            let line = engine.with(|c| status(c));
            writeln!(out, "{line}")?;
            Ok(())
        }
        Command::Add(path) => {
            match engine.add_file(&path) {
                Ok(track) => writeln!(out, "added {}", track.display())?,
                Err(e) => writeln!(out, "error: {e}")?,
            }
            Ok(())
        }
        Command::Volume(change) => {
            let volume = engine.with(|c| match change {
                VolumeChange::Show => c.volume(),
                VolumeChange::Up => c.adjust_volume(VOLUME_STEP),
                VolumeChange::Down => c.adjust_volume(-VOLUME_STEP),
                VolumeChange::Set(v) => c.set_volume(v),
            });
            writeln!(out, "volume {:.0}%", volume * 100.0)?;
            Ok(())
        }
        Command::Rescan(folder) => {
            if let Some(folder) = folder {
                session.folder = folder;
            }
            writeln!(out, "rescanning {}", session.folder.display())?;
            session.pending.push(engine.rescan(session.folder.clone()));
            Ok(())
        }
        Command::Config => {
            match session.settings.to_toml() {
                Ok(s) => write!(out, "{s}")?,
                Err(e) => writeln!(out, "cannot render config: {e}")?,
            }
            Ok(())
        }
        Command::Help => {
            writeln!(out, "{HELP}")?;
            Ok(())
        }
        Command::Quit => return Ok(Flow::Quit),
    };

    if let Err(e) = result {
        writeln!(out, "error: {e}")?;
    }
    Ok(Flow::Continue)
}

fn write_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn search<B: AudioBackend>(c: &PlaybackController<B>, query: &str) -> Vec<String> {
    let queue = c.queue();
    let mut lines: Vec<String> = SearchIndex::new(queue)
        .matching(query)
        .filter_map(|i| queue.get(i).map(|t| format!("{:>4}. {}", i + 1, t.display())))
        .collect();
    lines.push(format!("{} match(es)", lines.len()));
    lines
}

fn list<B: AudioBackend>(c: &PlaybackController<B>) -> Vec<String> {
    let current = c.current_index();
    let mut lines: Vec<String> = c
        .queue()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if Some(i) == current { '>' } else { ' ' };
            format!("{marker}{:>4}. {}", i + 1, track.display())
        })
        .collect();
    if lines.is_empty() {
        lines.push("(queue is empty)".to_string());
    }
    lines
}

fn status<B: AudioBackend>(c: &PlaybackController<B>) -> String {
    let now = match (c.current_index(), c.current_track()) {
        (Some(i), Some(t)) => format!("{}/{} {}", i + 1, c.queue().len(), t.display()),
        _ => format!("-/{}", c.queue().len()),
    };
    format!(
        "{} | repeat {} | shuffle {} | vol {:.0}% | {now}",
        c.state(),
        c.repeat_mode(),
        c.shuffle_mode(),
        c.volume() * 100.0
    )
}

fn report_scan(handle: PendingScan, out: &mut impl Write) -> io::Result<()> {
    match handle.join() {
        Ok(Ok(ScanOutcome::Applied { tracks, .. })) => writeln!(out, "rescan: {tracks} tracks"),
        Ok(Ok(ScanOutcome::Superseded)) => Ok(()),
        Ok(Err(e)) => {
            warn!(error = %e, "rescan failed");
            writeln!(out, "rescan failed: {e}")
        }
        Err(_) => {
            warn!("rescan thread panicked");
            Ok(())
        }
    }
}
