use std::env;
use std::io;
use std::path::PathBuf;

use tracing::{info, warn};

use platter::{Engine, LibraryScanner, RodioBackend, ScanOutcome};

mod commands;
mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let folder = match env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => env::current_dir()?,
    };

    let (backend, events) = RodioBackend::spawn(&settings.audio)?;
    let controller = startup::build_controller(backend, &settings);
    let engine = Engine::new(controller, LibraryScanner::new(settings.library.clone()));

    // Detached: it holds an engine clone and ends with the process.
    let _listener = engine.listen(events, |e| warn!(error = %e, "playback stopped"));

    match engine.scan(folder.clone()) {
        Ok(ScanOutcome::Applied { tracks, .. }) => {
            info!(tracks, folder = %folder.display(), "library loaded");
        }
        Ok(ScanOutcome::Superseded) => {}
        Err(e) => warn!(error = %e, "initial scan failed; queue is empty"),
    }

    let mut session = event_loop::Session::new(folder, settings);
    let stdin = io::stdin();
    event_loop::run(&engine, &mut session, stdin.lock(), io::stdout())?;
    Ok(())
}
