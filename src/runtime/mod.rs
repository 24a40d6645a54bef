//! Terminal host: wires the library scan, engine, visualizer and UI together.

use std::env;
use std::path::Path;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::library::scan;
use crate::playback::{EngineOptions, PlaybackEngine};
use crate::prefs::prefs_path;
use crate::sink::{AudioSink, NullSink, RodioSink};
use crate::spectrum::SpectrumVisualizer;
use crate::tap::{AnalyserOptions, TapRegistry};

mod event_loop;
mod logging;
mod settings;
mod startup;

const LOG_TARGET: &str = "encore::runtime";

/// Open the default output device, or play silently when there is none.
fn open_sink() -> Box<dyn AudioSink> {
    match RodioSink::open() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!(target: LOG_TARGET, "no audio output ({e}); playing silently");
            Box::new(NullSink::new())
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(target: LOG_TARGET, "found {} tracks in {dir}", tracks.len());

    let mut engine = PlaybackEngine::new(open_sink(), EngineOptions::from(&settings.playback));
    let states = engine.subscribe()?;

    let prefs_path = prefs_path();
    let prefs = startup::initial_prefs(&settings, prefs_path.as_deref());
    startup::apply_playback_defaults(&mut engine, &prefs, tracks)?;

    let mut registry = TapRegistry::new(AnalyserOptions::from(&settings.visualizer));
    let mut visualizer = SpectrumVisualizer::from_settings(&settings.visualizer);
    visualizer.attach(&mut registry, engine.signal_tap().as_ref());

    let mut app = App::new();
    app.set_current_dir(dir);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings, prefs, prefs_path.clone());

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut engine,
            &mut visualizer,
            &states,
            &mut state,
        )
    })();

    visualizer.dispose();
    engine.dispose();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
