use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::App;
use crate::config;
use crate::playback::{PlaybackEngine, PlaybackState};
use crate::prefs::PlayerPrefs;
use crate::schedule::Ticker;
use crate::sink::AudioSink;
use crate::spectrum::SpectrumVisualizer;
use crate::ui;

const LOG_TARGET: &str = "encore::runtime";

const SENSITIVITY_STEP: f32 = 0.1;

/// Upper bound on a single input wait, so a cancelled ticker cannot stall the loop.
const MAX_IDLE: Duration = Duration::from_millis(250);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Drives `PlaybackEngine::tick`.
    pub engine_ticker: Ticker,
    /// Drives `SpectrumVisualizer::tick`.
    pub frame_ticker: Ticker,
    /// Origin of the animation clock.
    pub started: Instant,
    /// Last prefs written to disk; a differing state triggers a save.
    pub saved_prefs: PlayerPrefs,
    pub prefs_path: Option<PathBuf>,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings, saved_prefs: PlayerPrefs, prefs_path: Option<PathBuf>) -> Self {
        let now = Instant::now();
        let mut engine_ticker = Ticker::from_millis(settings.playback.tick_interval_ms);
        let mut frame_ticker = Ticker::from_millis(settings.visualizer.frame_interval_ms);
        engine_ticker.start(now);
        frame_ticker.start(now);
        Self {
            engine_ticker,
            frame_ticker,
            started: now,
            saved_prefs,
            prefs_path,
        }
    }

    /// How long the loop may block on input before a ticker is due.
    fn poll_timeout(&self, now: Instant) -> Duration {
        [self.engine_ticker.time_until(now), self.frame_ticker.time_until(now)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(MAX_IDLE)
            .min(MAX_IDLE)
    }

    fn cancel(&mut self) {
        self.engine_ticker.cancel();
        self.frame_ticker.cancel();
    }

    /// Save prefs when the published state changed one of them.
    fn sync_prefs(&mut self, state: &PlaybackState) {
        let prefs = PlayerPrefs::from_state(state);
        if prefs == self.saved_prefs {
            return;
        }
        self.saved_prefs = prefs;
        let Some(path) = &self.prefs_path else {
            return;
        };
        match prefs.save(path) {
            Ok(()) => debug!(target: LOG_TARGET, "saved prefs to {}", path.display()),
            Err(e) => warn!(target: LOG_TARGET, "failed to save prefs to {}: {e}", path.display()),
        }
    }
}

/// Main terminal event loop: handles input, ticks the engine and the
/// visualizer, and redraws. Returns `Ok(())` when shutdown is requested.
pub fn run<S: AudioSink>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<S>,
    visualizer: &mut SpectrumVisualizer,
    states: &Receiver<PlaybackState>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();

        if state.engine_ticker.poll(now) {
            engine.tick()?;
        }

        // Only the latest snapshot matters for drawing.
        let mut changed = false;
        while let Ok(s) = states.try_recv() {
            app.apply_state(s);
            changed = true;
        }
        if changed {
            state.sync_prefs(&app.state);
        }

        if state.frame_ticker.poll(now) {
            let time_ms = now.duration_since(state.started).as_secs_f64() * 1000.0;
            visualizer.tick(time_ms, app.state.is_playing)?;
        }

        terminal.draw(|f| ui::draw(f, app, visualizer, &settings.controls))?;

        if event::poll(state.poll_timeout(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, engine, visualizer)? {
                    state.cancel();
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_key_event<S: AudioSink>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine<S>,
    visualizer: &mut SpectrumVisualizer,
) -> Result<bool, Box<dyn std::error::Error>> {
    let controls = &settings.controls;

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if app.has_tracks() {
                app.follow_playback_on();
                engine.play_from_queue(app.selected)?;
            }
        }
        KeyCode::Char(' ') => engine.toggle_play_pause()?,
        KeyCode::Char('n') => {
            app.follow_playback_on();
            engine.next()?;
        }
        KeyCode::Char('p') => {
            app.follow_playback_on();
            engine.previous()?;
        }
        KeyCode::Char('h') => engine.seek_by(-controls.seek_seconds)?,
        KeyCode::Char('l') => engine.seek_by(controls.seek_seconds)?,
        KeyCode::Char('s') => engine.toggle_shuffle()?,
        KeyCode::Char('r') => engine.toggle_repeat()?,
        KeyCode::Char('d') => {
            if app.has_tracks() {
                engine.remove_from_queue(app.selected)?;
            }
        }
        KeyCode::Char('J') => {
            let to = app.selected + 1;
            if to < app.tracks().len() {
                app.follow_playback_off();
                engine.move_in_queue(app.selected, to)?;
                app.selected = to;
            }
        }
        KeyCode::Char('K') => {
            if app.has_tracks() && app.selected > 0 {
                let to = app.selected - 1;
                app.follow_playback_off();
                engine.move_in_queue(app.selected, to)?;
                app.selected = to;
            }
        }
        KeyCode::Char('f') => {
            if let Some(track) = app.selected_track() {
                let updated = track.with_favorite(!track.is_favorite);
                engine.update_current_track(updated)?;
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            engine.set_volume(app.state.volume + controls.volume_step)?;
        }
        KeyCode::Char('-') => engine.set_volume(app.state.volume - controls.volume_step)?,
        KeyCode::Char('m') => engine.toggle_mute()?,
        KeyCode::Char('g') => visualizer.toggle_glow(),
        KeyCode::Char('[') => visualizer.set_sensitivity(visualizer.sensitivity() - SENSITIVITY_STEP),
        KeyCode::Char(']') => visualizer.set_sensitivity(visualizer.sensitivity() + SENSITIVITY_STEP),
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::library::Track;
    use crate::playback::{EngineOptions, RepeatMode};
    use crate::sink::NullSink;

    struct Harness {
        settings: config::Settings,
        app: App,
        engine: PlaybackEngine<NullSink>,
        visualizer: SpectrumVisualizer,
        states: Receiver<PlaybackState>,
    }

    impl Harness {
        fn new(ids: &[&str]) -> Self {
            let settings = config::Settings::default();
            let mut engine = PlaybackEngine::new(NullSink::new(), EngineOptions::from(&settings.playback));
            let states = engine.subscribe().unwrap();
            let tracks = ids
                .iter()
                .map(|id| Track::new(*id, *id, "", 120.0, format!("/music/{id}.mp3")))
                .collect();
            engine.set_queue(tracks, 0).unwrap();
            let mut h = Self {
                visualizer: SpectrumVisualizer::from_settings(&settings.visualizer),
                settings,
                app: App::new(),
                engine,
                states,
            };
            h.sync();
            h
        }

        fn press(&mut self, c: char) -> bool {
            self.press_code(KeyCode::Char(c))
        }

        fn press_code(&mut self, code: KeyCode) -> bool {
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            let quit = handle_key_event(
                key,
                &self.settings,
                &mut self.app,
                &mut self.engine,
                &mut self.visualizer,
            )
            .unwrap();
            self.sync();
            quit
        }

        fn sync(&mut self) {
            while let Ok(s) = self.states.try_recv() {
                self.app.apply_state(s);
            }
        }

        fn queue_ids(&self) -> Vec<&str> {
            self.app.tracks().iter().map(|t| t.id.as_str()).collect()
        }
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut h = Harness::new(&["a"]);
        assert!(!h.press('j'));
        assert!(h.press('q'));
    }

    #[test]
    fn transport_keys_drive_the_engine() {
        let mut h = Harness::new(&["a", "b", "c"]);
        assert!(h.app.state.is_playing);

        h.press(' ');
        assert!(!h.app.state.is_playing);

        h.press('n');
        assert_eq!(h.app.current_index(), Some(1));
        assert_eq!(h.app.selected, 1);

        h.press('r');
        assert_eq!(h.app.state.repeat_mode, RepeatMode::One);
        h.press('s');
        assert!(h.app.state.is_shuffling);
    }

    #[test]
    fn enter_plays_the_selected_row() {
        let mut h = Harness::new(&["a", "b", "c"]);
        h.press('k');
        assert_eq!(h.app.selected, 2);
        h.press_code(KeyCode::Enter);
        assert_eq!(h.app.current_index(), Some(2));
        assert!(h.app.state.is_playing);
    }

    #[test]
    fn queue_editing_keys() {
        let mut h = Harness::new(&["a", "b", "c"]);
        h.press('J');
        assert_eq!(h.queue_ids(), vec!["b", "a", "c"]);
        assert_eq!(h.app.selected, 1);

        h.press('K');
        assert_eq!(h.queue_ids(), vec!["a", "b", "c"]);
        assert_eq!(h.app.selected, 0);

        h.press('j');
        h.press('d');
        assert_eq!(h.queue_ids(), vec!["a", "c"]);
    }

    #[test]
    fn favorite_key_replaces_the_selected_track() {
        let mut h = Harness::new(&["a", "b"]);
        h.press('f');
        assert!(h.app.tracks()[0].is_favorite);
        assert!(h.app.state.current_track.as_ref().is_some_and(|t| t.is_favorite));
        h.press('f');
        assert!(!h.app.tracks()[0].is_favorite);
    }

    #[test]
    fn volume_and_visualizer_keys() {
        let mut h = Harness::new(&["a"]);
        h.press('-');
        assert!((h.app.state.volume - 0.95).abs() < 1e-6);
        h.press('+');
        assert!((h.app.state.volume - 1.0).abs() < 1e-6);
        h.press('m');
        assert!(h.app.state.is_muted);

        let before = h.visualizer.sensitivity();
        h.press(']');
        assert!(h.visualizer.sensitivity() > before);
        h.press('[');
        h.press('[');
        assert!(h.visualizer.sensitivity() < before);

        assert!(h.visualizer.show_glow());
        h.press('g');
        assert!(!h.visualizer.show_glow());
    }

    #[test]
    fn prefs_are_saved_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        let settings = config::Settings::default();
        let mut state = EventLoopState::new(&settings, PlayerPrefs::default(), Some(path.clone()));

        state.sync_prefs(&PlaybackState {
            volume: 1.0,
            ..PlaybackState::default()
        });
        assert!(!path.exists());

        let louder = PlaybackState {
            volume: 0.5,
            is_muted: true,
            ..PlaybackState::default()
        };
        state.sync_prefs(&louder);
        assert_eq!(PlayerPrefs::load(&path).unwrap(), PlayerPrefs::from_state(&louder));
    }

    #[test]
    fn poll_timeout_tracks_the_nearest_ticker() {
        let settings = config::Settings::default();
        let mut state = EventLoopState::new(&settings, PlayerPrefs::default(), None);
        let now = state.started;
        assert_eq!(state.poll_timeout(now), Duration::from_millis(50));

        state.cancel();
        assert_eq!(state.poll_timeout(now), MAX_IDLE);
    }
}
