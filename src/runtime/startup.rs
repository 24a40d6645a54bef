use std::path::Path;

use tracing::{info, warn};

use crate::config;
use crate::error::EngineError;
use crate::library::Track;
use crate::playback::PlaybackEngine;
use crate::prefs::PlayerPrefs;
use crate::sink::AudioSink;

const LOG_TARGET: &str = "encore::runtime";

/// Prefs for this session: the saved file when there is one, otherwise the
/// playback defaults from config.
pub fn initial_prefs(settings: &config::Settings, path: Option<&Path>) -> PlayerPrefs {
    let from_config = PlayerPrefs {
        volume: settings.playback.volume,
        muted: false,
        repeat_mode: settings.playback.repeat_mode,
        shuffle: settings.playback.shuffle,
    };

    let Some(path) = path.filter(|p| p.exists()) else {
        return from_config;
    };
    match PlayerPrefs::load(path) {
        Ok(prefs) => {
            info!(target: LOG_TARGET, "restored prefs from {}", path.display());
            prefs
        }
        Err(e) => {
            warn!(target: LOG_TARGET, "ignoring prefs at {}: {e}", path.display());
            from_config
        }
    }
}

/// Apply `prefs` to a fresh engine, then hand it the library.
pub fn apply_playback_defaults<S: AudioSink>(
    engine: &mut PlaybackEngine<S>,
    prefs: &PlayerPrefs,
    tracks: Vec<Track>,
) -> Result<(), EngineError> {
    engine.set_volume(prefs.volume)?;
    if prefs.muted {
        engine.toggle_mute()?;
    }
    engine.set_repeat_mode(prefs.repeat_mode.into())?;
    if prefs.shuffle {
        engine.toggle_shuffle()?;
    }
    engine.set_queue(tracks, 0)
}
