//! Player preferences that survive restarts: volume, mute, repeat and shuffle.
//!
//! Stored as TOML under the state directory and rewritten whenever one of
//! them changes. Config supplies the first-run defaults; once a prefs file
//! exists it wins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{RepeatModeSetting, state_dir};
use crate::error::PrefsError;
use crate::playback::PlaybackState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerPrefs {
    pub volume: f32,
    pub muted: bool,
    pub repeat_mode: RepeatModeSetting,
    pub shuffle: bool,
}

impl Default for PlayerPrefs {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            repeat_mode: RepeatModeSetting::None,
            shuffle: false,
        }
    }
}

impl PlayerPrefs {
    /// Read prefs from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let mut prefs: Self = toml::from_str(&text)?;
        if !prefs.volume.is_finite() {
            prefs.volume = 1.0;
        }
        prefs.volume = prefs.volume.clamp(0.0, 1.0);
        Ok(prefs)
    }

    /// Write prefs to `path`, creating parent directories. The file is
    /// replaced atomically via a sibling temp file.
    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = toml::to_string(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn from_state(state: &PlaybackState) -> Self {
        Self {
            volume: state.volume,
            muted: state.is_muted,
            repeat_mode: state.repeat_mode.into(),
            shuffle: state.is_shuffling,
        }
    }
}

/// `<state_dir>/prefs.toml`, or `None` without a home directory.
pub fn prefs_path() -> Option<PathBuf> {
    state_dir().map(|d| d.join("prefs.toml"))
}
