use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub visualizer: VisualizerSettings,
    pub controls: ControlsSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Start playing as soon as a new queue is loaded.
    pub autoplay: bool,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default repeat mode.
    pub repeat_mode: RepeatModeSetting,
    /// Initial output volume in `[0, 1]`.
    pub volume: f32,
    /// "Previous" restarts the current track when playback is further in than this.
    pub restart_threshold_secs: f64,
    /// How often the engine polls the sink for position updates (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            shuffle: false,
            repeat_mode: RepeatModeSetting::None,
            volume: 1.0,
            restart_threshold_secs: 3.0,
            tick_interval_ms: 250,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[default]
    #[serde(alias = "no-loop", alias = "no_loop", alias = "off")]
    None,
    #[serde(alias = "repeat-one", alias = "loop-one", alias = "loop_one")]
    One,
    #[serde(alias = "repeat-all", alias = "loop-all", alias = "loop_all", alias = "loop-around")]
    All,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// Number of equalizer bars.
    pub bar_count: usize,
    /// Gain applied to live magnitudes, clamped to `[0.1, 3.0]`.
    pub sensitivity: f32,
    /// Whether the host draws the glow accent while playing.
    pub show_glow: bool,
    /// Animation tick interval (milliseconds).
    pub frame_interval_ms: u64,
    /// FFT window length; must be a power of two.
    pub fft_size: usize,
    /// Weight of the previous analyser frame in `[0, 1]`.
    pub smoothing_time_constant: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            bar_count: 16,
            sensitivity: 1.5,
            show_glow: true,
            frame_interval_ms: 50,
            fft_size: 512,
            smoothing_time_constant: 0.8,
            min_decibels: -90.0,
            max_decibels: -10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `h` / `l`.
    pub seek_seconds: f64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5.0,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}
