use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ENCORE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ENCORE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let p = &self.playback;
        if !(0.0..=1.0).contains(&p.volume) {
            return Err("playback.volume must be within [0, 1]".to_string());
        }
        if p.tick_interval_ms == 0 {
            return Err("playback.tick_interval_ms must be >= 1".to_string());
        }
        if !p.restart_threshold_secs.is_finite() || p.restart_threshold_secs < 0.0 {
            return Err("playback.restart_threshold_secs must be >= 0".to_string());
        }

        let v = &self.visualizer;
        if v.bar_count == 0 {
            return Err("visualizer.bar_count must be >= 1".to_string());
        }
        if v.frame_interval_ms == 0 {
            return Err("visualizer.frame_interval_ms must be >= 1".to_string());
        }
        if !v.fft_size.is_power_of_two() || !(32..=32768).contains(&v.fft_size) {
            return Err("visualizer.fft_size must be a power of two in [32, 32768]".to_string());
        }
        if !(0.0..=1.0).contains(&v.smoothing_time_constant) {
            return Err("visualizer.smoothing_time_constant must be within [0, 1]".to_string());
        }
        if v.max_decibels <= v.min_decibels {
            return Err("visualizer.max_decibels must be greater than min_decibels".to_string());
        }

        if self.controls.volume_step <= 0.0 || self.controls.seek_seconds <= 0.0 {
            return Err("controls.volume_step and controls.seek_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `ENCORE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ENCORE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/encore/config.toml`
/// or `~/.config/encore/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("encore").join("config.toml"))
}

/// Directory for runtime state (prefs, log file): `$XDG_STATE_HOME/encore`
/// or `~/.local/state/encore`.
pub fn state_dir() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("encore"))
}
