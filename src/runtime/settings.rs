use tracing::warn;

use crate::config;

const LOG_TARGET: &str = "encore::runtime";

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!(target: LOG_TARGET, "invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            warn!(target: LOG_TARGET, "failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
