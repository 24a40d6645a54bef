use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::state_dir;

/// `<state_dir>/encore.log`.
fn log_file_path() -> Option<PathBuf> {
    state_dir().map(|d| d.join("encore.log"))
}

/// Route `tracing` output to the log file; stdout belongs to the TUI.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Without a writable
/// log file, events are dropped.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = log_file_path() else {
        return;
    };
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match File::create(&log_path) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .try_init();
        }
        Err(e) => {
            eprintln!("encore: failed to create log file at {}: {e}", log_path.display());
        }
    }
}
