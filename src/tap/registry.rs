use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, info};

use crate::error::TapError;

use super::analyser::{AnalyserOptions, FrequencyAnalyser};
use super::ring::SampleTap;

const LOG_TARGET: &str = "encore::tap";

/// One analyser per underlying tap, shared by every visualizer reading it.
///
/// The analyser attaches the tap when created and detaches it when the last
/// [`AnalyserHandle`] is dropped, so teardown happens exactly once no matter
/// how many readers came and went.
struct SharedAnalyser {
    tap: SampleTap,
    analyser: Mutex<FrequencyAnalyser>,
    scratch: Mutex<Vec<f32>>,
}

impl Drop for SharedAnalyser {
    fn drop(&mut self) {
        if self.tap.detach() {
            info!(target: LOG_TARGET, "signal tap {} released", self.tap.id());
        }
    }
}

#[derive(Clone)]
pub struct AnalyserHandle {
    shared: Arc<SharedAnalyser>,
}

impl std::fmt::Debug for AnalyserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyserHandle")
            .field("tap", &self.shared.tap)
            .finish()
    }
}

impl AnalyserHandle {
    pub fn tap_id(&self) -> u64 {
        self.shared.tap.id()
    }

    /// Whether two handles read through the same analyser.
    pub fn shares_analyser_with(&self, other: &AnalyserHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Drain the tap into the analyser and produce one frame of byte magnitudes.
    pub fn byte_frequency_data(&self, out: &mut Vec<u8>) -> Result<(), TapError> {
        let mut scratch = self.shared.scratch.lock().map_err(poisoned)?;
        let mut analyser = self.shared.analyser.lock().map_err(poisoned)?;

        scratch.clear();
        self.shared.tap.drain_into(&mut scratch);
        analyser.push_samples(&scratch);
        analyser.byte_frequency_data(out);
        Ok(())
    }
}

fn poisoned<T>(_: T) -> TapError {
    TapError::Unavailable {
        reason: "analyser lock poisoned".to_string(),
    }
}

pub struct TapRegistry {
    options: AnalyserOptions,
    live: HashMap<u64, Weak<SharedAnalyser>>,
}

impl TapRegistry {
    pub fn new(options: AnalyserOptions) -> Self {
        Self {
            options,
            live: HashMap::new(),
        }
    }

    /// Return the analyser already reading `tap`, or create one (attaching the tap).
    pub fn acquire(&mut self, tap: Option<&SampleTap>) -> Result<AnalyserHandle, TapError> {
        let Some(tap) = tap else {
            return Err(TapError::Unavailable {
                reason: "audio sink exposes no signal tap".to_string(),
            });
        };

        self.live.retain(|_, w| w.strong_count() > 0);

        if let Some(shared) = self.live.get(&tap.id()).and_then(Weak::upgrade) {
            debug!(target: LOG_TARGET, "reusing analyser for signal tap {}", tap.id());
            return Ok(AnalyserHandle { shared });
        }

        if !tap.attach() {
            return Err(TapError::Unavailable {
                reason: format!("signal tap {} is owned by another reader", tap.id()),
            });
        }

        let shared = Arc::new(SharedAnalyser {
            tap: tap.clone(),
            analyser: Mutex::new(FrequencyAnalyser::new(self.options)),
            scratch: Mutex::new(Vec::new()),
        });
        self.live.insert(tap.id(), Arc::downgrade(&shared));
        info!(target: LOG_TARGET, "signal tap {} attached", tap.id());

        Ok(AnalyserHandle { shared })
    }

    /// Number of taps with at least one live reader.
    pub fn live_count(&self) -> usize {
        self.live.values().filter(|w| w.strong_count() > 0).count()
    }
}
