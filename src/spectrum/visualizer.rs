use tracing::{debug, info, warn};

use crate::config::VisualizerSettings;
use crate::error::VisualizerError;
use crate::tap::{AnalyserHandle, SampleTap, TapRegistry};

use super::profile::{BarProfile, clamp_height, live_height, synthetic_height};

const LOG_TARGET: &str = "encore::spectrum";

pub const MIN_SENSITIVITY: f32 = 0.1;
pub const MAX_SENSITIVITY: f32 = 3.0;

const LIVE_KEEP: f32 = 0.85;
const SYNTHETIC_KEEP: f32 = 0.8;
const DECAY: f32 = 0.9;

/// Where the last frame's heights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Stopped, every bar resting at its minimum.
    #[default]
    Idle,
    /// Derived from the signal tap.
    Live,
    /// Generated animation; no usable signal.
    Synthetic,
    /// Stopped, bars still settling toward their minimum.
    Decaying,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumFrame {
    /// One height per bar, in `[0, 100]`.
    pub bars: Vec<f32>,
    pub mode: FrameMode,
}

/// Turns a live or synthetic signal into smoothed equalizer bar heights.
///
/// Call [`tick`](Self::tick) once per animation frame. While playing, bars
/// follow the shared analyser when one is attached and a synthetic animation
/// otherwise, so the row is never blank. When playback stops they decay
/// toward their per-bar minimum instead of snapping down.
#[derive(Debug)]
pub struct SpectrumVisualizer {
    profile: Vec<BarProfile>,
    sensitivity: f32,
    show_glow: bool,
    frame: SpectrumFrame,
    analyser: Option<AnalyserHandle>,
    /// Tap acquisition failed this session; stay synthetic until reset.
    tap_failed: bool,
    bins: Vec<u8>,
    disposed: bool,
}

impl SpectrumVisualizer {
    pub fn new(bar_count: usize, sensitivity: f32) -> Self {
        let profile = BarProfile::row(bar_count.max(1));
        let bars = profile.iter().map(|p| p.min_height).collect();
        Self {
            profile,
            sensitivity: clamp_sensitivity(sensitivity),
            show_glow: true,
            frame: SpectrumFrame {
                bars,
                mode: FrameMode::Idle,
            },
            analyser: None,
            tap_failed: false,
            bins: Vec::new(),
            disposed: false,
        }
    }

    pub fn from_settings(settings: &VisualizerSettings) -> Self {
        let mut v = Self::new(settings.bar_count, settings.sensitivity);
        v.show_glow = settings.show_glow;
        v
    }

    /// Connect to the analyser for `tap`, sharing it with any other
    /// visualizer already reading the same tap. Returns whether the
    /// visualizer is now live.
    ///
    /// A failure is logged once; after that the visualizer stays synthetic
    /// without retrying until [`reset_session`](Self::reset_session).
    pub fn attach(&mut self, registry: &mut TapRegistry, tap: Option<&SampleTap>) -> bool {
        if self.disposed {
            return false;
        }
        if self.analyser.is_some() {
            return true;
        }
        if self.tap_failed {
            debug!(target: LOG_TARGET, "signal tap failed earlier this session; staying synthetic");
            return false;
        }

        match registry.acquire(tap) {
            Ok(handle) => {
                info!(target: LOG_TARGET, "visualizer attached to signal tap {}", handle.tap_id());
                self.analyser = Some(handle);
                true
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "{e}; using synthetic animation");
                self.tap_failed = true;
                false
            }
        }
    }

    /// Forget the tap (and any earlier failure) so the next `attach` retries.
    pub fn reset_session(&mut self) {
        self.analyser = None;
        self.tap_failed = false;
    }

    pub fn is_live(&self) -> bool {
        self.analyser.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Advance one animation frame.
    pub fn tick(&mut self, time_ms: f64, is_playing: bool) -> Result<&SpectrumFrame, VisualizerError> {
        if self.disposed {
            return Err(VisualizerError::Disposed);
        }

        if !is_playing {
            self.decay();
            return Ok(&self.frame);
        }

        let mut bins = std::mem::take(&mut self.bins);
        let read = self.analyser.as_ref().map(|h| h.byte_frequency_data(&mut bins));
        let live = match read {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                warn!(target: LOG_TARGET, "{e}; using synthetic animation");
                self.analyser = None;
                self.tap_failed = true;
                false
            }
            None => false,
        };

        if live && !bins.is_empty() {
            self.update_from_bins(&bins, time_ms);
        } else {
            self.synthesize(time_ms);
        }
        self.bins = bins;
        Ok(&self.frame)
    }

    /// Blend one frame of byte magnitudes (0–255 per bin) into the bars.
    pub fn update_from_bins(&mut self, bins: &[u8], time_ms: f64) {
        if bins.is_empty() {
            self.synthesize(time_ms);
            return;
        }
        for (i, (bar, p)) in self.frame.bars.iter_mut().zip(&self.profile).enumerate() {
            let target = live_height(p, i, bins, self.sensitivity, time_ms);
            *bar = clamp_height(*bar * LIVE_KEEP + target * (1.0 - LIVE_KEEP), p.min_height, 100.0);
        }
        self.frame.mode = FrameMode::Live;
    }

    fn synthesize(&mut self, time_ms: f64) {
        for (bar, p) in self.frame.bars.iter_mut().zip(&self.profile) {
            let target = synthetic_height(p, time_ms);
            let next = *bar * SYNTHETIC_KEEP + target * (1.0 - SYNTHETIC_KEEP);
            *bar = clamp_height(next, p.min_height, 100.0);
        }
        self.frame.mode = FrameMode::Synthetic;
    }

    fn decay(&mut self) {
        let mut settled = true;
        for (bar, p) in self.frame.bars.iter_mut().zip(&self.profile) {
            if *bar > p.min_height {
                *bar = clamp_height(*bar * DECAY, p.min_height, 100.0);
                settled = false;
            } else {
                *bar = p.min_height;
            }
        }
        self.frame.mode = if settled {
            FrameMode::Idle
        } else {
            FrameMode::Decaying
        };
    }

    pub fn frame(&self) -> &SpectrumFrame {
        &self.frame
    }

    pub fn bars(&self) -> &[f32] {
        &self.frame.bars
    }

    pub fn bar_count(&self) -> usize {
        self.profile.len()
    }

    pub fn profile(&self) -> &[BarProfile] {
        &self.profile
    }

    /// Rebuild the profile for `count` bars (at least one); heights restart
    /// from their minimums.
    pub fn set_bar_count(&mut self, count: usize) {
        self.profile = BarProfile::row(count.max(1));
        self.frame.bars = self.profile.iter().map(|p| p.min_height).collect();
        self.frame.mode = FrameMode::Idle;
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = clamp_sensitivity(sensitivity);
    }

    pub fn show_glow(&self) -> bool {
        self.show_glow
    }

    pub fn toggle_glow(&mut self) {
        self.show_glow = !self.show_glow;
    }

    /// Release the analyser. Later ticks return [`VisualizerError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.analyser = None;
        debug!(target: LOG_TARGET, "visualizer disposed");
    }
}

fn clamp_sensitivity(s: f32) -> f32 {
    if s.is_finite() {
        s.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
    } else {
        1.5
    }
}
