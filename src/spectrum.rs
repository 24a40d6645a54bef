//! Equalizer bars from a live signal tap or a synthetic fallback.

mod profile;
mod style;
mod visualizer;

pub use profile::{BarProfile, FrequencyRange, bar_position};
pub use style::{Glow, Hsl, bar_color, bar_glow};
pub use visualizer::{FrameMode, MAX_SENSITIVITY, MIN_SENSITIVITY, SpectrumFrame, SpectrumVisualizer};

#[cfg(test)]
mod tests;
