use std::f32::consts::PI;
use std::ops::Range;

/// Fractions of the available frequency bins a bar averages over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub start: f32,
    pub end: f32,
}

impl FrequencyRange {
    /// Bin indices for a spectrum of `len` bins: never empty, never out of
    /// bounds (for `len > 0`).
    pub fn bins(&self, len: usize) -> Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let start = ((self.start * len as f32).floor().max(0.0) as usize).min(len - 1);
        let end = ((self.end * len as f32).floor().max(0.0) as usize).min(len);
        start..end.max(start + 1)
    }
}

/// Geometry and weighting of one bar, fixed for a given bar count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarProfile {
    /// Position across the row in `[0, 1]`.
    pub position: f32,
    /// Distance from the middle of the row, in `[0, 0.5]`.
    pub center_distance: f32,
    pub center_weight: f32,
    pub frequency_range: FrequencyRange,
    /// Floor for live heights and the resting height after decay.
    pub min_height: f32,
}

impl BarProfile {
    pub fn new(index: usize, count: usize) -> Self {
        let position = bar_position(index, count);
        let center_distance = (position - 0.5).abs();
        let center_weight = ((center_distance * PI).cos() * 0.4 + 0.6) * center_boost(center_distance);

        Self {
            position,
            center_distance,
            center_weight,
            frequency_range: FrequencyRange {
                start: 0.4 - center_distance * 0.2,
                end: 0.6 + center_distance * 0.2,
            },
            min_height: 4.0 + (1.0 - center_distance) * 8.0,
        }
    }

    /// Profiles for a row of `count` bars.
    pub fn row(count: usize) -> Vec<Self> {
        (0..count).map(|i| Self::new(i, count)).collect()
    }

    /// Floor used while the synthetic animation runs.
    pub fn synthetic_min_height(&self) -> f32 {
        6.0 + (1.0 - self.center_distance) * 12.0
    }
}

/// `index / (count - 1)`; a lone bar sits in the middle.
pub fn bar_position(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.5
    } else {
        index as f32 / (count - 1) as f32
    }
}

fn center_boost(center_distance: f32) -> f32 {
    if center_distance <= 0.1 {
        2.0
    } else if center_distance <= 0.2 {
        1.7
    } else if center_distance <= 0.3 {
        1.3
    } else {
        0.8 - center_distance * 0.4
    }
}

/// Target height for one bar from live byte magnitudes.
pub(super) fn live_height(
    profile: &BarProfile,
    index: usize,
    bins: &[u8],
    sensitivity: f32,
    time_ms: f64,
) -> f32 {
    let range = profile.frequency_range.bins(bins.len());
    let width = range.len().max(1);
    let sum: u32 = bins[range].iter().map(|&b| u32::from(b)).sum();
    let average = sum as f32 / width as f32;

    let raw = (average / 255.0) * 100.0 * sensitivity * profile.center_weight;
    let center_bonus = 1.0 - profile.center_distance;
    let wave = ((time_ms * 0.003 + index as f64 * 0.5).sin() * 3.0) as f32 * center_bonus;

    clamp_height(raw + wave, profile.min_height, 100.0)
}

/// Target height for one bar of the synthetic animation.
pub(super) fn synthetic_height(profile: &BarProfile, time_ms: f64) -> f32 {
    let t = time_ms * 0.002;
    let global_pulse = (t * 2.0).sin() * 8.0;
    let global_sin = (t * 0.8).sin();

    let cd = f64::from(profile.center_distance);
    let center_multiplier = 1.0 - cd * 0.6;
    let frequency = 0.8 + cd * 0.3;
    let amplitude = (35.0 + global_sin * 25.0) * center_multiplier;

    let base = 15.0 + (t * frequency).sin() * amplitude;
    let harmonics = (t * frequency * 1.5).sin() * 12.0 * center_multiplier;
    let center_pulse = global_pulse * (1.0 - cd);

    clamp_height(
        (base + harmonics + center_pulse) as f32,
        profile.synthetic_min_height(),
        95.0,
    )
}

/// `value.clamp(min, max)`, with non-finite input resting at `min`.
pub(super) fn clamp_height(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}
