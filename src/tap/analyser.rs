//! Byte frequency data in the manner of a browser `AnalyserNode`.
//!
//! Samples are kept in a sliding window of `fft_size`. Each read applies a
//! Blackman window, runs a forward FFT, normalises magnitudes by the window
//! length, blends with the previous frame by `smoothing_time_constant`, and
//! maps decibels in `[min_decibels, max_decibels]` onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::VisualizerSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserOptions {
    pub fft_size: usize,
    pub smoothing_time_constant: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing_time_constant: 0.8,
            min_decibels: -90.0,
            max_decibels: -10.0,
        }
    }
}

impl From<&VisualizerSettings> for AnalyserOptions {
    fn from(s: &VisualizerSettings) -> Self {
        Self {
            fft_size: s.fft_size,
            smoothing_time_constant: s.smoothing_time_constant,
            min_decibels: s.min_decibels,
            max_decibels: s.max_decibels,
        }
    }
}

pub struct FrequencyAnalyser {
    options: AnalyserOptions,
    window: Vec<f32>,
    write_pos: usize,
    blackman: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buf: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(options: AnalyserOptions) -> Self {
        let n = options.fft_size.max(2).next_power_of_two();
        let options = AnalyserOptions {
            fft_size: n,
            smoothing_time_constant: options.smoothing_time_constant.clamp(0.0, 1.0),
            ..options
        };

        let blackman = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);

        Self {
            options,
            window: vec![0.0; n],
            write_pos: 0,
            blackman,
            fft,
            fft_buf: vec![Complex { re: 0.0, im: 0.0 }; n],
            smoothed: vec![0.0; n / 2],
        }
    }

    pub fn options(&self) -> AnalyserOptions {
        self.options
    }

    /// Number of bins produced by [`byte_frequency_data`](Self::byte_frequency_data).
    pub fn frequency_bin_count(&self) -> usize {
        self.options.fft_size / 2
    }

    /// Slide `samples` into the analysis window.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.window.len();
        // Only the newest `n` samples can influence the next frame.
        let skip = samples.len().saturating_sub(n);
        for &s in &samples[skip..] {
            self.window[self.write_pos] = if s.is_finite() { s } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % n;
        }
    }

    /// Compute one frame of byte magnitudes into `out` (resized to the bin count).
    pub fn byte_frequency_data(&mut self, out: &mut Vec<u8>) {
        let n = self.window.len();
        let half = n / 2;

        for i in 0..n {
            let s = self.window[(self.write_pos + i) % n];
            self.fft_buf[i] = Complex {
                re: s * self.blackman[i],
                im: 0.0,
            };
        }
        self.fft.process(&mut self.fft_buf);

        let tau = self.options.smoothing_time_constant;
        let range = self.options.max_decibels - self.options.min_decibels;
        let scale = 255.0 / range;

        out.clear();
        out.reserve(half);
        for k in 0..half {
            let magnitude = self.fft_buf[k].norm() / n as f32;
            let smoothed = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            self.smoothed[k] = if smoothed.is_finite() { smoothed } else { 0.0 };

            let byte = if self.smoothed[k] > 0.0 {
                let db = 20.0 * self.smoothed[k].log10();
                (scale * (db - self.options.min_decibels)).floor().clamp(0.0, 255.0) as u8
            } else {
                0
            };
            out.push(byte);
        }
    }
}
