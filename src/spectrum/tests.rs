use std::f32::consts::PI;

use super::*;
use crate::error::VisualizerError;
use crate::tap::{AnalyserOptions, SampleTap, TapRegistry};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn profile_weights_favour_the_centre() {
    let row = BarProfile::row(16);

    let edge = row[0];
    assert_eq!(edge.position, 0.0);
    assert_eq!(edge.center_distance, 0.5);
    assert!(approx(edge.center_weight, 0.36, 1e-5));
    assert!(approx(edge.min_height, 8.0, 1e-5));
    assert!(approx(edge.frequency_range.start, 0.3, 1e-6));
    assert!(approx(edge.frequency_range.end, 0.7, 1e-6));

    let middle = row[7];
    assert!(middle.center_distance <= 0.1);
    assert!(middle.center_weight > 1.9);
    assert!(row.iter().all(|p| p.center_weight <= middle.center_weight + 1e-6));
    assert_eq!(row[0], {
        let mut mirrored = row[15];
        mirrored.position = 0.0;
        mirrored
    });
}

#[test]
fn single_bar_sits_in_the_middle() {
    let p = BarProfile::new(0, 1);
    assert_eq!(p.position, 0.5);
    assert_eq!(p.center_distance, 0.0);
    assert_eq!(p.center_weight, 2.0);
    assert_eq!(p.min_height, 12.0);
}

#[test]
fn frequency_range_bins_are_never_empty() {
    let range = FrequencyRange { start: 0.3, end: 0.7 };
    assert_eq!(range.bins(256), 76..179);
    assert_eq!(range.bins(1), 0..1);
    assert!(range.bins(0).is_empty());

    let narrow = FrequencyRange { start: 0.5, end: 0.5 };
    assert_eq!(narrow.bins(10), 5..6);

    let past_end = FrequencyRange { start: 1.2, end: 1.5 };
    assert_eq!(past_end.bins(4), 3..4);
}

#[test]
fn live_update_is_an_exponential_moving_average() {
    // One bar: centre weight 2.0 and no oscillation at t = 0. Magnitude 50
    // at sensitivity 1.275 gives a raw height of 50.
    let mut v = SpectrumVisualizer::new(1, 1.275);
    let bins = vec![50u8; 256];
    let before = v.bars()[0];
    assert_eq!(before, 12.0);

    v.update_from_bins(&bins, 0.0);
    let after = v.bars()[0];
    assert!(approx(after, before * 0.85 + 50.0 * 0.15, 1e-3), "{after}");
    assert_eq!(v.frame().mode, FrameMode::Live);

    for _ in 0..200 {
        v.update_from_bins(&bins, 0.0);
    }
    assert!(approx(v.bars()[0], 50.0, 1e-3), "{}", v.bars()[0]);
}

#[test]
fn live_update_matches_the_bar_formula() {
    let mut v = SpectrumVisualizer::new(16, 1.5);
    let bins: Vec<u8> = (0..256).map(|i| (i % 200) as u8).collect();
    let time_ms = 1234.0;
    let start = v.bars().to_vec();

    v.update_from_bins(&bins, time_ms);

    for (i, p) in v.profile().iter().enumerate() {
        let range = p.frequency_range.bins(bins.len());
        let avg = bins[range.clone()].iter().map(|&b| f32::from(b)).sum::<f32>() / range.len() as f32;
        let wave = ((time_ms * 0.003 + i as f64 * 0.5).sin() * 3.0) as f32 * (1.0 - p.center_distance);
        let raw = (avg / 255.0 * 100.0 * 1.5 * p.center_weight + wave).clamp(p.min_height, 100.0);
        let expected = start[i] * 0.85 + raw * 0.15;
        assert!(approx(v.bars()[i], expected, 1e-3), "bar {i}: {} vs {expected}", v.bars()[i]);
    }
}

#[test]
fn silent_signal_settles_at_minimum_heights() {
    let mut v = SpectrumVisualizer::new(8, 3.0);
    let silence = vec![0u8; 256];
    for _ in 0..300 {
        v.update_from_bins(&silence, 0.0);
    }
    for (bar, p) in v.bars().iter().zip(v.profile()) {
        assert!(approx(*bar, p.min_height, 1e-3));
    }
}

#[test]
fn fallback_is_never_blank_while_playing() {
    let mut v = SpectrumVisualizer::new(16, 1.5);
    let mut registry = TapRegistry::new(AnalyserOptions::default());
    assert!(!v.attach(&mut registry, None));

    for frame in 0..400 {
        let time_ms = 1_700_000_000_000.0 + f64::from(frame) * 50.0;
        let f = v.tick(time_ms, true).unwrap();
        assert_eq!(f.mode, FrameMode::Synthetic);
        assert!(f.bars.iter().any(|&b| b > 0.0));
        assert!(f.bars.iter().all(|b| b.is_finite() && *b <= 100.0));
    }
}

#[test]
fn stopping_decays_to_the_per_bar_minimum() {
    let mut v = SpectrumVisualizer::new(12, 1.5);
    for frame in 0..40 {
        v.tick(f64::from(frame) * 50.0, true).unwrap();
    }
    assert!(v.bars().iter().zip(v.profile()).any(|(b, p)| *b > p.min_height));

    let mut prev = v.bars().to_vec();
    let first = v.tick(2_000.0, false).unwrap().clone();
    assert_eq!(first.mode, FrameMode::Decaying);
    for (b, p) in first.bars.iter().zip(&prev) {
        assert!(*b <= *p);
    }
    prev = first.bars;

    for _ in 0..60 {
        let f = v.tick(2_000.0, false).unwrap();
        for (b, p) in f.bars.iter().zip(&prev) {
            assert!(*b <= *p);
        }
        prev = f.bars.clone();
    }

    assert_eq!(v.frame().mode, FrameMode::Idle);
    for (bar, p) in v.bars().iter().zip(v.profile()) {
        assert_eq!(*bar, p.min_height);
    }
}

#[test]
fn bar_count_and_sensitivity_are_adjustable() {
    let mut v = SpectrumVisualizer::new(16, 9.0);
    assert_eq!(v.sensitivity(), MAX_SENSITIVITY);
    v.set_sensitivity(0.0);
    assert_eq!(v.sensitivity(), MIN_SENSITIVITY);
    v.set_sensitivity(f32::NAN);
    assert!(v.sensitivity().is_finite());

    v.set_bar_count(1);
    assert_eq!(v.bar_count(), 1);
    assert_eq!(v.bars(), &[12.0_f32]);

    v.set_bar_count(0);
    assert_eq!(v.bar_count(), 1);

    v.set_bar_count(32);
    assert_eq!(v.bars().len(), 32);

    assert!(v.show_glow());
    v.toggle_glow();
    assert!(!v.show_glow());
}

#[test]
fn failed_attach_stays_synthetic_until_reset() {
    let mut registry = TapRegistry::new(AnalyserOptions::default());
    let tap = SampleTap::new(4096);
    let mut v = SpectrumVisualizer::new(8, 1.5);

    assert!(!v.attach(&mut registry, None));
    assert!(!v.attach(&mut registry, Some(&tap)), "no retry in the same session");
    assert!(!tap.is_attached());

    v.reset_session();
    assert!(v.attach(&mut registry, Some(&tap)));
    assert!(v.is_live());
    assert!(tap.is_attached());
}

#[test]
fn live_tick_reads_the_tap() {
    let mut registry = TapRegistry::new(AnalyserOptions::default());
    let tap = SampleTap::new(4096);
    let mut v = SpectrumVisualizer::new(8, 1.5);
    assert!(v.attach(&mut registry, Some(&tap)));

    let tone: Vec<f32> = (0..1024)
        .map(|i| (2.0 * PI * 128.0 * i as f32 / 512.0).sin())
        .collect();
    tap.push(&tone);

    let f = v.tick(0.0, true).unwrap();
    assert_eq!(f.mode, FrameMode::Live);
}

#[test]
fn visualizers_share_one_tap_and_release_it_once() {
    let mut registry = TapRegistry::new(AnalyserOptions::default());
    let tap = SampleTap::new(4096);

    let mut a = SpectrumVisualizer::new(8, 1.5);
    let mut b = SpectrumVisualizer::new(16, 1.0);
    assert!(a.attach(&mut registry, Some(&tap)));
    assert!(b.attach(&mut registry, Some(&tap)));
    assert_eq!(registry.live_count(), 1);

    a.dispose();
    assert!(tap.is_attached());
    assert!(b.tick(0.0, true).is_ok());

    b.dispose();
    assert!(!tap.is_attached());
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn disposed_visualizer_rejects_ticks() {
    let mut v = SpectrumVisualizer::new(4, 1.5);
    v.dispose();
    assert!(v.is_disposed());
    assert_eq!(v.tick(0.0, true).unwrap_err(), VisualizerError::Disposed);

    let mut registry = TapRegistry::new(AnalyserOptions::default());
    let tap = SampleTap::new(16);
    assert!(!v.attach(&mut registry, Some(&tap)));
}

#[test]
fn colours_ramp_from_purple_to_cyan() {
    let low = bar_color(0, 16, 0.0);
    assert_eq!(
        low,
        Hsl {
            hue: 270.0,
            saturation: 70.0,
            lightness: 40.0
        }
    );

    let high = bar_color(15, 16, 100.0);
    assert_eq!(high.hue, 150.0);
    assert_eq!(high.saturation, 100.0);
    assert_eq!(high.lightness, 70.0);

    assert_eq!(bar_color(0, 1, 50.0).hue, 210.0);

    let glow = bar_glow(3, 16, 0.0);
    assert!(approx(glow.blur, 5.6, 1e-5));
    assert!(approx(glow.alpha, 0.12, 1e-5));
    assert_eq!(glow.color.saturation, 80.0);

    let bright = bar_glow(3, 16, 100.0);
    assert!(approx(bright.blur, 12.0, 1e-5));
    assert!(approx(bright.alpha, 0.6, 1e-5));
}

#[test]
fn hsl_converts_to_rgb() {
    let rgb = |hue, saturation, lightness| {
        Hsl {
            hue,
            saturation,
            lightness,
        }
        .to_rgb()
    };
    assert_eq!(rgb(0.0, 100.0, 50.0), (255, 0, 0));
    assert_eq!(rgb(120.0, 100.0, 50.0), (0, 255, 0));
    assert_eq!(rgb(240.0, 100.0, 50.0), (0, 0, 255));
    assert_eq!(rgb(360.0, 100.0, 50.0), (255, 0, 0));
    assert_eq!(rgb(90.0, 0.0, 50.0), (128, 128, 128));
    assert_eq!(rgb(200.0, 50.0, 100.0), (255, 255, 255));
}
