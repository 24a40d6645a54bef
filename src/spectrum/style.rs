//! Bar colours: a purple-to-cyan ramp across the row that brightens with height.

use super::profile::bar_position;

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let h = self.hue.rem_euclid(360.0) / 60.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// Soft halo drawn around a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Blur radius in pixels (or cells, for a terminal host).
    pub blur: f32,
    pub color: Hsl,
    pub alpha: f32,
}

fn hue(index: usize, count: usize) -> f32 {
    270.0 - bar_position(index, count) * 120.0
}

fn intensity(height: f32) -> f32 {
    if height.is_finite() {
        (height / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn bar_color(index: usize, count: usize, height: f32) -> Hsl {
    let intensity = intensity(height);
    Hsl {
        hue: hue(index, count),
        saturation: 70.0 + intensity * 30.0,
        lightness: 40.0 + intensity * 30.0,
    }
}

pub fn bar_glow(index: usize, count: usize, height: f32) -> Glow {
    let strength = intensity(height).max(0.2);
    Glow {
        blur: 4.0 + strength * 8.0,
        color: Hsl {
            hue: hue(index, count),
            saturation: 80.0,
            lightness: 60.0,
        },
        alpha: strength * 0.6,
    }
}
