//! Colour scales
//!
//! A sequential scale for metric-coloured marks (bars, map regions) and
//! categorical palettes for line series.

use serde::{Deserialize, Serialize};

use crate::query::ColorDomain;

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREY: Rgb = Rgb(128, 128, 128);

    /// Parse `#rrggbb`
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// `#rrggbb` string
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear interpolation towards `other`; `t` in `[0, 1]`
    pub fn lerp(&self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Evenly spaced stops of the plasma colour map
const PLASMA: [Rgb; 9] = [
    Rgb::from_hex(0x0d0887),
    Rgb::from_hex(0x4b03a1),
    Rgb::from_hex(0x7d03a8),
    Rgb::from_hex(0xa82296),
    Rgb::from_hex(0xcb4679),
    Rgb::from_hex(0xe56b5d),
    Rgb::from_hex(0xf89441),
    Rgb::from_hex(0xfdc328),
    Rgb::from_hex(0xf0f921),
];

const CIVIDIS: [Rgb; 6] = [
    Rgb::from_hex(0x00224e),
    Rgb::from_hex(0x35456c),
    Rgb::from_hex(0x666970),
    Rgb::from_hex(0x948e77),
    Rgb::from_hex(0xc8b866),
    Rgb::from_hex(0xfee838),
];

const CATEGORY10: [Rgb; 10] = [
    Rgb::from_hex(0x4c78a8),
    Rgb::from_hex(0xf58518),
    Rgb::from_hex(0xe45756),
    Rgb::from_hex(0x72b7b2),
    Rgb::from_hex(0x54a24b),
    Rgb::from_hex(0xeeca3b),
    Rgb::from_hex(0xb279a2),
    Rgb::from_hex(0xff9da6),
    Rgb::from_hex(0x9d755d),
    Rgb::from_hex(0xbab0ac),
];

/// Plasma colour at position `t` in `[0, 1]`
pub fn plasma(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(PLASMA.len() - 2);
    PLASMA[idx].lerp(PLASMA[idx + 1], scaled - idx as f64)
}

/// Sequential colour for `value` within `domain`
pub fn sequential(domain: &ColorDomain, value: f64) -> Rgb {
    plasma(domain.normalize(value))
}

/// Palette for line series
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Ten distinct hues, cycled
    #[default]
    Categorical,
    /// Samples of the cividis map, for the disease series
    Cividis,
}

impl Palette {
    /// Colour of the `index`-th series
    pub fn color(&self, index: usize) -> Rgb {
        match self {
            Palette::Categorical => CATEGORY10[index % CATEGORY10.len()],
            Palette::Cividis => CIVIDIS[index % CIVIDIS.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex(0x0d0887).hex(), "#0d0887");
        assert_eq!(Rgb::GREY.hex(), "#808080");
    }

    #[test]
    fn test_plasma_endpoints() {
        assert_eq!(plasma(0.0), PLASMA[0]);
        assert_eq!(plasma(1.0), PLASMA[8]);
        assert_eq!(plasma(-3.0), PLASMA[0]);
        assert_eq!(plasma(f64::NAN), PLASMA[0]);
    }

    #[test]
    fn test_sequential_uses_domain() {
        let domain = ColorDomain { min: 0.0, max: 100.0 };
        assert_eq!(sequential(&domain, 100.0), PLASMA[8]);
        assert_eq!(sequential(&domain, 0.0), PLASMA[0]);
        assert_eq!(sequential(&domain, 50.0), PLASMA[4]);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(Palette::Categorical.color(0), Palette::Categorical.color(10));
        assert_ne!(Palette::Cividis.color(0), Palette::Cividis.color(1));
    }
}
