//! Scalar-to-color mapping and saturation blending.
//!
//! Scalar fields (volume fractions, signed distances, saturation) are turned
//! into colors here. Everything in this module is a pure function of its
//! inputs.
//!
//! # Example
//!
//! ```
//! use wetcloth_viz::color::{blend_by_saturation, saturation, ColorMap};
//! use glam::Vec3;
//!
//! let map = ColorMap::default();
//! assert_eq!(map.map(-1.0, 0.0, 1.0), map.low());
//!
//! let sat = saturation(0.25, 0.5);
//! let c = blend_by_saturation(Vec3::ONE, Vec3::Z, sat);
//! assert_eq!(c, Vec3::new(0.5, 0.5, 1.0));
//! ```

use glam::Vec3;

/// Floor applied to volume denominators when computing saturation.
pub const SATURATION_EPSILON: f32 = 1e-12;

/// Fraction of a particle's volume occupied by fluid, clamped to `[0, 1]`.
///
/// A zero (or negative) total volume is floored by [`SATURATION_EPSILON`], so
/// an empty particle reads as dry instead of producing a NaN.
#[inline]
pub fn saturation(fluid_volume: f32, volume: f32) -> f32 {
    (fluid_volume / volume.max(SATURATION_EPSILON)).clamp(0.0, 1.0)
}

/// Blend `dry` toward `wet` by a saturation in `[0, 1]`.
///
/// `sat` is clamped first. The result is exactly `dry` at 0 and exactly
/// `wet` at 1.
#[inline]
pub fn blend_by_saturation(dry: Vec3, wet: Vec3, sat: f32) -> Vec3 {
    let s = if sat.is_nan() { 0.0 } else { sat.clamp(0.0, 1.0) };
    dry * (1.0 - s) + wet * s
}

/// Monotonic, clamped scalar color ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMap {
    /// Straight interpolation between two colors.
    Linear {
        /// Color at (and below) the low end of the domain.
        low: Vec3,
        /// Color at (and above) the high end of the domain.
        high: Vec3,
    },

    /// Two linear segments meeting at `mid` in the middle of the domain.
    ///
    /// Useful for signed distances where the zero crossing should stand out.
    Diverging {
        /// Color at the low end.
        low: Vec3,
        /// Color at the domain midpoint.
        mid: Vec3,
        /// Color at the high end.
        high: Vec3,
    },
}

impl Default for ColorMap {
    /// Blue at the low end, red at the high end.
    fn default() -> Self {
        ColorMap::Linear {
            low: Vec3::new(0.0, 0.0, 1.0),
            high: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

impl ColorMap {
    /// Blue–white–red diverging ramp.
    pub fn blue_white_red() -> Self {
        ColorMap::Diverging {
            low: Vec3::new(0.0, 0.0, 1.0),
            mid: Vec3::ONE,
            high: Vec3::new(1.0, 0.0, 0.0),
        }
    }

    /// Color at the low end of the domain.
    pub fn low(&self) -> Vec3 {
        match *self {
            ColorMap::Linear { low, .. } | ColorMap::Diverging { low, .. } => low,
        }
    }

    /// Color at the high end of the domain.
    pub fn high(&self) -> Vec3 {
        match *self {
            ColorMap::Linear { high, .. } | ColorMap::Diverging { high, .. } => high,
        }
    }

    /// Map `value` over the domain `[lo, hi]`.
    ///
    /// Values at or below `lo` saturate to [`low`](Self::low), values at or
    /// above `hi` to [`high`](Self::high). A degenerate domain (`lo >= hi`)
    /// behaves as a step at `hi`.
    pub fn map(&self, value: f32, lo: f32, hi: f32) -> Vec3 {
        self.sample(normalize(value, lo, hi))
    }

    /// Map `value` over the default `[0, 1]` domain.
    #[inline]
    pub fn map_unit(&self, value: f32) -> Vec3 {
        self.map(value, 0.0, 1.0)
    }

    /// Sample the ramp at a parameter already in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        match *self {
            ColorMap::Linear { low, high } => lerp(low, high, t),
            ColorMap::Diverging { low, mid, high } => {
                if t <= 0.5 {
                    lerp(low, mid, t * 2.0)
                } else {
                    lerp(mid, high, (t - 0.5) * 2.0)
                }
            }
        }
    }
}

fn normalize(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else if value >= hi {
        1.0
    } else {
        0.0
    }
}

// Written out so t = 0 and t = 1 return the endpoints bit-for-bit.
#[inline]
fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_map_endpoints() {
        let map = ColorMap::default();
        assert_eq!(map.map(0.0, 0.0, 1.0), map.low());
        assert_eq!(map.map(1.0, 0.0, 1.0), map.high());
        assert_eq!(map.map(-3.0, -3.0, 3.0), map.low());
        assert_eq!(map.map(3.0, -3.0, 3.0), map.high());
    }

    #[test]
    fn test_map_clamps_outside_domain() {
        let map = ColorMap::default();
        assert_eq!(map.map(-10.0, 0.0, 1.0), map.low());
        assert_eq!(map.map(10.0, 0.0, 1.0), map.high());
        assert_eq!(map.map_unit(f32::INFINITY), map.high());
        assert_eq!(map.map_unit(f32::NEG_INFINITY), map.low());
    }

    #[test]
    fn test_map_is_monotonic() {
        let map = ColorMap::default();
        let (lo, hi) = (-0.3, 0.7);
        let mut rng = rand::thread_rng();
        let mut samples: Vec<f32> = (0..256).map(|_| rng.gen_range(lo..hi)).collect();
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let low = map.low();
        let high = map.high();
        for pair in samples.windows(2) {
            let a = map.map(pair[0], lo, hi);
            let b = map.map(pair[1], lo, hi);
            // Each channel moves toward the high endpoint, never back.
            for ch in 0..3 {
                if high[ch] >= low[ch] {
                    assert!(b[ch] >= a[ch], "channel {ch} decreased");
                } else {
                    assert!(b[ch] <= a[ch], "channel {ch} increased");
                }
            }
        }
    }

    #[test]
    fn test_map_is_continuous_at_midpoint() {
        let map = ColorMap::blue_white_red();
        let below = map.sample(0.5 - 1e-4);
        let above = map.sample(0.5 + 1e-4);
        assert!((below - above).length() < 1e-2);
        assert_eq!(map.sample(0.5), Vec3::ONE);
    }

    #[test]
    fn test_degenerate_domain_is_a_step() {
        let map = ColorMap::default();
        assert_eq!(map.map(0.9, 1.0, 1.0), map.low());
        assert_eq!(map.map(1.0, 1.0, 1.0), map.high());
    }

    #[test]
    fn test_blend_endpoints_exact() {
        let a = Vec3::new(0.75, 0.75, 0.75);
        let b = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(blend_by_saturation(a, b, 0.0), a);
        assert_eq!(blend_by_saturation(a, b, 1.0), b);
    }

    #[test]
    fn test_blend_clamps_saturation() {
        let a = Vec3::new(0.2, 0.4, 0.6);
        let b = Vec3::new(1.0, 0.0, 0.5);
        assert_eq!(blend_by_saturation(a, b, -2.0), a);
        assert_eq!(blend_by_saturation(a, b, 7.5), b);
        assert_eq!(blend_by_saturation(a, b, f32::NAN), a);
    }

    #[test]
    fn test_saturation_zero_volume() {
        let sat = saturation(0.0, 0.0);
        assert!(!sat.is_nan());
        assert_eq!(sat, 0.0);

        let dry = Vec3::splat(0.75);
        assert_eq!(blend_by_saturation(dry, Vec3::Z, sat), dry);
    }

    #[test]
    fn test_saturation_clamped() {
        assert_eq!(saturation(2.0, 1.0), 1.0);
        assert_eq!(saturation(-1.0, 1.0), 0.0);
        assert!((saturation(0.25, 1.0) - 0.25).abs() < 1e-6);
    }
}
