//! Fixed-point score figures for projected game output.
//!
//! # Design Philosophy
//!
//! - Running projections stay in `f64` and are never rounded mid-pipeline
//! - Reported figures are stored as i64 tenths of a point
//! - Rounding is half away from zero and happens only at the output boundary
//! - Arithmetic saturates at the i64 bounds instead of overflowing
//!
//! # Usage
//!
//! ```rust
//! use totals_core::utils::points::{Points, round_to_tenths};
//!
//! let home = Points::from_f64(112.25);
//! let away = Points::from_f64(108.04);
//! assert_eq!(home.tenths(), 1123);
//! assert_eq!((home + away).as_f64(), 220.3);
//! assert_eq!(round_to_tenths(0.55), 0.6);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Nudge applied before rounding so that binary representation error
/// (e.g. `1.45 * 10.0 == 14.499999999999998`) still rounds away from zero.
const ROUNDING_EPSILON: f64 = 1e-9;

#[inline]
fn round_half_away_scaled(value: f64, scale: f64) -> f64 {
    let scaled = value * scale;
    (scaled + ROUNDING_EPSILON.copysign(scaled)).round()
}

/// Score value stored as tenths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points {
    tenths: i64,
}

impl Points {
    #[inline]
    pub const fn from_tenths(tenths: i64) -> Self {
        Self { tenths }
    }

    /// Create from a raw projection (rounds half away from zero to one decimal)
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Self {
            tenths: round_half_away_scaled(value, 10.0) as i64,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { tenths: 0 }
    }

    #[inline]
    pub const fn tenths(&self) -> i64 {
        self.tenths
    }

    /// Get value as a float (for display/API)
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.tenths as f64 / 10.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.tenths == 0
    }
}

impl Add for Points {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            tenths: self.tenths.saturating_add(other.tenths),
        }
    }
}

impl Sub for Points {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            tenths: self.tenths.saturating_sub(other.tenths),
        }
    }
}

impl Neg for Points {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            tenths: self.tenths.saturating_neg(),
        }
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Points::from_f64)
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Round to one decimal place, half away from zero.
#[inline]
pub fn round_to_tenths(value: f64) -> f64 {
    round_half_away_scaled(value, 10.0) / 10.0
}

/// Round to two decimal places, half away from zero.
///
/// Used for breakdown deltas, where a single decimal would hide
/// contributions like `+0.55`.
#[inline]
pub fn round_to_hundredths(value: f64) -> f64 {
    round_half_away_scaled(value, 100.0) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_from_f64() {
        assert_eq!(Points::from_f64(112.0).tenths(), 1120);
        assert_eq!(Points::from_f64(112.04).tenths(), 1120);
        assert_eq!(Points::from_f64(112.05).tenths(), 1121);
        assert_eq!(Points::from_f64(-4.12).tenths(), -41);
    }

    #[test]
    fn test_points_half_away_from_zero() {
        // 1.45 is stored as 1.4499999999999999556; still rounds up
        assert_eq!(Points::from_f64(1.45).tenths(), 15);
        assert_eq!(Points::from_f64(-1.45).tenths(), -15);
        assert_eq!(Points::from_f64(0.55).tenths(), 6);
        assert_eq!(Points::from_f64(0.0).tenths(), 0);
    }

    #[test]
    fn test_points_arithmetic() {
        let home = Points::from_tenths(1123);
        let away = Points::from_tenths(1080);
        assert_eq!((home + away).tenths(), 2203);
        assert_eq!((home - away).tenths(), 43);
        assert_eq!((-away).tenths(), -1080);
        assert!(Points::zero().is_zero());
    }

    #[test]
    fn test_points_arithmetic_saturates() {
        let huge = Points::from_f64(5.0e18);
        assert_eq!(huge.tenths(), i64::MAX);
        assert_eq!((huge + Points::from_f64(110.0)).tenths(), i64::MAX);
        assert_eq!((-huge - huge).tenths(), i64::MIN);
        assert_eq!((-Points::from_tenths(i64::MIN)).tenths(), i64::MAX);
    }

    #[test]
    fn test_points_display() {
        assert_eq!(format!("{}", Points::from_tenths(2203)), "220.3");
        assert_eq!(format!("{}", Points::from_tenths(-5)), "-0.5");
    }

    #[test]
    fn test_points_serde_as_float() {
        let json = serde_json::to_string(&Points::from_tenths(1155)).unwrap();
        assert_eq!(json, "115.5");
        let back: Points = serde_json::from_str("115.46").unwrap();
        assert_eq!(back.tenths(), 1155);
    }

    #[test]
    fn test_round_helpers() {
        assert_eq!(round_to_tenths(0.55), 0.6);
        assert_eq!(round_to_tenths(2.24), 2.2);
        assert_eq!(round_to_tenths(-4.12), -4.1);
        assert_eq!(round_to_hundredths(0.55), 0.55);
        assert_eq!(round_to_hundredths(2.2400000000000002), 2.24);
        assert_eq!(round_to_hundredths(-4.125), -4.13);
    }

    #[test]
    fn test_precision_no_accumulation() {
        let mut total = Points::zero();
        for _ in 0..1000 {
            total = total + Points::from_f64(0.1);
        }
        assert_eq!(total.tenths(), 1000);
    }
}
