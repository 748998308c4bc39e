//! Unit newtypes for the quantities the DC flow pipeline handles.
//!
//! Injections and limits are authored in MW, the solver works in per-unit on a fixed
//! MVA base, and PST offsets are authored in degrees but enter the flow equation in
//! radians. Wrapping each in its own type keeps those conversions explicit.
//!
//! ```
//! use gridplay_core::units::{Degrees, Megawatts};
//!
//! let p = Megawatts(50.0).to_per_unit(100.0);
//! assert_eq!(p.value(), 0.5);
//! assert_eq!(p.to_megawatts(100.0), Megawatts(50.0));
//!
//! let phi = Degrees(180.0).to_radians();
//! assert!((phi.value() - std::f64::consts::PI).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Same-unit addition and summation, plus access to the raw value.
macro_rules! impl_unit_ops {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| acc + x)
            }
        }

        impl $type {
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }
    };
}

// =============================================================================
// Power
// =============================================================================

/// Active power in megawatts (MW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts);

/// Per-unit quantity on a given MVA base
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit);

impl Megawatts {
    /// Normalize against a power base given in MVA.
    #[inline]
    pub fn to_per_unit(self, base_mva: f64) -> PerUnit {
        PerUnit(self.0 / base_mva)
    }
}

impl PerUnit {
    #[inline]
    pub fn to_megawatts(self, base_mva: f64) -> Megawatts {
        Megawatts(self.0 * base_mva)
    }
}

// =============================================================================
// Angles
// =============================================================================

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians);

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees);

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0 * std::f64::consts::PI / 180.0)
    }
}
