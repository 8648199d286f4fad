//! Unit newtypes for the quantities that cross the conversion boundary.
//!
//! Rated voltages are kept in kilovolts and tap-step phase shifts in degrees,
//! the way the source ontology records them. Radians only appear inside the
//! complex arithmetic of the ratio relocation.
//!
//! ```
//! use xfc_core::units::{Degrees, Kilovolts};
//!
//! let hv = Kilovolts(230.0);
//! let lv = Kilovolts(115.0);
//! assert_eq!(lv / hv, 0.5);
//!
//! let shift = -Degrees(30.0);
//! assert!((shift.to_radians().value() + std::f64::consts::FRAC_PI_6).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implements arithmetic shared by every unit type
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

/// Voltage in kilovolts (rated voltages, star-bus reference voltage)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

/// Angle in degrees (tap-step phase shifts)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Kilovolts, "kV");
impl_unit_ops!(Degrees, "deg");
impl_unit_ops!(Radians, "rad");

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

impl Radians {
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl From<Degrees> for Radians {
    fn from(value: Degrees) -> Self {
        value.to_radians()
    }
}

impl From<Radians> for Degrees {
    fn from(value: Radians) -> Self {
        value.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilovolt_ratio() {
        assert_eq!(Kilovolts(115.0) / Kilovolts(230.0), 0.5);
        assert_eq!(Kilovolts(10.0) + Kilovolts(5.0), Kilovolts(15.0));
    }

    #[test]
    fn test_angle_conversion() {
        let deg = Degrees(180.0);
        let rad: Radians = deg.into();
        assert!((rad.value() - std::f64::consts::PI).abs() < 1e-12);
        let back: Degrees = rad.into();
        assert!((back.value() - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_negation_and_display() {
        assert_eq!(-Degrees(12.5), Degrees(-12.5));
        assert_eq!(format!("{}", Kilovolts(230.0)), "230.0000 kV");
    }
}
