//! Compile-time unit safety for the electrical quantities this crate moves
//! around: ohms, volts, amps. Prevents mixing e.g. a resistance with a
//! current at a call site that expects a voltage.
//!
//! All types are `#[repr(transparent)]` newtypes over `f64`, so the wrapper
//! has zero runtime cost.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

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
                write!(f, "{:.6} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

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

/// Resistance in ohms.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

/// Electric potential in volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

/// Current in amps.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amps(pub f64);

impl_unit_ops!(Ohms, "Ω");
impl_unit_ops!(Volts, "V");
impl_unit_ops!(Amps, "A");

impl Ohms {
    /// Conductance `1/R` in siemens. Caller is expected to have already
    /// rejected `R <= 0`.
    #[inline]
    pub fn conductance(self) -> f64 {
        1.0 / self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_stays_in_unit() {
        let r = Ohms(100.0) + Ohms(200.0);
        assert_eq!(r.value(), 300.0);
        let i = Amps(0.04);
        assert_eq!((i * 2.0).value(), 0.08);
    }

    #[test]
    fn conductance_is_reciprocal() {
        assert!((Ohms(250.0).conductance() - 0.004).abs() < 1e-12);
    }

    #[test]
    fn display_formats_with_symbol() {
        assert_eq!(format!("{}", Volts(12.0)), "12.000000 V");
    }
}
