// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Trait aliases tying the crate's generic code to concrete float types.

use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

/// Alias for the primitive float types (`f32`, `f64`) the rest of the crate is generic over.
///
/// Automatically implemented for every type that satisfies the bounds, so callers never impl
/// this themselves.
pub trait Scalar:
    Float
    + FromPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Debug
    + Default
    + 'static
{
}

impl<T> Scalar for T where
    T: Float + FromPrimitive + AddAssign + SubAssign + MulAssign + DivAssign + Debug + Default + 'static
{
}

/// Converts an `f64` literal to `T`, panicking only on a `Scalar` impl that lies about its own
/// range (never true for `f32`/`f64`).
#[inline]
pub fn lit<T: Scalar>(v: f64) -> T {
    T::from_f64(v).expect("Scalar::from_f64 failed for a literal that fits f32/f64")
}

/// The algebraic surface an elementary cost function is allowed to use.
///
/// Implemented both for a plain [`Scalar`] (identity dispatch straight to `num_traits::Float`)
/// and for [`crate::dual::Var`] (forward-mode dual dispatch). A user cost function generic over
/// `V: DualField<T>` therefore runs unchanged on either carrier — this is what lets
/// [`crate::cost::AutoDiffCost`] seed a `Var` and reuse the exact same function body that would
/// otherwise run directly on `T`.
pub trait DualField<T: Scalar>:
    Copy
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Div<Output = Self>
    + std::ops::Neg<Output = Self>
{
    /// Lifts a plain constant into this carrier (zero gradient, if any).
    fn from_scalar(v: T) -> Self;

    /// `x * x`
    fn square(self) -> Self;
    /// `sqrt(x)`
    fn sqrt(self) -> Self;
    /// `exp(x)`
    fn exp(self) -> Self;
    /// `ln(x)`
    fn log(self) -> Self;
    /// `sin(x)`
    fn sin(self) -> Self;
    /// `cos(x)`
    fn cos(self) -> Self;
    /// `tan(x)`
    fn tan(self) -> Self;
    /// `sinh(x)`
    fn sinh(self) -> Self;
    /// `cosh(x)`
    fn cosh(self) -> Self;
    /// `tanh(x)`
    fn tanh(self) -> Self;
    /// `asinh(x)`
    fn asinh(self) -> Self;
    /// `acosh(x)`
    fn acosh(self) -> Self;
    /// `atanh(x)`
    fn atanh(self) -> Self;
}

impl<T: Scalar> DualField<T> for T {
    #[inline]
    fn from_scalar(v: T) -> Self {
        v
    }
    #[inline]
    fn square(self) -> Self {
        self * self
    }
    #[inline]
    fn sqrt(self) -> Self {
        Float::sqrt(self)
    }
    #[inline]
    fn exp(self) -> Self {
        Float::exp(self)
    }
    #[inline]
    fn log(self) -> Self {
        Float::ln(self)
    }
    #[inline]
    fn sin(self) -> Self {
        Float::sin(self)
    }
    #[inline]
    fn cos(self) -> Self {
        Float::cos(self)
    }
    #[inline]
    fn tan(self) -> Self {
        Float::tan(self)
    }
    #[inline]
    fn sinh(self) -> Self {
        Float::sinh(self)
    }
    #[inline]
    fn cosh(self) -> Self {
        Float::cosh(self)
    }
    #[inline]
    fn tanh(self) -> Self {
        Float::tanh(self)
    }
    #[inline]
    fn asinh(self) -> Self {
        Float::asinh(self)
    }
    #[inline]
    fn acosh(self) -> Self {
        Float::acosh(self)
    }
    #[inline]
    fn atanh(self) -> Self {
        Float::atanh(self)
    }
}
