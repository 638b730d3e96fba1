// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Elementary transcendental and algebraic functions, dual-aware.
//!
//! Each function here follows the chain rule `y = f(x) => (a_y, d_y) = (f(a_x), f'(a_x) * d_x)`.
//! The free functions dispatch through [`crate::scalar::DualField`] so the same call site works
//! whether `x` is a plain [`crate::scalar::Scalar`] or a [`super::Var`].

use super::Var;
use crate::scalar::Scalar;
use num_traits::Float;

#[inline]
fn chain<T: Scalar, const N: usize>(x: Var<T, N>, fa: T, dfa: T) -> Var<T, N> {
    let mut d = [T::zero(); N];
    for i in 0..N {
        d[i] = dfa * x.d[i];
    }
    Var { a: fa, d }
}

/// `x * x`, derivative `2x`.
#[inline]
pub fn square<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    let two = T::one() + T::one();
    chain(x, x.a * x.a, two * x.a)
}

/// `sqrt(x)`, derivative `0.5 / sqrt(x)`.
#[inline]
pub fn sqrt<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    let fa = Float::sqrt(x.a);
    let half = T::from_f64(0.5).unwrap();
    chain(x, fa, half / fa)
}

/// `exp(x)`, derivative `exp(x)`.
#[inline]
pub fn exp<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    let fa = Float::exp(x.a);
    chain(x, fa, fa)
}

/// `ln(x)`, derivative `1/x`.
#[inline]
pub fn log<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::ln(x.a), T::one() / x.a)
}

/// `sin(x)`, derivative `cos(x)`.
#[inline]
pub fn sin<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::sin(x.a), Float::cos(x.a))
}

/// `cos(x)`, derivative `-sin(x)`.
#[inline]
pub fn cos<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::cos(x.a), -Float::sin(x.a))
}

/// `tan(x)`, derivative `1 + tan(x)^2`.
#[inline]
pub fn tan<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    let fa = Float::tan(x.a);
    chain(x, fa, T::one() + fa * fa)
}

/// `sinh(x)`, derivative `cosh(x)`.
#[inline]
pub fn sinh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::sinh(x.a), Float::cosh(x.a))
}

/// `cosh(x)`, derivative `sinh(x)`.
#[inline]
pub fn cosh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::cosh(x.a), Float::sinh(x.a))
}

/// `tanh(x)`, derivative `1 - tanh(x)^2`.
#[inline]
pub fn tanh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    let fa = Float::tanh(x.a);
    chain(x, fa, T::one() - fa * fa)
}

/// `asinh(x)`, derivative `1 / sqrt(x^2 + 1)`.
#[inline]
pub fn asinh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::asinh(x.a), T::one() / Float::sqrt(x.a * x.a + T::one()))
}

/// `acosh(x)`, derivative `1 / sqrt(x^2 - 1)`.
#[inline]
pub fn acosh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::acosh(x.a), T::one() / Float::sqrt(x.a * x.a - T::one()))
}

/// `atanh(x)`, derivative `1 / (1 - x^2)`.
#[inline]
pub fn atanh<T: Scalar, const N: usize>(x: Var<T, N>) -> Var<T, N> {
    chain(x, Float::atanh(x.a), T::one() / (T::one() - x.a * x.a))
}
