// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Aggregate reductions over slices of scalars or duals: `sum`, `sumsq`, `dot`.

use crate::scalar::{DualField, Scalar};
use num_traits::Zero;
use std::ops::{Add, Mul};

/// `xs[0] + xs[1] + ... + xs[n-1]`.
///
/// # Panics
/// Panics if `xs` is empty — an empty sum is a caller precondition violation, not a silent
/// zero.
#[inline]
pub fn sum<V: Copy + Add<Output = V>>(xs: &[V]) -> V {
    assert!(!xs.is_empty(), "sum: xs must be non-empty");
    let mut acc = xs[0];
    for &x in &xs[1..] {
        acc = acc + x;
    }
    acc
}

/// `square(xs[0]) + square(xs[1]) + ... + square(xs[n-1])`.
///
/// # Panics
/// Panics if `xs` is empty.
#[inline]
pub fn sumsq<T: Scalar, V: DualField<T>>(xs: &[V]) -> V {
    assert!(!xs.is_empty(), "sumsq: xs must be non-empty");
    let mut acc = xs[0].square();
    for &x in &xs[1..] {
        acc = acc + x.square();
    }
    acc
}

/// `a[0]*b[0] + a[1]*b[1] + ... + a[n-1]*b[n-1]`.
///
/// Generic over mixed element types (`A`, `B`) as long as `A: Mul<B, Output = O>` — this is what
/// lets a dual/scalar, scalar/dual, dual/dual, or scalar/scalar pairing all go through the same
/// function, with the existing operator overloads on [`super::Var`] doing the actual lifting.
///
/// Accumulates as two independent partial sums, walked in blocks of 16 then 4, with a scalar
/// tail for the remainder, so that the two accumulator chains can execute with independent
/// dependency chains (ILP) rather than a single serial reduction.
///
/// # Panics
/// Panics if `a.len() != b.len()`.
#[inline]
pub fn dot<A, B, O>(a: &[A], b: &[B]) -> O
where
    A: Copy + Mul<B, Output = O>,
    B: Copy,
    O: Copy + Zero + Add<Output = O>,
{
    assert_eq!(a.len(), b.len(), "dot: mismatched lengths");
    let n = a.len();

    let mut acc0 = O::zero();
    let mut acc1 = O::zero();

    let mut i = 0;
    while i + 16 <= n {
        let mut p0 = O::zero();
        let mut p1 = O::zero();
        let mut j = 0;
        while j < 16 {
            p0 = p0 + a[i + j] * b[i + j];
            p1 = p1 + a[i + j + 1] * b[i + j + 1];
            j += 2;
        }
        acc0 = acc0 + p0;
        acc1 = acc1 + p1;
        i += 16;
    }
    while i + 4 <= n {
        let mut p0 = O::zero();
        let mut p1 = O::zero();
        p0 = p0 + a[i] * b[i];
        p1 = p1 + a[i + 1] * b[i + 1];
        p0 = p0 + a[i + 2] * b[i + 2];
        p1 = p1 + a[i + 3] * b[i + 3];
        acc0 = acc0 + p0;
        acc1 = acc1 + p1;
        i += 4;
    }
    let mut tail = acc0 + acc1;
    while i < n {
        tail = tail + a[i] * b[i];
        i += 1;
    }
    tail
}
