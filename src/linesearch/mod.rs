// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Backtracking line search, with an Armijo-only mode and a Strong-Wolfe zoom/bracket mode.

pub mod backtracking;
pub mod strongwolfe;

use crate::cost::Cost;
use crate::dual::aggregate::dot;
use crate::error::OptError;
use crate::macros::check_param;
use crate::scalar::{lit, Scalar};

/// Which pair of conditions the line search must satisfy before accepting a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearchKind {
    /// Sufficient-decrease (Armijo) only, found by plain backtracking.
    Armijo,
    /// Armijo plus the strong curvature condition, found by a zoom/bracket search.
    StrongWolfe,
}

/// Configuration for the line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOptions<T: Scalar> {
    /// Which condition pair to enforce.
    pub kind: LineSearchKind,
    /// Maximum number of cost evaluations (Armijo) or bracket/zoom steps (Strong-Wolfe).
    pub max_iterations: usize,
    /// Armijo sufficient-decrease parameter, `c1 in (0, 1)`.
    pub c1: T,
    /// Curvature parameter, `c2 in (c1, 1)`.
    pub c2: T,
    /// Backtracking contraction factor, `rho in (0, 1)`.
    pub rho: T,
}

impl<T: Scalar> LineSearchOptions<T> {
    /// Constructs Armijo-backtracking options with the documented defaults
    /// (`c1 = 1e-4`, `c2 = 0.9`, `rho = 0.5`).
    pub fn new(kind: LineSearchKind, max_iterations: usize) -> Result<Self, OptError> {
        Self::with_params(kind, max_iterations, lit(1e-4), lit(0.9), lit(0.5))
    }

    /// Constructs options with explicit `c1`, `c2`, `rho`, validating every precondition named
    /// in the data model.
    pub fn with_params(
        kind: LineSearchKind,
        max_iterations: usize,
        c1: T,
        c2: T,
        rho: T,
    ) -> Result<Self, OptError> {
        check_param!(max_iterations > 0, "linesearch max_iterations must be > 0");
        check_param!(
            c1 > T::zero() && c1 < T::one(),
            format!("c1 must lie in (0, 1), got {c1:?}")
        );
        check_param!(
            c2 > c1 && c2 < T::one(),
            format!("c2 must lie in (c1, 1), got c1={c1:?} c2={c2:?}")
        );
        check_param!(rho > T::zero() && rho < T::one(), format!("rho must lie in (0, 1), got {rho:?}"));
        Ok(LineSearchOptions { kind, max_iterations, c1, c2, rho })
    }
}

impl<T: Scalar> Default for LineSearchOptions<T> {
    fn default() -> Self {
        Self::new(LineSearchKind::StrongWolfe, 20).expect("default line search options are valid")
    }
}

/// Result of one line search invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOutcome<T: Scalar> {
    /// Whether a step satisfying the chosen conditions was found.
    pub success: bool,
    /// Number of trial steps evaluated.
    pub num_iterations: usize,
    /// Cost at the accepted step (or at the last trial, on failure).
    pub final_cost: T,
    /// The accepted step length (or the last one tried, on failure).
    pub step_size: T,
}

/// Smallest step length the search will try before declaring underflow failure.
fn alpha_floor<T: Scalar>() -> T {
    lit(1e-16)
}

/// Evaluates `phi(alpha) = cost(x_p + alpha * d)` and its gradient, writing the new point and
/// gradient into `x_c`/`g_c`. Returns `(phi, phi_prime)` where `phi_prime = grad . d`.
fn eval_phi<T: Scalar, C: Cost<T, N>, const N: usize>(
    cost: &C,
    x_p: &[T; N],
    d: &[T; N],
    alpha: T,
    x_c: &mut [T; N],
    g_c: &mut [T; N],
) -> (T, T) {
    for i in 0..N {
        x_c[i] = x_p[i] + alpha * d[i];
    }
    let phi = cost.evaluate(x_c, g_c);
    let phi_prime: T = dot(&*g_c, d);
    (phi, phi_prime)
}

/// Runs the configured line search.
///
/// `x_p`/`g_p` are the base point and its gradient, `d` the search direction, `f_p` the cost at
/// `x_p`, `alpha0` the initial step. On success `x_c`/`g_c` hold the new point and gradient; on
/// failure they hold the last trial point, and the caller (the L-BFGS driver) is responsible for
/// restoring `x_p`/`g_p`.
#[allow(clippy::too_many_arguments)]
pub fn search<T: Scalar, C: Cost<T, N>, const N: usize>(
    cost: &C,
    opts: &LineSearchOptions<T>,
    x_p: &[T; N],
    g_p: &[T; N],
    d: &[T; N],
    f_p: T,
    alpha0: T,
    x_c: &mut [T; N],
    g_c: &mut [T; N],
) -> LineSearchOutcome<T> {
    let g0: T = dot(g_p, d);
    if g0 >= T::zero() {
        // Not a descent direction; treated identically to line-search failure.
        *x_c = *x_p;
        *g_c = *g_p;
        return LineSearchOutcome { success: false, num_iterations: 0, final_cost: f_p, step_size: T::zero() };
    }

    match opts.kind {
        LineSearchKind::Armijo => backtracking::search(cost, opts, x_p, d, f_p, g0, alpha0, x_c, g_c),
        LineSearchKind::StrongWolfe => strongwolfe::search(cost, opts, x_p, d, f_p, g0, alpha0, x_c, g_c),
    }
}
