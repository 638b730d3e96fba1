// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Strong-Wolfe line search: a bracketing search followed by zoom/bisection, after
//! Nocedal & Wright, *Numerical Optimization*, 2nd ed., Algorithm 3.5 / 3.6.

use super::{alpha_floor, eval_phi, LineSearchOptions, LineSearchOutcome};
use crate::cost::Cost;
use crate::scalar::{lit, Scalar};

/// Bisects the bracket `[lo, hi]` until a step satisfying both Armijo and the strong curvature
/// condition is found, or the remaining iteration budget is exhausted.
#[allow(clippy::too_many_arguments)]
fn zoom<T: Scalar, C: Cost<T, N>, const N: usize>(
    cost: &C,
    opts: &LineSearchOptions<T>,
    x_p: &[T; N],
    d: &[T; N],
    f_p: T,
    g0: T,
    mut lo: T,
    mut hi: T,
    mut phi_lo: T,
    iters_used: usize,
    x_c: &mut [T; N],
    g_c: &mut [T; N],
) -> LineSearchOutcome<T> {
    let half = lit::<T>(0.5);
    let mut iters = iters_used;

    while iters < opts.max_iterations {
        iters += 1;
        let alpha = half * (lo + hi);
        let (phi, phi_prime) = eval_phi(cost, x_p, d, alpha, x_c, g_c);

        if phi > f_p + opts.c1 * alpha * g0 || phi >= phi_lo {
            hi = alpha;
            continue;
        }

        if fabs(phi_prime) <= opts.c2 * fabs(g0) {
            return LineSearchOutcome { success: true, num_iterations: iters, final_cost: phi, step_size: alpha };
        }

        if phi_prime * (hi - lo) >= T::zero() {
            hi = lo;
        }
        lo = alpha;
        phi_lo = phi;
    }

    LineSearchOutcome { success: false, num_iterations: iters, final_cost: phi_lo, step_size: lo }
}

#[inline]
fn fabs<T: Scalar>(x: T) -> T {
    num_traits::Float::abs(x)
}

/// Brackets an interval containing an acceptable step, then hands off to [`zoom`].
#[allow(clippy::too_many_arguments)]
pub(super) fn search<T: Scalar, C: Cost<T, N>, const N: usize>(
    cost: &C,
    opts: &LineSearchOptions<T>,
    x_p: &[T; N],
    d: &[T; N],
    f_p: T,
    g0: T,
    alpha0: T,
    x_c: &mut [T; N],
    g_c: &mut [T; N],
) -> LineSearchOutcome<T> {
    let floor = alpha_floor::<T>();
    let growth = lit::<T>(2.0);

    let mut alpha_prev = T::zero();
    let mut phi_prev = f_p;
    let mut alpha = alpha0;

    for iter in 0..opts.max_iterations {
        let (phi, phi_prime) = eval_phi(cost, x_p, d, alpha, x_c, g_c);

        if phi > f_p + opts.c1 * alpha * g0 || (iter > 0 && phi >= phi_prev) {
            return zoom(cost, opts, x_p, d, f_p, g0, alpha_prev, alpha, phi_prev, iter + 1, x_c, g_c);
        }

        if fabs(phi_prime) <= opts.c2 * fabs(g0) {
            return LineSearchOutcome {
                success: true,
                num_iterations: iter + 1,
                final_cost: phi,
                step_size: alpha,
            };
        }

        if phi_prime >= T::zero() {
            return zoom(cost, opts, x_p, d, f_p, g0, alpha, alpha_prev, phi, iter + 1, x_c, g_c);
        }

        alpha_prev = alpha;
        phi_prev = phi;
        alpha = alpha * growth;
        if alpha < floor {
            break;
        }
    }

    LineSearchOutcome {
        success: false,
        num_iterations: opts.max_iterations,
        final_cost: phi_prev,
        step_size: alpha_prev,
    }
}
