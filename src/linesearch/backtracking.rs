// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Plain backtracking line search: shrink `alpha` until the Armijo condition holds.

use super::{alpha_floor, eval_phi, LineSearchOptions, LineSearchOutcome};
use crate::cost::Cost;
use crate::scalar::Scalar;

/// Shrinks `alpha <- rho * alpha` starting from `alpha0` until
/// `phi(alpha) <= f_p + c1 * alpha * g0`, or fails on iteration budget / step underflow.
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
    let mut alpha = alpha0;

    for iter in 0..opts.max_iterations {
        let (phi, _) = eval_phi(cost, x_p, d, alpha, x_c, g_c);
        let armijo_bound = f_p + opts.c1 * alpha * g0;
        if phi <= armijo_bound {
            return LineSearchOutcome {
                success: true,
                num_iterations: iter + 1,
                final_cost: phi,
                step_size: alpha,
            };
        }
        alpha = opts.rho * alpha;
        if alpha < floor {
            break;
        }
    }

    LineSearchOutcome {
        success: false,
        num_iterations: opts.max_iterations,
        final_cost: f_p,
        step_size: alpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{AutoDiffCost, DualFn};
    use crate::linesearch::LineSearchKind;
    use crate::scalar::DualField;

    struct Quadratic;
    impl DualFn<f64, 2> for Quadratic {
        fn eval<V: DualField<f64>>(&self, x: &[V; 2]) -> V {
            x[0].square() + x[1].square()
        }
    }

    #[test]
    fn finds_sufficient_decrease_step() {
        let cost = AutoDiffCost::new(Quadratic);
        let opts = LineSearchOptions::new(LineSearchKind::Armijo, 50).unwrap();
        let x_p = [1.0, 1.0];
        let mut g_p = [0.0; 2];
        let f_p = cost.evaluate(&x_p, &mut g_p);
        let d = [-g_p[0], -g_p[1]];
        let g0 = -(g_p[0] * g_p[0] + g_p[1] * g_p[1]);

        let mut x_c = [0.0; 2];
        let mut g_c = [0.0; 2];
        let outcome = search(&cost, &opts, &x_p, &d, f_p, g0, 1.0, &mut x_c, &mut g_c);
        assert!(outcome.success);
        assert!(outcome.final_cost < f_p);
    }

    #[test]
    fn fails_when_budget_exhausted_on_non_decreasing_direction() {
        let cost = AutoDiffCost::new(Quadratic);
        let opts = LineSearchOptions::with_params(LineSearchKind::Armijo, 3, 0.4, 0.9, 0.9).unwrap();
        let x_p = [1.0, 1.0];
        let mut g_p = [0.0; 2];
        let f_p = cost.evaluate(&x_p, &mut g_p);
        // A direction barely better than flat, with a weak contraction factor and a tiny budget,
        // is expected to fail to satisfy a demanding c1 within 3 trials.
        let d = [-1e-3, -1e-3];
        let g0 = g_p[0] * d[0] + g_p[1] * d[1];

        let mut x_c = [0.0; 2];
        let mut g_c = [0.0; 2];
        let outcome = search(&cost, &opts, &x_p, &d, f_p, g0, 1.0, &mut x_c, &mut g_c);
        assert_eq!(outcome.num_iterations, 3);
        assert!(!outcome.success);
    }
}
