// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # References:
//!
//! \[0\] Jorge Nocedal and Stephen J. Wright (2006). Numerical Optimization.
//! Springer. ISBN 0-387-30303-0.

use crate::cost::Cost;
use crate::dual::aggregate::dot;
use crate::error::OptError;
use crate::linesearch::{self, LineSearchOptions};
use crate::macros::check_param;
use crate::scalar::{lit, Scalar};

/// Largest history capacity `m` a driver instance may be constructed with.
///
/// `m` is a runtime constructor argument (mirroring the reference), but Rust needs a
/// compile-time bound to keep the circular buffer stack-allocated; 32 is comfortably above any
/// `m` a real L-BFGS run would use (the canonical default is 3-20).
pub const MAX_HISTORY: usize = 32;

/// Default history capacity, `m = 6`.
pub const DEFAULT_HISTORY_CAPACITY: usize = 6;

/// One stored curvature pair plus the scratch values the two-loop recursion fills in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LBFGSHistorySlot<T: Scalar, const N: usize> {
    /// `s = x_c - x_p`.
    pub s: [T; N],
    /// `y = g_c - g_p`.
    pub y: [T; N],
    /// `alpha` computed on the most recent backward pass of the two-loop recursion.
    pub alpha: T,
    /// `rho = 1 / (s . y)`.
    pub rho: T,
}

/// Configuration for the outer L-BFGS loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions<T: Scalar> {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Convergence test: `||gc||^2 < gradient_tolerance * max(||xc||^2, 1)`.
    pub gradient_tolerance: T,
    /// When true, the initial step of each outer iteration is `1 / sqrt(||direction||^2)`
    /// rather than a fixed `initial_step_size`.
    pub estimate_step_size: bool,
    /// Fixed initial step, used when `estimate_step_size` is false.
    pub initial_step_size: T,
    /// Line search configuration.
    pub linesearch: LineSearchOptions<T>,
}

impl<T: Scalar> SolverOptions<T> {
    /// Constructs options with the documented defaults: `max_iterations = 20`,
    /// `gradient_tolerance = 1e-10`, `estimate_step_size = false`, `initial_step_size = 1`.
    pub fn new(linesearch: LineSearchOptions<T>) -> Result<Self, OptError> {
        Self::with_params(20, lit(1e-10), false, T::one(), linesearch)
    }

    /// Constructs options with every field explicit, validating preconditions.
    pub fn with_params(
        max_iterations: usize,
        gradient_tolerance: T,
        estimate_step_size: bool,
        initial_step_size: T,
        linesearch: LineSearchOptions<T>,
    ) -> Result<Self, OptError> {
        check_param!(max_iterations > 0, "max_iterations must be > 0");
        check_param!(gradient_tolerance > T::zero(), "gradient_tolerance must be > 0");
        check_param!(initial_step_size > T::zero(), "initial_step_size must be > 0");
        Ok(SolverOptions { max_iterations, gradient_tolerance, estimate_step_size, initial_step_size, linesearch })
    }
}

/// Record of one outer iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverIteration<T: Scalar> {
    /// Whether this iteration's line search found an acceptable step.
    pub success: bool,
    /// Number of trial steps the line search evaluated.
    pub line_search_iterations: usize,
    /// The accepted (or last attempted) step length.
    pub step_size: T,
    /// Cost at the end of this iteration.
    pub cost: T,
    /// `||xc||` at the end of this iteration.
    pub param_norm: T,
    /// `||gc||` at the end of this iteration.
    pub gradient_norm: T,
}

/// Outcome of a full `solve` run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult<T: Scalar> {
    /// Whether the gradient tolerance was met before `max_iterations` was exhausted.
    pub success: bool,
    /// Cost at the starting point.
    pub first_cost: T,
    /// Cost at the final point reached (the best point found, even on failure).
    pub final_cost: T,
    /// One entry per outer iteration, in execution order.
    pub iterations: Vec<SolverIteration<T>>,
}

#[inline]
fn norm_sq<T: Scalar, const N: usize>(x: &[T; N]) -> T {
    dot(x, x)
}

#[inline]
fn axpy_sub<T: Scalar, const N: usize>(a: &[T; N], b: &[T; N]) -> [T; N] {
    std::array::from_fn(|i| a[i] - b[i])
}

/// Limited-memory BFGS driver with a backtracking line search.
///
/// Holds a fixed-size circular buffer of up to [`MAX_HISTORY`] curvature pairs; only the first
/// `m` slots (the capacity given to [`LBFGS::new`]) are ever written. `m == 0` degrades every
/// iteration's direction to plain steepest descent, folded into the same loop rather than split
/// into a separate solver type.
pub struct LBFGS<T: Scalar, const N: usize> {
    m: usize,
    history: [Option<LBFGSHistorySlot<T, N>>; MAX_HISTORY],
    write: usize,
    len: usize,
    #[cfg(feature = "slog-logger")]
    logger: slog::Logger,
}

impl<T: Scalar, const N: usize> LBFGS<T, N> {
    /// Constructs a driver with history capacity `m` (0 means steepest descent).
    pub fn new(m: usize) -> Result<Self, OptError> {
        check_param!(
            m <= MAX_HISTORY,
            format!("history capacity m = {m} exceeds the compiled-in maximum of {MAX_HISTORY}")
        );
        Ok(LBFGS {
            m,
            history: std::array::from_fn(|_| None),
            write: 0,
            len: 0,
            #[cfg(feature = "slog-logger")]
            logger: slog::Logger::root(slog::Discard, slog::o!()),
        })
    }

    /// Attaches a structured logger; one `debug`-level record is emitted per outer iteration.
    /// Defaults to discarding all records.
    #[cfg(feature = "slog-logger")]
    #[must_use]
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Attaches a logger that writes to the terminal, blocking on overflow.
    #[cfg(feature = "slog-logger")]
    #[must_use]
    pub fn with_term_logger(self) -> Self {
        self.with_logger(term_logger(slog_async::OverflowStrategy::Block))
    }

    /// Attaches a logger that writes to the terminal, dropping records on overflow instead of
    /// blocking the optimization loop.
    #[cfg(feature = "slog-logger")]
    #[must_use]
    pub fn with_term_logger_noblock(self) -> Self {
        self.with_logger(term_logger(slog_async::OverflowStrategy::Drop))
    }

    fn push_slot(&mut self, slot: LBFGSHistorySlot<T, N>) {
        self.history[self.write] = Some(slot);
        self.write = (self.write + 1) % self.m;
        self.len = (self.len + 1).min(self.m);
    }

    /// Computes the new search direction `sv = -Hc . gc` via the two-loop recursion, reading
    /// and updating the `alpha` scratch field of each visited slot in place.
    fn two_loop_direction(&mut self, gc: &[T; N], gamma: T) -> [T; N] {
        let mut q: [T; N] = std::array::from_fn(|i| -gc[i]);

        // newest -> oldest
        for offset in 0..self.len {
            let idx = (self.write + self.m - 1 - offset) % self.m;
            let (s, y, rho) = {
                let slot = self.history[idx].as_ref().unwrap();
                (slot.s, slot.y, slot.rho)
            };
            let a = rho * dot(&s, &q);
            for i in 0..N {
                q[i] = q[i] - a * y[i];
            }
            self.history[idx].as_mut().unwrap().alpha = a;
        }

        let mut r: [T; N] = std::array::from_fn(|i| gamma * q[i]);

        // oldest -> newest
        for offset in (0..self.len).rev() {
            let idx = (self.write + self.m - 1 - offset) % self.m;
            let slot = self.history[idx].as_ref().unwrap();
            let beta = slot.rho * dot(&slot.y, &r);
            let a = slot.alpha;
            for i in 0..N {
                r[i] = r[i] + (a - beta) * slot.s[i];
            }
        }

        r
    }

    /// Runs the optimizer in place: on return, `x` holds the best point reached, even on
    /// failure (the last successful line-search point).
    pub fn solve<C: Cost<T, N>>(&mut self, cost: &C, opts: &SolverOptions<T>, x: &mut [T; N]) -> SolverResult<T> {
        self.write = 0;
        self.len = 0;

        let mut xc = *x;
        let mut gc = [T::zero(); N];
        let mut f = cost.evaluate(&xc, &mut gc);
        let first_cost = f;

        let mut iterations = Vec::with_capacity(opts.max_iterations);

        let n2_start = norm_sq(&xc).max(T::one());
        if norm_sq(&gc) < n2_start * opts.gradient_tolerance {
            *x = xc;
            return SolverResult { success: true, first_cost, final_cost: f, iterations };
        }

        let mut sv: [T; N] = std::array::from_fn(|i| -gc[i]);
        let mut alpha = if opts.estimate_step_size {
            T::one() / fsqrt(norm_sq(&gc))
        } else {
            opts.initial_step_size
        };

        let mut success = false;

        for k in 0..opts.max_iterations {
            let xp = xc;
            let gp = gc;

            let outcome = linesearch::search(cost, &opts.linesearch, &xp, &gp, &sv, f, alpha, &mut xc, &mut gc);

            #[cfg(feature = "slog-logger")]
            slog::debug!(self.logger, "lbfgs iteration";
                "k" => k, "cost" => format!("{:?}", outcome.final_cost),
                "step_size" => format!("{:?}", outcome.step_size),
                "ls_iterations" => outcome.num_iterations,
                "ls_success" => outcome.success,
            );

            if !outcome.success {
                xc = xp;
                gc = gp;
                iterations.push(SolverIteration {
                    success: false,
                    line_search_iterations: outcome.num_iterations,
                    step_size: outcome.step_size,
                    cost: f,
                    param_norm: fsqrt(norm_sq(&xc)),
                    gradient_norm: fsqrt(norm_sq(&gc)),
                });
                success = false;
                break;
            }

            f = outcome.final_cost;
            let xnorm2 = norm_sq(&xc);
            let gnorm2 = norm_sq(&gc);
            let n2 = xnorm2.max(T::one());

            if gnorm2 < n2 * opts.gradient_tolerance {
                iterations.push(SolverIteration {
                    success: true,
                    line_search_iterations: outcome.num_iterations,
                    step_size: outcome.step_size,
                    cost: f,
                    param_norm: fsqrt(xnorm2),
                    gradient_norm: fsqrt(gnorm2),
                });
                success = true;
                break;
            }

            let reached_budget = k + 1 >= opts.max_iterations;

            if self.m > 0 {
                let s = axpy_sub(&xc, &xp);
                let y = axpy_sub(&gc, &gp);
                let ys: T = dot(&y, &s);
                #[allow(clippy::float_cmp)]
                let degenerate = ys == T::zero();
                if degenerate {
                    iterations.push(SolverIteration {
                        success: false,
                        line_search_iterations: outcome.num_iterations,
                        step_size: outcome.step_size,
                        cost: f,
                        param_norm: fsqrt(xnorm2),
                        gradient_norm: fsqrt(gnorm2),
                    });
                    success = false;
                    break;
                }
                let yy: T = dot(&y, &y);
                let gamma = ys / yy;
                let rho = T::one() / ys;
                self.push_slot(LBFGSHistorySlot { s, y, alpha: T::zero(), rho });
                sv = self.two_loop_direction(&gc, gamma);
            } else {
                sv = std::array::from_fn(|i| -gc[i]);
            }

            alpha = if opts.estimate_step_size {
                T::one() / fsqrt(norm_sq(&sv))
            } else {
                opts.initial_step_size
            };

            iterations.push(SolverIteration {
                success: true,
                line_search_iterations: outcome.num_iterations,
                step_size: outcome.step_size,
                cost: f,
                param_norm: fsqrt(xnorm2),
                gradient_norm: fsqrt(gnorm2),
            });

            if reached_budget {
                success = false;
                break;
            }
        }

        *x = xc;
        SolverResult { success, first_cost, final_cost: f, iterations }
    }
}

#[inline]
fn fsqrt<T: Scalar>(x: T) -> T {
    num_traits::Float::sqrt(x)
}

/// Builds a terminal-backed `slog::Logger`, async-buffered with the given overflow strategy.
#[cfg(feature = "slog-logger")]
fn term_logger(overflow_strategy: slog_async::OverflowStrategy) -> slog::Logger {
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_original_order().build().fuse();
    let drain = slog_async::Async::new(drain).overflow_strategy(overflow_strategy).build().fuse();
    slog::Logger::root(drain, slog::o!())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{AutoDiffCost, DualFn, NumericDiffCost};
    use crate::linesearch::LineSearchKind;
    use crate::macros::scalar_send_sync_test;
    use crate::scalar::DualField;
    use rand::SeedableRng;
    use rand::Rng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    scalar_send_sync_test!(solver_options_send_sync, SolverOptions<f64>);
    scalar_send_sync_test!(solver_iteration_send_sync, SolverIteration<f64>);
    scalar_send_sync_test!(solver_result_send_sync, SolverResult<f64>);

    struct ScenarioA;
    impl DualFn<f64, 3> for ScenarioA {
        fn eval<V: DualField<f64>>(&self, x: &[V; 3]) -> V {
            let a = x[0] + x[1] - V::from_scalar(1.0);
            let b = x[1] + x[2] + V::from_scalar(5.0);
            let c = x[2] + x[0] + V::from_scalar(3.0);
            a.square() + b.square() + c.square()
        }
    }

    #[test]
    fn scenario_a_trivial_quadratic_converges() {
        let cost = AutoDiffCost::new(ScenarioA);
        let ls = LineSearchOptions::new(LineSearchKind::StrongWolfe, 50).unwrap();
        let opts = SolverOptions::with_params(50, 1e-10, false, 0.5, ls).unwrap();

        let mut solver: LBFGS<f64, 3> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
        let mut x = [0.5, 0.5, 0.5];
        let result = solver.solve(&cost, &opts, &mut x);

        assert!(result.success);
        assert!(result.first_cost > 30.0);
        assert!(result.final_cost < 1e-10);
        assert!(result.iterations.len() <= 50);
    }

    #[cfg(feature = "slog-logger")]
    #[test]
    fn term_logger_attaches_and_solves() {
        let cost = AutoDiffCost::new(ScenarioA);
        let ls = LineSearchOptions::new(LineSearchKind::StrongWolfe, 50).unwrap();
        let opts = SolverOptions::with_params(50, 1e-10, false, 0.5, ls).unwrap();

        let mut solver: LBFGS<f64, 3> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap().with_term_logger_noblock();
        let mut x = [0.5, 0.5, 0.5];
        let result = solver.solve(&cost, &opts, &mut x);
        assert!(result.success);
    }

    fn rosenbrock3<V: DualField<f64>>(x: &[V; 3]) -> V {
        let hundred = V::from_scalar(100.0);
        let one = V::from_scalar(1.0);
        let mut acc = V::from_scalar(0.0);
        for i in 0..2 {
            let t1 = x[i + 1] - x[i].square();
            let t2 = one - x[i];
            acc = acc + hundred * t1.square() + t2.square();
        }
        acc
    }

    #[test]
    fn scenario_b_rosenbrock_numeric_diff_hard_case() {
        fn plain_rosenbrock(x: &[f64; 3]) -> f64 {
            rosenbrock3(x)
        }
        let cost = NumericDiffCost::new(plain_rosenbrock);
        let ls = LineSearchOptions::new(LineSearchKind::StrongWolfe, 10).unwrap();
        let opts = SolverOptions::with_params(50, 1e-10, true, 1.0, ls).unwrap();

        let mut solver: LBFGS<f64, 3> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
        let mut x = [-1.2, 0.4, -0.1];
        let result = solver.solve(&cost, &opts, &mut x);

        assert!(!result.success);
        assert_eq!(result.iterations.len(), 50);
        assert!(result.first_cost > 30.0);
        assert!(result.final_cost < 5.0);
    }

    #[test]
    fn scenario_f_immediate_convergence_guard() {
        struct AlreadyFlat;
        impl DualFn<f64, 2> for AlreadyFlat {
            fn eval<V: DualField<f64>>(&self, x: &[V; 2]) -> V {
                // constant cost: zero gradient everywhere.
                let _ = x;
                V::from_scalar(7.0)
            }
        }
        let cost = AutoDiffCost::new(AlreadyFlat);
        let ls = LineSearchOptions::new(LineSearchKind::Armijo, 20).unwrap();
        let opts = SolverOptions::new(ls).unwrap();
        let mut solver: LBFGS<f64, 2> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
        let mut x = [1.0, 1.0];
        let result = solver.solve(&cost, &opts, &mut x);

        assert!(result.success);
        assert!(result.iterations.is_empty());
        assert_eq!(result.first_cost, result.final_cost);
    }

    #[test]
    fn steepest_descent_when_m_is_zero_converges_on_sphere() {
        struct Sphere;
        impl DualFn<f64, 2> for Sphere {
            fn eval<V: DualField<f64>>(&self, x: &[V; 2]) -> V {
                x[0].square() + x[1].square()
            }
        }
        let cost = AutoDiffCost::new(Sphere);
        let ls = LineSearchOptions::new(LineSearchKind::StrongWolfe, 50).unwrap();
        let opts = SolverOptions::with_params(200, 1e-10, false, 0.5, ls).unwrap();
        let mut solver: LBFGS<f64, 2> = LBFGS::new(0).unwrap();
        let mut x = [3.0, -4.0];
        let result = solver.solve(&cost, &opts, &mut x);
        assert!(result.success);
        assert!(result.final_cost < 1e-8);
    }

    #[test]
    fn lbfgs_converges_on_random_positive_definite_quadratics() {
        // F(x) = 1/2 x^T A x - b^T x with A = M^T M + eps*I (guaranteed positive definite).
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..5 {
            let m_raw: [[f64; 3]; 3] = std::array::from_fn(|_| std::array::from_fn(|_| rng.gen_range(-2.0..2.0)));
            let mut a = [[0.0; 3]; 3];
            for i in 0..3 {
                for j in 0..3 {
                    let mut s = 0.0;
                    for k in 0..3 {
                        s += m_raw[k][i] * m_raw[k][j];
                    }
                    a[i][j] = s + if i == j { 1.0 } else { 0.0 };
                }
            }
            let b: [f64; 3] = std::array::from_fn(|_| rng.gen_range(-3.0..3.0));

            struct Quadratic {
                a: [[f64; 3]; 3],
                b: [f64; 3],
            }
            impl DualFn<f64, 3> for Quadratic {
                fn eval<V: DualField<f64>>(&self, x: &[V; 3]) -> V {
                    let half = V::from_scalar(0.5);
                    let mut quad = V::from_scalar(0.0);
                    let mut lin = V::from_scalar(0.0);
                    for i in 0..3 {
                        let mut ax_i = V::from_scalar(0.0);
                        for j in 0..3 {
                            ax_i = ax_i + V::from_scalar(self.a[i][j]) * x[j];
                        }
                        quad = quad + x[i] * ax_i;
                        lin = lin + V::from_scalar(self.b[i]) * x[i];
                    }
                    half * quad - lin
                }
            }

            let cost = AutoDiffCost::new(Quadratic { a, b });
            let ls = LineSearchOptions::new(LineSearchKind::StrongWolfe, 50).unwrap();
            let opts = SolverOptions::with_params(200, 1e-12, false, 1.0, ls).unwrap();
            let mut solver: LBFGS<f64, 3> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
            let mut x = [0.0, 0.0, 0.0];
            let result = solver.solve(&cost, &opts, &mut x);

            assert!(result.success, "expected convergence on a random PD quadratic");
            let mut g = [0.0; 3];
            let f = cost.evaluate(&x, &mut g);
            let _ = f;
            let gnorm2: f64 = dot(&g, &g);
            let xnorm2: f64 = dot(&x, &x);
            assert!(gnorm2 <= opts.gradient_tolerance * xnorm2.max(1.0) * 10.0, "gradient not small at termination");
        }
    }

    #[test]
    fn rejects_history_capacity_above_max() {
        let err: Result<LBFGS<f64, 2>, _> = LBFGS::new(MAX_HISTORY + 1);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_zero_max_iterations() {
        let ls = LineSearchOptions::<f64>::new(LineSearchKind::Armijo, 10).unwrap();
        let err = SolverOptions::with_params(0, 1e-10, false, 1.0, ls);
        assert!(err.is_err());
    }

    #[test]
    fn solve_restores_param_on_ascent_direction_guard() {
        // A cost whose gradient at the start is zero in one component and degenerate enough
        // that the very first line search direction is not a descent direction is exercised
        // indirectly via the scenario-B-style hard case above; here we check the simpler
        // contract that a failing run still returns a usable x and a populated iterations list
        // sized within max_iterations.
        fn plain_rosenbrock(x: &[f64; 3]) -> f64 {
            rosenbrock3(x)
        }
        let cost = NumericDiffCost::new(plain_rosenbrock);
        let ls = LineSearchOptions::new(LineSearchKind::Armijo, 2).unwrap();
        let opts = SolverOptions::with_params(5, 1e-10, false, 1.0, ls).unwrap();
        let mut solver: LBFGS<f64, 3> = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
        let mut x = [-1.2, 0.4, -0.1];
        let result = solver.solve(&cost, &opts, &mut x);
        assert!(result.iterations.len() <= 5);
        let _ = result.success;
    }
}
