// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Forward-mode automatic differentiation over a compile-time-sized dual number, and an
//! unconstrained L-BFGS minimizer built on top of it.
//!
//! # Layout
//!
//! - [`dual`] — `Var<T, N>`, the dual number carrier, its elementary functions, and the
//!   `sum`/`sumsq`/`dot` aggregates.
//! - [`cost`] — a uniform `evaluate(x, out g) -> value` contract, implemented either by seeding
//!   duals ([`cost::AutoDiffCost`]) or by central finite difference ([`cost::NumericDiffCost`]).
//! - [`linesearch`] — backtracking line search, Armijo-only or Strong-Wolfe.
//! - [`lbfgs`] — the outer L-BFGS driver: circular curvature history, two-loop recursion,
//!   convergence and degeneracy handling.
//!
//! # Quick example
//!
//! ```
//! use numopt::cost::{AutoDiffCost, DualFn};
//! use numopt::lbfgs::{LBFGS, SolverOptions, DEFAULT_HISTORY_CAPACITY};
//! use numopt::linesearch::{LineSearchKind, LineSearchOptions};
//! use numopt::scalar::DualField;
//!
//! struct Sphere;
//! impl DualFn<f64, 2> for Sphere {
//!     fn eval<V: DualField<f64>>(&self, x: &[V; 2]) -> V {
//!         x[0].square() + x[1].square()
//!     }
//! }
//!
//! let cost = AutoDiffCost::new(Sphere);
//! let linesearch = LineSearchOptions::new(LineSearchKind::StrongWolfe, 20).unwrap();
//! let opts = SolverOptions::new(linesearch).unwrap();
//! let mut solver = LBFGS::new(DEFAULT_HISTORY_CAPACITY).unwrap();
//! let mut x = [3.0, -4.0];
//!
//! let result = solver.solve(&cost, &opts, &mut x);
//! assert!(result.success);
//! ```
#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::float_cmp))]

pub(crate) mod macros;

pub mod cost;
pub mod dual;
pub mod error;
pub mod lbfgs;
pub mod linesearch;
pub mod scalar;

pub use cost::Cost;
pub use dual::Var;
pub use error::OptError;
pub use lbfgs::{SolverIteration, SolverOptions, SolverResult, LBFGS};
pub use linesearch::{LineSearchKind, LineSearchOptions};
pub use scalar::Scalar;
