// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Error types.
//!
//! Every variant here is raised at construction time, when an option struct is given a value
//! that violates one of its documented preconditions. `solve` itself never returns a `Result`;
//! run-time outcomes (non-convergence, line search failure, ascent direction) are reported as
//! booleans on [`crate::lbfgs::SolverResult`] and [`crate::lbfgs::SolverIteration`].

use thiserror::Error;

/// Errors produced while constructing solver or line search configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptError {
    /// A parameter was out of its documented valid range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Human readable description of the violated constraint.
        message: String,
    },
    /// A value that must be set before use was left at a default that cannot be used as-is.
    #[error("Not initialized: {message}")]
    NotInitialized {
        /// Human readable description.
        message: String,
    },
}
