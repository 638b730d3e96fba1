// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Internal macros. Not part of the public API.

/// Builds an [`crate::error::OptError`] variant with a formatted message, mirroring the
/// `argmin_error!`-style helpers used for constructor-time validation.
macro_rules! opt_error {
    ($variant:ident, $msg:expr) => {
        crate::error::OptError::$variant {
            message: $msg.to_string(),
        }
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        crate::error::OptError::$variant {
            message: format!($fmt, $($arg)*),
        }
    };
}

/// Returns early with an [`crate::error::OptError::InvalidParameter`] unless `cond` holds.
macro_rules! check_param {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err(opt_error!(InvalidParameter, $msg));
        }
    };
}

/// Asserts that a type is `Send + Sync + Clone`, the minimum bound every public option and
/// result struct in this crate is expected to satisfy.
#[cfg(test)]
macro_rules! scalar_send_sync_test {
    ($name:ident, $type:ty) => {
        #[allow(non_snake_case)]
        #[test]
        fn $name() {
            fn assert_send_sync_clone<T: Send + Sync + Clone>() {}
            assert_send_sync_clone::<$type>();
        }
    };
}

pub(crate) use check_param;
pub(crate) use opt_error;
#[cfg(test)]
pub(crate) use scalar_send_sync_test;
