// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by exit completions.

use alloc::string::String;

use thiserror::Error;

/// Outcome of an exit transition that did not finish cleanly.
///
/// Failures never stop resynchronization: the driver waits for every completion of a
/// batch, logs the failures, and keeps them for
/// [`Session::take_exit_errors`](crate::session::Session::take_exit_errors).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExitError {
    /// The completion was dropped before it settled.
    #[error("exit completion was dropped before it settled")]
    Canceled,
    /// The exit transition reported a failure.
    #[error("exit transition failed: {0}")]
    Failed(String),
}
