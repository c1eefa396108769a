// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Completion handles returned by exit handlers.
//!
//! ## Overview
//!
//! An exit handler starts a removal transition and returns a [`Completion`] that settles
//! once the transition is done. The driver joins every completion of a pass before it
//! resynchronizes the host.
//!
//! Animation code that is callback driven rather than `async` can use [`channel`]:
//!
//! ```
//! use understory_exit::completion;
//!
//! let (done, completion) = completion::channel();
//! // Hand `done` to the animation; call `finish` from its end callback.
//! done.finish();
//! assert_eq!(futures::executor::block_on(completion), Ok(()));
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use core::future::Future;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};

use crate::error::ExitError;

/// Handle that settles when an exit transition has finished.
pub type Completion = LocalBoxFuture<'static, Result<(), ExitError>>;

/// A completion that has already settled successfully.
pub fn ready() -> Completion {
    Box::pin(future::ready(Ok(())))
}

/// A completion that has already settled with [`ExitError::Failed`].
pub fn failed(reason: impl Into<String>) -> Completion {
    let error = ExitError::Failed(reason.into());
    Box::pin(future::ready(Err(error)))
}

/// Wrap an infallible future as a completion.
pub fn from_future<F>(fut: F) -> Completion
where
    F: Future<Output = ()> + 'static,
{
    fut.map(Ok).boxed_local()
}

/// Create a completion settled from outside through an [`ExitDone`].
///
/// Dropping the [`ExitDone`] without settling it settles the completion with
/// [`ExitError::Canceled`].
pub fn channel() -> (ExitDone, Completion) {
    let (tx, rx) = oneshot::channel();
    let completion = rx
        .map(|settled| settled.unwrap_or(Err(ExitError::Canceled)))
        .boxed_local();
    (ExitDone { tx }, completion)
}

/// Sending half of [`channel`].
#[derive(Debug)]
pub struct ExitDone {
    tx: oneshot::Sender<Result<(), ExitError>>,
}

impl ExitDone {
    /// Settle the completion successfully.
    pub fn finish(self) {
        // The driver may have dropped the receiver; nothing is waiting then.
        let _ = self.tx.send(Ok(()));
    }

    /// Settle the completion with [`ExitError::Failed`].
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(ExitError::Failed(reason.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn ready_and_failed_settle_immediately() {
        assert_eq!(block_on(ready()), Ok(()));
        assert_eq!(
            block_on(failed("interrupted")),
            Err(ExitError::Failed("interrupted".into()))
        );
    }

    #[test]
    fn from_future_maps_to_ok() {
        assert_eq!(block_on(from_future(async {})), Ok(()));
    }

    #[test]
    fn channel_reports_fail_reason() {
        let (done, completion) = channel();
        done.fail("layout lost");
        assert_eq!(
            block_on(completion),
            Err(ExitError::Failed("layout lost".into()))
        );
    }

    #[test]
    fn dropped_sender_cancels() {
        let (done, completion) = channel();
        drop(done);
        assert_eq!(block_on(completion), Err(ExitError::Canceled));
    }
}
