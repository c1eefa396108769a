// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_exit --heading-base-level=0

//! Understory Exit: deferred, animated removal for immediate-mode virtual DOM renderers.
//!
//! ## Overview
//!
//! Immediate-mode renderers rebuild the whole tree on every draw and have no notion of a
//! node that is "on its way out". This crate adds one: a component instance may declare an
//! exit handler, and when the instance stops appearing in its root's output, the handler
//! runs against the element it last rendered into, and the live DOM is kept until the
//! handler's [`Completion`](crate::completion::Completion) settles.
//!
//! It does not diff, patch, animate, or route. Those stay with the host renderer, reached
//! through the narrow [`Host`](crate::host::Host) trait.
//!
//! ## Pieces
//!
//! - [`View`](crate::view::View): render output, a tagged node-or-sequence tree with a
//!   [`Retain`](crate::view::View::Retain) sentinel and a typed anchor accessor.
//! - [`Instance`](crate::instance::Instance) and [`Component`](crate::instance::Component):
//!   identity, optional exit handler, and view function.
//! - [`Registry`](crate::registry::Registry): which exitable instances each mount point
//!   rendered on the current pass.
//! - [`intercept`](crate::intercept::intercept): wraps a view so exitable instances register and
//!   capture their anchor element when the host attaches it.
//! - [`root`](crate::driver::root): wraps a root view; diffs registrations between passes,
//!   invokes exit handlers, holds redraws, and resynchronizes the host once exits settle.
//! - [`History`](crate::history::History): last output per mount point, replayed by the
//!   resynchronization draw.
//! - [`Session`](crate::session::Session): the state above, owned per render tree.
//! - [`Exitable`](crate::exitable::Exitable): host adapter exposing `mount`, `route`, and
//!   `component` with all of the above applied.
//!
//! ## Pass protocol
//!
//! 1) The host draws; the root driver snapshots and clears its mount's registry table.
//! 2) The intercepted view runs; exitable instances that still render register again.
//! 3) Snapshot entries that did not come back are removed: their exit handlers run in
//!    snapshot order with the anchor of the previous pass.
//! 4) If any exit ran, the pass returns [`Retain`](crate::view::View::Retain) and the host
//!    holds redraws.
//! 5) When every completion of the batch has settled, the driver forces one
//!    [`Resync`](crate::types::RedrawStrategy::Resync) draw, then releases the hold. Mounts
//!    with no unsettled batch replay their recorded output; mounts still waiting on their
//!    own exits retain.
//!
//! ## Failure model
//!
//! A completion that never settles keeps redraws held; there is no timeout. Failed
//! completions are logged with [`tracing`] and collected in the session; resynchronization
//! runs regardless. A panicking exit handler is not caught.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod completion;
pub mod driver;
pub mod error;
pub mod exitable;
pub mod history;
pub mod host;
pub mod instance;
pub mod intercept;
pub mod registry;
pub mod session;
pub mod types;
pub mod util;
pub mod view;

#[cfg(test)]
mod testing;

pub use completion::Completion;
pub use error::ExitError;
pub use exitable::Exitable;
pub use host::{Host, Routes};
pub use instance::{Component, Instance};
pub use types::{Config, InstanceId, MountId, PassFlags, Phase, RedrawStrategy};
pub use view::{Element, Hook, View};
