// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: identifiers, redraw strategies, session phases, pass flags, and configuration.
//!
//! ## Overview
//!
//! These types describe the exit protocol between the [root driver](crate::driver), the
//! [interceptor](crate::intercept), and the [host](crate::host::Host).
//! They are cheap to copy and carry no references into the session.

use core::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a component instance.
///
/// Allocated once per [`Instance`](crate::instance::Instance) and stable for as long as
/// the component tree keeps that instance alive. Identifiers are never reused within a process.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifier of a mount point.
///
/// One is allocated per [`Exitable::mount`](crate::exitable::Exitable::mount) call and per
/// [`Exitable::route`](crate::exitable::Exitable::route) call. Every root rendered into the
/// same mount point shares one registry table, so a route change still sees the exitable
/// descendants of the page it replaces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MountId(pub(crate) u32);

impl MountId {
    /// Raw identifier value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// One-shot strategy for the next draw, set through
/// [`Host::set_redraw_strategy`](crate::host::Host::set_redraw_strategy).
///
/// Hosts reset the strategy to [`Diff`](Self::Diff) after the draw that consumed it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RedrawStrategy {
    /// Discard retained state and rebuild every root from scratch.
    All,
    /// Diff the new tree against the previous one and patch the difference.
    #[default]
    Diff,
    /// Take the returned tree as the current state without computing a new diff.
    ///
    /// Used by the resynchronization pass after exits have settled: the tree replayed
    /// there is one the host has already seen. Hooks of reused elements are skipped; an
    /// element created by this draw still gets its first attach call.
    Resync,
}

/// Observable state of a [`Session`](crate::session::Session).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Views run fresh and exits are detected.
    Normal,
    /// At least one batch of exits is in flight; the host holds scheduled redraws.
    Suspended,
    /// The forced resynchronization draw is running; roots replay their last output.
    Reverting,
}

bitflags::bitflags! {
    /// What the root driver did on its most recent pass for a mount point.
    ///
    /// Read with [`Session::last_pass`](crate::session::Session::last_pass).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PassFlags: u8 {
        /// The pass replayed the cached output of the previous normal pass.
        const REPLAYED           = 0b0000_0001;
        /// The pass returned [`View::Retain`](crate::view::View::Retain) instead of the fresh output.
        const RETAINED           = 0b0000_0010;
        /// At least one exit handler was invoked.
        const EXITS_STARTED      = 0b0000_0100;
        /// A removed instance was skipped because the host never attached its anchor.
        const SKIPPED_UNANCHORED = 0b0000_1000;
    }
}

/// Session configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Keep the last output of every root and replay it in a forced
    /// [`Resync`](RedrawStrategy::Resync) draw once exits settle.
    ///
    /// When disabled, the driver only holds redraws until the exits settle and then
    /// releases them; the host's next regular draw does the cleanup.
    pub replay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { replay: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique_and_increasing() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert_ne!(a, b);
        assert!(b > a, "ids are allocated in increasing order");
    }

    #[test]
    fn default_strategy_is_diff() {
        assert_eq!(RedrawStrategy::default(), RedrawStrategy::Diff);
    }

    #[test]
    fn replay_is_enabled_by_default() {
        assert!(Config::default().replay);
    }

    #[test]
    fn pass_flags_combine() {
        let flags = PassFlags::RETAINED | PassFlags::EXITS_STARTED;
        assert!(flags.contains(PassFlags::RETAINED));
        assert!(!flags.contains(PassFlags::REPLAYED));
        assert_eq!(PassFlags::default(), PassFlags::empty());
    }
}
