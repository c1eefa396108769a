// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering session: the state shared by the interceptor and the root driver.
//!
//! ## Overview
//!
//! A [`Session`] owns the [`Registry`], the [`History`], and the reverting flag for one
//! render tree. It is passed explicitly (as `Rc<Session<E>>`) to the
//! [interceptor](crate::intercept) and [root driver](crate::driver); nothing is global, so
//! independent render trees never share state.
//!
//! Everything here runs on the render thread. Borrows are short and never held across a
//! view call, so nested views can register while the root pass is in progress.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell, RefMut};

use crate::error::ExitError;
use crate::history::History;
use crate::registry::Registry;
use crate::types::{Config, MountId, PassFlags, Phase};

/// State of one render tree.
pub struct Session<E> {
    config: Cell<Config>,
    registry: RefCell<Registry<E>>,
    history: RefCell<History<E>>,
    reverting: Cell<bool>,
    in_flight: RefCell<BTreeMap<MountId, usize>>,
    next_mount: Cell<u32>,
    last_pass: RefCell<BTreeMap<MountId, PassFlags>>,
    exit_errors: RefCell<Vec<ExitError>>,
}

impl<E> core::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config.get())
            .field("reverting", &self.reverting.get())
            .field("in_flight", &self.in_flight.borrow().values().sum::<usize>())
            .field("mounts", &self.next_mount.get())
            .finish_non_exhaustive()
    }
}

impl<E: Clone> Default for Session<E> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<E: Clone> Session<E> {
    /// Create a session.
    pub fn new(config: Config) -> Self {
        Self {
            config: Cell::new(config),
            registry: RefCell::new(Registry::new()),
            history: RefCell::new(History::new()),
            reverting: Cell::new(false),
            in_flight: RefCell::new(BTreeMap::new()),
            next_mount: Cell::new(0),
            last_pass: RefCell::new(BTreeMap::new()),
            exit_errors: RefCell::new(Vec::new()),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> Config {
        self.config.get()
    }

    /// Replace the configuration. Takes effect on the next pass.
    pub fn set_config(&self, config: Config) {
        self.config.set(config);
    }

    /// Observable phase.
    ///
    /// Reverting wins over suspended: other mounts may still be waiting on their exits
    /// while one mount resynchronizes.
    pub fn phase(&self) -> Phase {
        if self.reverting.get() {
            Phase::Reverting
        } else if self.in_flight() > 0 {
            Phase::Suspended
        } else {
            Phase::Normal
        }
    }

    /// Returns `true` while the resynchronization draw runs.
    pub fn is_reverting(&self) -> bool {
        self.reverting.get()
    }

    /// Number of exit batches that have not settled yet, across all mounts.
    pub fn in_flight(&self) -> usize {
        self.in_flight.borrow().values().sum()
    }

    /// Number of unsettled exit batches started by passes of `mount`.
    pub fn in_flight_for(&self, mount: MountId) -> usize {
        self.in_flight.borrow().get(&mount).copied().unwrap_or(0)
    }

    /// Allocate a fresh mount point.
    pub fn allocate_mount(&self) -> MountId {
        let id = self.next_mount.get();
        self.next_mount.set(id + 1);
        MountId(id)
    }

    /// Borrow the registry.
    pub fn registry(&self) -> Ref<'_, Registry<E>> {
        self.registry.borrow()
    }

    /// Borrow the output history.
    pub fn history(&self) -> Ref<'_, History<E>> {
        self.history.borrow()
    }

    /// Flags of the most recent pass for `mount`.
    pub fn last_pass(&self, mount: MountId) -> Option<PassFlags> {
        self.last_pass.borrow().get(&mount).copied()
    }

    /// Take the failures collected from settled exit batches.
    pub fn take_exit_errors(&self) -> Vec<ExitError> {
        core::mem::take(&mut *self.exit_errors.borrow_mut())
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, Registry<E>> {
        self.registry.borrow_mut()
    }

    pub(crate) fn history_mut(&self) -> RefMut<'_, History<E>> {
        self.history.borrow_mut()
    }

    pub(crate) fn set_reverting(&self, reverting: bool) {
        self.reverting.set(reverting);
    }

    pub(crate) fn begin_batch(&self, mount: MountId) {
        *self.in_flight.borrow_mut().entry(mount).or_insert(0) += 1;
    }

    pub(crate) fn end_batch(&self, mount: MountId) {
        let mut in_flight = self.in_flight.borrow_mut();
        if let Some(count) = in_flight.get_mut(&mount) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(&mount);
            }
        }
    }

    pub(crate) fn note_pass(&self, mount: MountId, flags: PassFlags) {
        self.last_pass.borrow_mut().insert(mount, flags);
    }

    pub(crate) fn push_exit_errors(&self, errors: impl IntoIterator<Item = ExitError>) {
        self.exit_errors.borrow_mut().extend(errors);
    }
}
