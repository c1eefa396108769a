// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output history: the last tree each mount's root produced on a normal pass.
//!
//! Written on every normal pass, read only during the resynchronization draw. Entries are
//! keyed by mount point; a mount shows one root at a time, so a route change overwrites the
//! previous page's entry instead of adding one.

use alloc::collections::BTreeMap;

use crate::types::MountId;
use crate::view::View;

/// Last rendered output per mount point.
#[derive(Debug)]
pub struct History<E> {
    outputs: BTreeMap<MountId, View<E>>,
}

impl<E> Default for History<E> {
    fn default() -> Self {
        Self {
            outputs: BTreeMap::new(),
        }
    }
}

impl<E: Clone> History<E> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `output` as the latest tree of `mount`, replacing the previous one.
    pub fn record(&mut self, mount: MountId, output: View<E>) {
        self.outputs.insert(mount, output);
    }

    /// Latest tree of `mount`.
    pub fn get(&self, mount: MountId) -> Option<&View<E>> {
        self.outputs.get(&mount)
    }

    /// Tree to return for `mount` during a resynchronization draw.
    ///
    /// A mount without history retains its live subtree.
    pub fn replay(&self, mount: MountId) -> View<E> {
        self.get(mount).cloned().unwrap_or(View::Retain)
    }

    /// Number of mounts with history.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if no mount has history.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}
