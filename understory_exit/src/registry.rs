// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root registry: which exitable instances each mount point rendered on the current pass.
//!
//! ## Overview
//!
//! The registry keeps one insertion-ordered table per [`MountId`]. A root pass calls
//! [`Registry::begin`], which snapshots the mount's table, clears it, and makes the mount
//! active. Views intercepted during the pass [`register`](Registry::register) into the
//! active table. [`Snapshot::removed`] then lists the previous entries that did not come
//! back.
//!
//! Tables never accumulate across passes: each pass starts from an empty table. Tables of
//! different mount points are independent, so two roots rendering in the same pass never
//! see each other's instances.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::instance::Instance;
use crate::types::{InstanceId, MountId};
use crate::util::OrderedMap;

/// Per-mount tables of registered instances.
pub struct Registry<E> {
    tables: BTreeMap<MountId, OrderedMap<InstanceId, Instance<E>>>,
    // Innermost active mount last.
    active: Vec<MountId>,
}

impl<E> core::fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sizes: Vec<(u32, usize)> = self
            .tables
            .iter()
            .map(|(mount, table)| (mount.get(), table.len()))
            .collect();
        f.debug_struct("Registry")
            .field("tables", &sizes)
            .field("active", &self.active)
            .finish()
    }
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            tables: BTreeMap::new(),
            active: Vec::new(),
        }
    }
}

impl<E: Clone> Registry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot and clear the table of `mount`, then make it the active mount.
    ///
    /// Anchors are read from each instance at this point, so they reflect the attachment
    /// hooks the host fired for the previous pass.
    pub fn begin(&mut self, mount: MountId) -> Snapshot<E> {
        let entries = self
            .tables
            .entry(mount)
            .or_default()
            .to_list()
            .into_iter()
            .map(|(_, instance)| {
                let anchor = instance.anchor();
                (instance, anchor)
            })
            .collect();
        self.active.push(mount);
        Snapshot { mount, entries }
    }

    /// Deactivate the innermost active mount.
    pub fn end(&mut self) -> Option<MountId> {
        self.active.pop()
    }

    /// The mount that registrations currently go to.
    pub fn active(&self) -> Option<MountId> {
        self.active.last().copied()
    }

    /// Record `instance` in the active table.
    ///
    /// Returns `false` if no mount is active or the instance is already registered on this
    /// pass; there is never more than one entry per instance.
    pub fn register(&mut self, instance: &Instance<E>) -> bool {
        let Some(mount) = self.active() else {
            return false;
        };
        self.tables
            .entry(mount)
            .or_default()
            .insert_if_absent(instance.id(), instance.clone())
    }

    /// Returns `true` if `id` registered with `mount` on the current pass.
    pub fn contains(&self, mount: MountId, id: InstanceId) -> bool {
        self.tables
            .get(&mount)
            .is_some_and(|table| table.contains_key(&id))
    }

    /// Number of instances registered with `mount` on the current pass.
    pub fn len(&self, mount: MountId) -> usize {
        self.tables.get(&mount).map_or(0, OrderedMap::len)
    }

    /// Instances registered with `mount`, in registration order.
    pub fn instances(&self, mount: MountId) -> impl Iterator<Item = &Instance<E>> {
        self.tables
            .get(&mount)
            .into_iter()
            .flat_map(|table| table.iter().map(|(_, instance)| instance))
    }
}

/// The table of one mount as it stood before a pass began.
#[derive(Debug)]
pub struct Snapshot<E> {
    mount: MountId,
    entries: Vec<(Instance<E>, Option<E>)>,
}

impl<E> Snapshot<E> {
    /// Mount this snapshot was taken from.
    pub fn mount(&self) -> MountId {
        self.mount
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was registered on the previous pass.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their last known anchors, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Instance<E>, Option<&E>)> {
        self.entries.iter().map(|(inst, anchor)| (inst, anchor.as_ref()))
    }
}

impl<E: Clone> Snapshot<E> {
    /// Entries that did not register again, in snapshot order.
    pub fn removed(self, registry: &Registry<E>) -> Vec<(Instance<E>, Option<E>)> {
        let mount = self.mount;
        self.entries
            .into_iter()
            .filter(|(instance, _)| !registry.contains(mount, instance.id()))
            .collect()
    }
}
