// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View interceptor: track exitable instances and the element they render into.
//!
//! ## Overview
//!
//! [`intercept`] wraps a view function. Each time the wrapped view runs for an exitable
//! instance it:
//!
//! 1) registers the instance with the session's active mount, and
//! 2) replaces the anchor's attachment hook with one that records the live element on the
//!    instance and then calls the hook it replaced.
//!
//! Nothing is registered while the session is reverting, for instances without an exit
//! handler, when no root pass is active, or when the output has no anchor. Output is
//! returned otherwise unchanged.

use alloc::rc::Rc;

use tracing::debug;

use crate::instance::{Instance, ViewFn};
use crate::session::Session;
use crate::view::{Hook, View};

/// Wrap `view` so exitable instances register on every pass.
pub fn intercept<E: Clone + 'static>(session: Rc<Session<E>>, view: ViewFn<E>) -> ViewFn<E> {
    Rc::new(move |instance: &Instance<E>| {
        let mut output = view(instance);
        register(&session, instance, &mut output);
        output
    })
}

/// Register `instance` for this pass and hook its anchor in `output`.
///
/// Returns `true` if the instance is tracked on this pass.
pub fn register<E: Clone + 'static>(
    session: &Session<E>,
    instance: &Instance<E>,
    output: &mut View<E>,
) -> bool {
    if session.is_reverting() || !instance.can_exit() {
        return false;
    }
    let Some(anchor) = output.anchor_mut() else {
        debug!(
            instance = instance.id().get(),
            "exitable view rendered no anchor; not tracked this pass"
        );
        return false;
    };
    {
        let mut registry = session.registry_mut();
        if registry.active().is_none() {
            debug!(
                instance = instance.id().get(),
                "exitable view rendered outside a root pass; not tracked"
            );
            return false;
        }
        // A second registration within the pass keeps the first entry.
        registry.register(instance);
    }

    let original = anchor.config.take();
    let owner = instance.clone();
    anchor.config = Some(Hook::new(move |element: &E, first: bool| {
        owner.set_anchor(element.clone());
        if let Some(original) = &original {
            original.call(element, first);
        }
    }));
    true
}
