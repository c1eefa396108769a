// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root driver: detect vanished exitable instances and defer their removal.
//!
//! ## Overview
//!
//! [`root`] wraps the view of a mounted or routed component. On every normal pass the
//! wrapped view:
//!
//! 1) snapshots and clears the mount's [registry](crate::registry) table,
//! 2) runs the intercepted view, re-registering every exitable instance still rendered,
//! 3) records the output in the [history](crate::history),
//! 4) invokes the exit handler of every snapshot entry that did not come back, in snapshot
//!    order, with the anchor it had on the previous pass.
//!
//! If any exit handler ran, the pass returns [`View::Retain`], holds the host's redraws, and
//! spawns a continuation that waits for every completion.
//!
//! ## Resynchronization
//!
//! Once the last completion settles, the continuation sets the reverting flag, asks the
//! host for a [`Resync`](RedrawStrategy::Resync) draw, forces that draw, clears the flag,
//! and releases the hold. Completions may settle in any order; the continuation runs
//! exactly once per batch.
//!
//! In the forced draw each mount with no unsettled batch replays the output recorded for
//! it. A mount whose own exits are still running returns [`View::Retain`] and keeps its
//! exiting nodes until its batch settles.
//!
//! ## Failure
//!
//! A completion that never settles keeps redraws held. Failed completions are logged and
//! kept for [`Session::take_exit_errors`]; resynchronization runs regardless. A panicking
//! exit handler unwinds through the render call.

use alloc::rc::Rc;
use alloc::vec::Vec;

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, trace, warn};

use crate::completion::Completion;
use crate::error::ExitError;
use crate::host::Host;
use crate::instance::{Component, Instance, ViewFn};
use crate::intercept::intercept;
use crate::session::Session;
use crate::types::{MountId, PassFlags, RedrawStrategy};
use crate::view::View;

/// Wrap `component` as a root of `mount`.
pub fn root<H: Host>(
    session: Rc<Session<H::Element>>,
    host: Rc<H>,
    mount: MountId,
    component: Component<H::Element>,
) -> Component<H::Element> {
    component.map_view(move |view| {
        let view = intercept(Rc::clone(&session), view);
        Rc::new(move |instance: &Instance<H::Element>| {
            draw(&session, &host, mount, &view, instance)
        })
    })
}

fn draw<H: Host>(
    session: &Rc<Session<H::Element>>,
    host: &Rc<H>,
    mount: MountId,
    view: &ViewFn<H::Element>,
    instance: &Instance<H::Element>,
) -> View<H::Element> {
    if session.is_reverting() {
        if session.in_flight_for(mount) > 0 {
            // Another mount settled first; this one keeps its exiting nodes.
            session.note_pass(mount, PassFlags::RETAINED);
            trace!(mount = mount.get(), "exits still running; retained through resync");
            return View::Retain;
        }
        session.note_pass(mount, PassFlags::REPLAYED);
        trace!(mount = mount.get(), root = instance.id().get(), "replaying last output");
        return session.history().replay(mount);
    }

    let previous = session.registry_mut().begin(mount);
    let mut output = view(instance);
    session.registry_mut().end();

    if session.config().replay {
        session.history_mut().record(mount, output.clone());
    }

    let removed = previous.removed(&session.registry());
    let mut flags = PassFlags::empty();
    let mut exits: Vec<Completion> = Vec::new();
    for (gone, anchor) in removed {
        let Some(anchor) = anchor else {
            flags |= PassFlags::SKIPPED_UNANCHORED;
            debug!(
                mount = mount.get(),
                instance = gone.id().get(),
                "removed before the host attached it; no exit"
            );
            continue;
        };
        if let Some(completion) = gone.exit(anchor) {
            exits.push(completion);
        }
    }

    if !exits.is_empty() {
        flags |= PassFlags::RETAINED | PassFlags::EXITS_STARTED;
        debug!(
            mount = mount.get(),
            exits = exits.len(),
            "exits started; holding redraws"
        );
        output = View::Retain;
        host.start_computation();
        session.begin_batch(mount);
        host.spawn_local(settle(Rc::clone(session), Rc::clone(host), mount, exits).boxed_local());
    }

    session.note_pass(mount, flags);
    trace!(mount = mount.get(), ?flags, "root pass");
    output
}

async fn settle<H: Host>(
    session: Rc<Session<H::Element>>,
    host: Rc<H>,
    mount: MountId,
    exits: Vec<Completion>,
) {
    let failures: Vec<ExitError> = join_all(exits)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();
    if !failures.is_empty() {
        for error in &failures {
            warn!(%error, "exit transition did not finish cleanly");
        }
        session.push_exit_errors(failures);
    }
    session.end_batch(mount);

    if session.config().replay {
        session.set_reverting(true);
        host.set_redraw_strategy(RedrawStrategy::Resync);
        host.redraw_now();
        session.set_reverting(false);
    }
    host.end_computation();
    debug!(mount = mount.get(), "exits settled; redraws released");
}
