// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Headless`]: the in-memory [`Host`].
//!
//! ## Drawing
//!
//! A draw renders every root in mount order and patches each output into the root's target
//! element by position: an element is reused when the node at its position has the same
//! tag, a text node when the node at its position is text, and anything else is created.
//! Trailing nodes are removed. [`View::Retain`] keeps the node at its position (or the
//! whole target, at the top level).
//!
//! Attachment hooks run after the patch, innermost first, with `first` set for created
//! elements. The one-shot strategy alters a single draw:
//! [`All`](RedrawStrategy::All) clears each target before patching, and
//! [`Resync`](RedrawStrategy::Resync) runs only the hooks of elements it created.
//!
//! ## Scheduling
//!
//! [`Headless::redraw`] draws at once unless computations are held, in which case the request
//! is remembered. Releasing the last computation always draws.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use tracing::{debug, error, trace};
use understory_exit::{Component, Element, Hook, Host, Instance, RedrawStrategy, Routes, View};

use crate::document::{Document, NodeId};

#[derive(Clone)]
struct Root {
    target: NodeId,
    component: Component<NodeId>,
    instance: Instance<NodeId>,
}

#[derive(Clone, Debug)]
struct Router {
    target: NodeId,
    routes: Routes<NodeId>,
    current: String,
}

/// In-memory host renderer.
pub struct Headless {
    document: RefCell<Document>,
    roots: RefCell<Vec<Root>>,
    router: RefCell<Option<Router>>,
    computations: Cell<usize>,
    pending: Cell<bool>,
    strategy: Cell<RedrawStrategy>,
    draws: Cell<u64>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl core::fmt::Debug for Headless {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Headless")
            .field("roots", &self.roots.borrow().len())
            .field("computations", &self.computations.get())
            .field("pending", &self.pending.get())
            .field("strategy", &self.strategy.get())
            .field("draws", &self.draws.get())
            .finish_non_exhaustive()
    }
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

impl Headless {
    /// Create a host with an empty document.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            document: RefCell::new(Document::new()),
            roots: RefCell::new(Vec::new()),
            router: RefCell::new(None),
            computations: Cell::new(0),
            pending: Cell::new(false),
            strategy: Cell::new(RedrawStrategy::Diff),
            draws: Cell::new(0),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    /// Create a parentless element, typically a mount target.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.document.borrow_mut().create_element(tag)
    }

    /// Borrow the document.
    ///
    /// The borrow must end before the next draw.
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    /// Set an attribute on a live element outside of a draw, as an exit animation does.
    ///
    /// The next draw that reuses the element replaces its attributes with the rendered ones.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        self.document.borrow_mut().set_attr(node, name, value);
    }

    /// Number of held computations.
    pub fn computations(&self) -> usize {
        self.computations.get()
    }

    /// Returns `true` if a redraw was requested while computations are held.
    pub fn has_pending_redraw(&self) -> bool {
        self.pending.get()
    }

    /// Number of completed draws.
    pub fn draw_count(&self) -> u64 {
        self.draws.get()
    }

    /// Request a draw; deferred while computations are held.
    pub fn redraw(&self) {
        if self.computations.get() > 0 {
            trace!(held = self.computations.get(), "redraw deferred");
            self.pending.set(true);
        } else {
            self.draw();
        }
    }

    /// Run spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    fn draw(&self) {
        let strategy = self.strategy.replace(RedrawStrategy::Diff);
        let roots = self.roots.borrow().clone();
        debug!(roots = roots.len(), ?strategy, "draw");
        for root in roots {
            // Views run without any borrow held; they may call back into the host.
            let output = root.component.render(&root.instance);
            if output.is_retain() {
                trace!(node = root.target.index(), "root retained");
                continue;
            }
            let hooks = {
                let mut doc = self.document.borrow_mut();
                if strategy == RedrawStrategy::All {
                    doc.clear_children(root.target);
                }
                let mut patch = Patch {
                    doc: &mut doc,
                    hooks: Vec::new(),
                };
                patch.children(root.target, core::slice::from_ref(&output));
                patch.hooks
            };
            for (hook, node, first) in hooks {
                if first || strategy != RedrawStrategy::Resync {
                    hook.call(&node, first);
                }
            }
        }
        self.draws.set(self.draws.get() + 1);
    }

    fn attach(&self, target: NodeId, component: Component<NodeId>) {
        let instance = component.instantiate();
        let mut roots = self.roots.borrow_mut();
        let root = Root {
            target,
            component,
            instance,
        };
        match roots.iter_mut().find(|r| r.target == target) {
            Some(slot) => *slot = root,
            None => roots.push(root),
        }
    }

    fn detach(&self, target: NodeId) {
        self.roots.borrow_mut().retain(|r| r.target != target);
        self.document.borrow_mut().clear_children(target);
    }
}

struct Patch<'a> {
    doc: &'a mut Document,
    hooks: Vec<(Hook<NodeId>, NodeId, bool)>,
}

fn flatten<'v>(view: &'v View<NodeId>, out: &mut Vec<&'v View<NodeId>>) {
    match view {
        View::Empty => {}
        View::Fragment(children) => {
            for child in children {
                flatten(child, out);
            }
        }
        _ => out.push(view),
    }
}

impl Patch<'_> {
    fn children(&mut self, parent: NodeId, views: &[View<NodeId>]) {
        let mut flat = Vec::new();
        for view in views {
            flatten(view, &mut flat);
        }
        let existing = self.doc.children(parent).to_vec();
        let mut next = Vec::with_capacity(flat.len());
        for (i, view) in flat.into_iter().enumerate() {
            let old = existing.get(i).copied();
            let node = match view {
                View::Retain => match old {
                    Some(node) => node,
                    None => continue,
                },
                View::Text(text) => self.text(old, text),
                View::Element(el) => self.element(old, el),
                View::Empty | View::Fragment(_) => continue,
            };
            next.push(node);
        }
        self.doc.set_children(parent, next);
    }

    fn text(&mut self, old: Option<NodeId>, text: &str) -> NodeId {
        match old {
            Some(node) if self.doc.text(node).is_some() => {
                self.doc.set_text(node, text);
                node
            }
            _ => self.doc.create_text(text),
        }
    }

    fn element(&mut self, old: Option<NodeId>, el: &Element<NodeId>) -> NodeId {
        let (node, first) = match old {
            Some(node) if self.doc.tag(node) == Some(el.tag.as_str()) => (node, false),
            _ => (self.doc.create_element(&el.tag), true),
        };
        self.doc.set_attrs(node, &el.attrs);
        self.children(node, &el.children);
        if let Some(hook) = &el.config {
            self.hooks.push((hook.clone(), node, first));
        }
        node
    }
}

impl Host for Headless {
    type Element = NodeId;

    fn mount(&self, target: &NodeId, component: Component<NodeId>) {
        self.attach(*target, component);
        self.draw();
    }

    fn route(&self, target: &NodeId, default_path: &str, routes: Routes<NodeId>) {
        let Some(component) = routes.get(default_path).cloned() else {
            error!(path = default_path, "default route is not in the table");
            return;
        };
        *self.router.borrow_mut() = Some(Router {
            target: *target,
            routes,
            current: default_path.to_owned(),
        });
        self.detach(*target);
        self.attach(*target, component);
        self.draw();
    }

    fn current_route(&self) -> Option<String> {
        self.router.borrow().as_ref().map(|r| r.current.clone())
    }

    fn navigate(&self, path: &str) {
        let next = {
            let mut router = self.router.borrow_mut();
            let Some(router) = router.as_mut() else {
                error!(path, "navigate without a route table");
                return;
            };
            let Some(component) = router.routes.get(path).cloned() else {
                error!(path, "no such route");
                return;
            };
            path.clone_into(&mut router.current);
            (router.target, component)
        };
        debug!(path, "navigate");
        self.attach(next.0, next.1);
        self.redraw();
    }

    fn start_computation(&self) {
        self.computations.set(self.computations.get() + 1);
    }

    fn end_computation(&self) {
        let held = self.computations.get().saturating_sub(1);
        self.computations.set(held);
        if held == 0 {
            if self.pending.replace(false) {
                trace!("flushing deferred redraw");
            }
            self.draw();
        }
    }

    fn set_redraw_strategy(&self, strategy: RedrawStrategy) {
        self.strategy.set(strategy);
    }

    fn redraw_now(&self) {
        self.draw();
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(task) {
            error!(%err, "failed to spawn task");
        }
    }
}
