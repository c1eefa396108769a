// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host that records calls, for unit tests.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::host::{Host, Routes};
use crate::instance::{Component, Instance};
use crate::types::RedrawStrategy;
use crate::view::View;

/// Element handle: the `key` attribute of the element it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Probe(pub(crate) String);

impl From<&str> for Probe {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Mount(Probe),
    Route(Probe, String),
    Navigate(String),
    Start,
    End,
    Strategy(RedrawStrategy),
    RedrawNow,
}

pub(crate) struct RecordingHost {
    roots: RefCell<Vec<(Component<Probe>, Instance<Probe>)>>,
    routes: RefCell<Option<(Routes<Probe>, String, usize)>>,
    calls: RefCell<Vec<Call>>,
    computations: Cell<usize>,
    last: RefCell<Vec<View<Probe>>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl RecordingHost {
    pub(crate) fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            roots: RefCell::new(Vec::new()),
            routes: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            computations: Cell::new(0),
            last: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    /// Add a root without going through [`Host::mount`].
    pub(crate) fn mount_root(&self, component: Component<Probe>) {
        let instance = component.instantiate();
        self.roots.borrow_mut().push((component, instance));
    }

    /// Render every root and fire the hooks of keyed elements.
    pub(crate) fn draw(&self) -> Vec<View<Probe>> {
        let outputs = self.render_only();
        for output in &outputs {
            output.visit_elements(&mut |el| {
                if let (Some(hook), Some(key)) = (&el.config, el.get_attr("key")) {
                    hook.call(&Probe::from(key), true);
                }
            });
        }
        outputs
    }

    /// Render every root without firing hooks.
    pub(crate) fn render_only(&self) -> Vec<View<Probe>> {
        let roots = self.roots.borrow().clone();
        let outputs: Vec<View<Probe>> = roots.iter().map(|(c, i)| c.render(i)).collect();
        *self.last.borrow_mut() = outputs.clone();
        outputs
    }

    pub(crate) fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn computations(&self) -> usize {
        self.computations.get()
    }

    pub(crate) fn last_output(&self) -> Vec<View<Probe>> {
        self.last.borrow().clone()
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for RecordingHost {
    type Element = Probe;

    fn mount(&self, target: &Probe, component: Component<Probe>) {
        self.log(Call::Mount(target.clone()));
        self.mount_root(component);
    }

    fn route(&self, target: &Probe, default_path: &str, routes: Routes<Probe>) {
        self.log(Call::Route(target.clone(), default_path.to_string()));
        let index = self.roots.borrow().len();
        if let Some(component) = routes.get(default_path) {
            self.mount_root(component.clone());
        }
        *self.routes.borrow_mut() = Some((routes, default_path.to_string(), index));
    }

    fn current_route(&self) -> Option<String> {
        self.routes.borrow().as_ref().map(|(_, path, _)| path.clone())
    }

    fn navigate(&self, path: &str) {
        self.log(Call::Navigate(path.to_string()));
        let mut routes = self.routes.borrow_mut();
        let Some((table, current, index)) = routes.as_mut() else {
            return;
        };
        let Some(component) = table.get(path).cloned() else {
            return;
        };
        *current = path.to_string();
        let instance = component.instantiate();
        self.roots.borrow_mut()[*index] = (component, instance);
    }

    fn start_computation(&self) {
        self.log(Call::Start);
        self.computations.set(self.computations.get() + 1);
    }

    fn end_computation(&self) {
        self.log(Call::End);
        self.computations.set(self.computations.get() - 1);
    }

    fn set_redraw_strategy(&self, strategy: RedrawStrategy) {
        self.log(Call::Strategy(strategy));
    }

    fn redraw_now(&self) {
        self.log(Call::RedrawNow);
        self.draw();
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).expect("pool outlives the host");
    }
}

/// Compact structural rendering of a view, ignoring hooks and attributes.
pub(crate) fn outline<E>(view: &View<E>) -> String {
    match view {
        View::Empty => "_".to_string(),
        View::Text(text) => format!("{text:?}"),
        View::Retain => "retain".to_string(),
        View::Element(el) => {
            let children: Vec<String> = el.children.iter().map(outline).collect();
            format!("{}[{}]", el.tag, children.join(" "))
        }
        View::Fragment(children) => {
            let children: Vec<String> = children.iter().map(outline).collect();
            format!("({})", children.join(" "))
        }
    }
}
