// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Exitable`]: a host adapter with exit support on every entry point.
//!
//! ## Usage
//!
//! - Wrap the host once with [`Exitable::new`] (or [`Exitable::with_config`]).
//! - Mount with [`Exitable::mount`] or install routes with [`Exitable::route`]; the
//!   components become roots driven by the [root driver](crate::driver).
//! - Pass nested components through [`Exitable::component`] so exitable descendants are
//!   tracked too.
//!
//! Everything else (single-argument routing, scheduling) is delegated to the host unchanged.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::driver;
use crate::error::ExitError;
use crate::host::{Host, Routes};
use crate::instance::Component;
use crate::intercept::intercept;
use crate::session::Session;
use crate::types::{Config, MountId, PassFlags, Phase};
use crate::util::map_values;

/// A host with exit support.
pub struct Exitable<H: Host> {
    host: Rc<H>,
    session: Rc<Session<H::Element>>,
}

impl<H: Host> Clone for Exitable<H> {
    fn clone(&self) -> Self {
        Self {
            host: Rc::clone(&self.host),
            session: Rc::clone(&self.session),
        }
    }
}

impl<H: Host> core::fmt::Debug for Exitable<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Exitable")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Exitable<H> {
    /// Wrap `host` with the default configuration.
    pub fn new(host: Rc<H>) -> Self {
        Self::with_config(host, Config::default())
    }

    /// Wrap `host` with an explicit configuration.
    pub fn with_config(host: Rc<H>, config: Config) -> Self {
        Self {
            host,
            session: Rc::new(Session::new(config)),
        }
    }

    /// The wrapped host.
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// The session shared by every root and intercepted view of this adapter.
    pub fn session(&self) -> &Rc<Session<H::Element>> {
        &self.session
    }

    /// Enable or disable output replay after exits; see [`Config::replay`].
    pub fn set_replay(&self, replay: bool) {
        let mut config = self.session.config();
        config.replay = replay;
        self.session.set_config(config);
    }

    /// Mount `component` as a root into `target`.
    pub fn mount(&self, target: &H::Element, component: Component<H::Element>) -> MountId {
        let mount = self.session.allocate_mount();
        self.host.mount(target, self.root(mount, component));
        mount
    }

    /// Install `routes` on `target`; every routed component becomes a root of one shared
    /// mount point.
    pub fn route(
        &self,
        target: &H::Element,
        default_path: &str,
        routes: Routes<H::Element>,
    ) -> MountId {
        let mount = self.session.allocate_mount();
        let routes = map_values(routes, |component| self.root(mount, component));
        self.host.route(target, default_path, routes);
        mount
    }

    /// Path of the active route.
    pub fn current_route(&self) -> Option<String> {
        self.host.current_route()
    }

    /// Switch routes.
    pub fn navigate(&self, path: &str) {
        self.host.navigate(path);
    }

    /// Track exitable instances of a nested component.
    pub fn component(&self, component: Component<H::Element>) -> Component<H::Element> {
        component.map_view(|view| intercept(Rc::clone(&self.session), view))
    }

    /// Wrap `component` as a root of `mount` without handing it to the host.
    pub fn root(&self, mount: MountId, component: Component<H::Element>) -> Component<H::Element> {
        driver::root(
            Rc::clone(&self.session),
            Rc::clone(&self.host),
            mount,
            component,
        )
    }

    /// Observable phase of the session.
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Flags of the most recent pass for `mount`.
    pub fn last_pass(&self, mount: MountId) -> Option<PassFlags> {
        self.session.last_pass(mount)
    }

    /// Take the failures collected from settled exit batches.
    pub fn take_exit_errors(&self) -> Vec<ExitError> {
        self.session.take_exit_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion;
    use crate::instance::Instance;
    use crate::testing::{Call, Probe, RecordingHost, outline};
    use crate::view::{Element, View};
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use core::cell::Cell;

    fn page(tag: &'static str) -> Component<Probe> {
        Component::new(move |_| View::Element(Element::new(tag).attr("key", tag)))
    }

    #[test]
    fn mount_wraps_the_root_and_delegates() {
        let host = Rc::new(RecordingHost::new());
        let ex = Exitable::new(Rc::clone(&host));
        let mount = ex.mount(&Probe::from("app"), page("main"));
        assert_eq!(host.calls(), [Call::Mount(Probe::from("app"))]);
        let out = host.draw();
        assert_eq!(outline(&out[0]), "main[]");
        assert_eq!(ex.last_pass(mount), Some(PassFlags::empty()));
    }

    #[test]
    fn routed_pages_share_a_mount() {
        let host = Rc::new(RecordingHost::new());
        let ex = Exitable::new(Rc::clone(&host));
        let exits = Rc::new(Cell::new(0));

        // The home page renders an exitable banner; the about page does not.
        let banner = {
            let exits = Rc::clone(&exits);
            Instance::builder()
                .on_exit(move |_| {
                    exits.set(exits.get() + 1);
                    completion::ready()
                })
                .build()
        };
        let banner_view = ex.component(page("banner"));
        let home: Component<Probe> = Component::new(move |_| {
            View::Element(
                Element::new("home")
                    .attr("key", "home")
                    .child(banner_view.render(&banner)),
            )
        });
        let mut routes = BTreeMap::new();
        routes.insert("/".to_string(), home);
        routes.insert("/about".to_string(), page("about"));

        let mount = ex.route(&Probe::from("app"), "/", routes);
        assert_eq!(ex.current_route().as_deref(), Some("/"));
        host.draw();

        ex.navigate("/about");
        assert_eq!(ex.current_route().as_deref(), Some("/about"));
        let out = host.draw();
        assert!(out[0].is_retain());
        assert_eq!(exits.get(), 1);
        assert!(ex.last_pass(mount).unwrap().contains(PassFlags::EXITS_STARTED));
        assert_eq!(ex.phase(), Phase::Suspended);

        host.run_until_stalled();
        assert_eq!(ex.phase(), Phase::Normal);
        assert_eq!(outline(&host.last_output()[0]), "about[]");
    }

    #[test]
    fn separate_mounts_do_not_exit_each_other() {
        let host = Rc::new(RecordingHost::new());
        let ex = Exitable::new(Rc::clone(&host));
        let exits = Rc::new(Cell::new(0));
        for key in ["a", "b"] {
            let exits = Rc::clone(&exits);
            let child = Instance::builder()
                .on_exit(move |_| {
                    exits.set(exits.get() + 1);
                    completion::ready()
                })
                .build();
            let child_view = ex.component(page(key));
            let root: Component<Probe> =
                Component::new(move |_| View::fragment([child_view.render(&child)]));
            ex.mount(&Probe::from(key), root);
        }
        host.draw();
        host.draw();
        assert_eq!(exits.get(), 0);
    }

    #[test]
    fn set_replay_updates_the_session() {
        let host = Rc::new(RecordingHost::new());
        let ex = Exitable::new(host);
        ex.set_replay(false);
        assert!(!ex.session().config().replay);
        assert!(ex.take_exit_errors().is_empty());
    }

    #[test]
    fn route_changes_keep_one_history_entry_per_mount() {
        let host = Rc::new(RecordingHost::new());
        let ex = Exitable::new(Rc::clone(&host));
        let mut routes = BTreeMap::new();
        routes.insert("/a".to_string(), page("a"));
        routes.insert("/b".to_string(), page("b"));
        ex.route(&Probe::from("app"), "/a", routes);
        host.draw();
        for i in 0..100 {
            ex.navigate(if i % 2 == 0 { "/b" } else { "/a" });
            host.draw();
        }
        assert_eq!(ex.session().history().len(), 1);
        assert_eq!(ex.current_route().as_deref(), Some("/a"));
    }
}
