// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_exit_headless --heading-base-level=0

//! Understory Exit Headless: an in-memory host renderer for [`understory_exit`].
//!
//! ## Overview
//!
//! [`Headless`] implements [`understory_exit::Host`] without a browser:
//!
//! - a [`Document`] arena of elements and text nodes addressed by [`NodeId`],
//! - positional patching of render output into that arena, with attachment hooks fired
//!   after each patch,
//! - a computation counter that holds [`Headless::redraw`] requests and flushes them once
//!   released,
//! - one-shot redraw strategies, forced draws, a single route table, and
//! - a single-threaded task pool for exit completions, driven by
//!   [`Headless::run_until_stalled`].
//!
//! It is meant for tests, demos, and server-side experiments. Patching is positional and
//! deliberately simple; it is not a diffing engine.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use understory_exit::{Component, Element, Exitable, View};
//! use understory_exit_headless::Headless;
//!
//! let host = Rc::new(Headless::new());
//! let app = host.create_element("app");
//! let ex = Exitable::new(Rc::clone(&host));
//! ex.mount(&app, Component::new(|_| View::Element(Element::new("p").child("hi"))));
//! assert_eq!(host.document().outline(app), r#"app[p["hi"]]"#);
//! ```

mod document;
mod host;

pub use document::{Document, NodeId};
pub use host::Headless;
