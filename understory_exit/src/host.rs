// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host renderer contract.
//!
//! ## Overview
//!
//! The host is the rendering library that owns diffing, patching, scheduling, and routing.
//! This crate never reimplements any of that; it only needs the narrow surface below.
//!
//! ## Expectations
//!
//! - Render: the host calls a component's view with its instance and patches the live DOM
//!   from the returned [`View`](crate::view::View). [`Retain`](crate::view::View::Retain)
//!   leaves the live subtree as is.
//! - Attachment: after patching, the host calls each element's
//!   [`Hook`](crate::view::Hook) with the live element. An element created by any draw,
//!   [`Resync`](crate::types::RedrawStrategy::Resync) included, gets its first call with
//!   `first` set; a `Resync` draw may skip the hooks of elements it reused.
//! - Computations: between [`start_computation`](Host::start_computation) and the matching
//!   [`end_computation`](Host::end_computation), scheduled redraws are held. The host may
//!   redraw once the count returns to zero.
//! - Forced draws: [`redraw_now`](Host::redraw_now) draws synchronously even while
//!   computations are held, and consumes the one-shot strategy set through
//!   [`set_redraw_strategy`](Host::set_redraw_strategy).
//! - Tasks: [`spawn_local`](Host::spawn_local) runs a future on the render thread.

use alloc::collections::BTreeMap;
use alloc::string::String;

use futures::future::LocalBoxFuture;

use crate::instance::Component;
use crate::types::RedrawStrategy;

/// Route table: path to component.
pub type Routes<E> = BTreeMap<String, Component<E>>;

/// A host rendering library.
pub trait Host: 'static {
    /// Live element handle.
    type Element: Clone + 'static;

    /// Mount `component` into `target` and draw it.
    fn mount(&self, target: &Self::Element, component: Component<Self::Element>);

    /// Install a route table on `target` and draw the component for the current path,
    /// falling back to `default_path`.
    fn route(&self, target: &Self::Element, default_path: &str, routes: Routes<Self::Element>);

    /// Path of the active route, if routing is installed.
    fn current_route(&self) -> Option<String>;

    /// Switch to the route at `path` and redraw.
    fn navigate(&self, path: &str);

    /// Hold scheduled redraws until the matching [`end_computation`](Host::end_computation).
    fn start_computation(&self);

    /// Release one hold taken by [`start_computation`](Host::start_computation).
    fn end_computation(&self);

    /// Strategy for the next draw only.
    fn set_redraw_strategy(&self, strategy: RedrawStrategy);

    /// Draw synchronously, ignoring held computations.
    fn redraw_now(&self);

    /// Run `task` on the render thread.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}
