// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component instances and components.
//!
//! ## Overview
//!
//! A [`Component`] pairs a constructor for its per-occurrence state with a view function.
//! Each mounted occurrence is an [`Instance`]: a cheap-clone handle whose identity is stable
//! across redraws for as long as the owner keeps it.
//!
//! An instance opts into deferred removal by carrying an exit handler
//! (see [`InstanceBuilder::on_exit`]). The presence of that handler is the only signal the
//! [interceptor](crate::intercept) uses to decide whether to track the instance.

use alloc::rc::Rc;
use core::any::Any;
use core::cell::RefCell;

use crate::completion::Completion;
use crate::types::InstanceId;
use crate::view::View;

/// Exit handler: receives the last known anchor element and returns a completion.
pub type ExitFn<E> = Rc<dyn Fn(E) -> Completion>;

/// View function of a component.
pub type ViewFn<E> = Rc<dyn Fn(&Instance<E>) -> View<E>>;

struct Inner<E> {
    id: InstanceId,
    exit: Option<ExitFn<E>>,
    state: Option<Rc<dyn Any>>,
    // Written by the attachment hook the interceptor installs on the anchor.
    anchor: RefCell<Option<E>>,
}

/// One mounted occurrence of a component.
pub struct Instance<E>(Rc<Inner<E>>);

impl<E> Clone for Instance<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> core::fmt::Debug for Instance<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.0.id)
            .field("can_exit", &self.can_exit())
            .field("attached", &self.0.anchor.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl<E> Default for Instance<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Instance<E> {
    /// Create an instance with no state and no exit handler.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building an instance.
    pub fn builder() -> InstanceBuilder<E> {
        InstanceBuilder {
            exit: None,
            state: None,
        }
    }

    /// Identity of this instance.
    pub fn id(&self) -> InstanceId {
        self.0.id
    }

    /// Returns `true` if the instance declares an exit handler.
    pub fn can_exit(&self) -> bool {
        self.0.exit.is_some()
    }

    /// Invoke the exit handler with `anchor`.
    ///
    /// Returns `None` when the instance has no exit handler.
    pub fn exit(&self, anchor: E) -> Option<Completion> {
        self.0.exit.as_ref().map(|exit| exit(anchor))
    }

    /// Borrow the user state, if it was set with type `T`.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.0.state.as_deref()?.downcast_ref()
    }

    /// Returns `true` if both handles refer to the same instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn set_anchor(&self, element: E) {
        *self.0.anchor.borrow_mut() = Some(element);
    }
}

impl<E: Clone> Instance<E> {
    /// Last element the host attached as this instance's anchor.
    pub fn anchor(&self) -> Option<E> {
        self.0.anchor.borrow().clone()
    }
}

/// Builder for [`Instance`].
pub struct InstanceBuilder<E> {
    exit: Option<ExitFn<E>>,
    state: Option<Rc<dyn Any>>,
}

impl<E> core::fmt::Debug for InstanceBuilder<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InstanceBuilder")
            .field("can_exit", &self.exit.is_some())
            .field("has_state", &self.state.is_some())
            .finish()
    }
}

impl<E> InstanceBuilder<E> {
    /// Attach user state, readable through [`Instance::state`].
    pub fn state<T: 'static>(mut self, state: T) -> Self {
        self.state = Some(Rc::new(state));
        self
    }

    /// Declare an exit handler.
    pub fn on_exit(mut self, exit: impl Fn(E) -> Completion + 'static) -> Self {
        self.exit = Some(Rc::new(exit));
        self
    }

    /// Finish the instance and allocate its identity.
    pub fn build(self) -> Instance<E> {
        Instance(Rc::new(Inner {
            id: InstanceId::next(),
            exit: self.exit,
            state: self.state,
            anchor: RefCell::new(None),
        }))
    }
}

/// A component: instance constructor plus view function.
pub struct Component<E> {
    init: Rc<dyn Fn() -> Instance<E>>,
    view: ViewFn<E>,
}

impl<E> Clone for Component<E> {
    fn clone(&self) -> Self {
        Self {
            init: Rc::clone(&self.init),
            view: Rc::clone(&self.view),
        }
    }
}

impl<E> core::fmt::Debug for Component<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Component").finish_non_exhaustive()
    }
}

impl<E: 'static> Component<E> {
    /// A component whose instances carry no state or exit handler.
    pub fn new(view: impl Fn(&Instance<E>) -> View<E> + 'static) -> Self {
        Self::with_controller(Instance::new, view)
    }

    /// A component with a custom instance constructor.
    pub fn with_controller(
        init: impl Fn() -> Instance<E> + 'static,
        view: impl Fn(&Instance<E>) -> View<E> + 'static,
    ) -> Self {
        Self {
            init: Rc::new(init),
            view: Rc::new(view),
        }
    }

    /// Create a fresh instance.
    pub fn instantiate(&self) -> Instance<E> {
        (self.init)()
    }

    /// Run the view for `instance`.
    pub fn render(&self, instance: &Instance<E>) -> View<E> {
        (self.view)(instance)
    }

    /// The view function.
    pub fn view(&self) -> &ViewFn<E> {
        &self.view
    }

    /// Replace the view function with one derived from it.
    pub fn map_view(self, f: impl FnOnce(ViewFn<E>) -> ViewFn<E>) -> Self {
        Self {
            init: self.init,
            view: f(self.view),
        }
    }
}
