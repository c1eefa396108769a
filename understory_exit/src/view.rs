// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render output: a tagged node-or-sequence tree handed to the host.
//!
//! ## Overview
//!
//! Views return a [`View`]. Concrete nodes are [`Element`]s; arrays of nodes are
//! [`Fragment`](View::Fragment)s and may nest. [`Retain`](View::Retain) asks the host to
//! leave the live subtree untouched for this pass.
//!
//! ## Anchors
//!
//! The anchor of a view is its first concrete element: an [`Element`] is its own anchor and
//! a fragment delegates to its first child, however deeply nested. Text, empty output,
//! and the retain sentinel have no anchor.
//!
//! ```
//! use understory_exit::view::{Element, View};
//!
//! let view: View<u32> = View::fragment([
//!     View::fragment([View::Element(Element::new("li")), View::Element(Element::new("li"))]),
//!     View::Element(Element::new("footer")),
//! ]);
//! assert_eq!(view.anchor().map(|el| el.tag.as_str()), Some("li"));
//!
//! let text: View<u32> = View::text("hello");
//! assert!(text.anchor().is_none());
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

/// Attachment hook on an element.
///
/// The host calls it with the live element after it has produced real DOM for the node.
/// The flag is `true` on the first call for a given element and `false` on later passes.
pub struct Hook<E>(Rc<dyn Fn(&E, bool)>);

impl<E> Hook<E> {
    /// Wrap a closure as a hook.
    pub fn new(f: impl Fn(&E, bool) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the hook.
    pub fn call(&self, element: &E, first: bool) {
        (self.0)(element, first);
    }

    /// Returns `true` if both hooks share the same closure.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<E> Clone for Hook<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> core::fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}

/// A concrete node.
#[derive(Clone, Debug)]
pub struct Element<E> {
    /// Tag name.
    pub tag: String,
    /// Attributes in declaration order.
    pub attrs: Vec<(String, String)>,
    /// Attachment hook, if any.
    pub config: Option<Hook<E>>,
    /// Child views.
    pub children: Vec<View<E>>,
}

impl<E> Element<E> {
    /// Create an element with no attributes, hook, or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            config: None,
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Set the attachment hook, replacing any previous one.
    pub fn with_config(mut self, hook: Hook<E>) -> Self {
        self.config = Some(hook);
        self
    }

    /// Append a child view.
    pub fn child(mut self, child: impl Into<View<E>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child views.
    pub fn children(mut self, children: impl IntoIterator<Item = View<E>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Value of the first attribute called `name`.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Output of a view function.
#[derive(Clone, Debug, Default)]
pub enum View<E> {
    /// Nothing rendered.
    #[default]
    Empty,
    /// A text node.
    Text(String),
    /// A concrete element.
    Element(Element<E>),
    /// A sequence of views, rendered in order.
    Fragment(Vec<View<E>>),
    /// Leave the live subtree exactly as it is.
    Retain,
}

impl<E> View<E> {
    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A fragment from any sequence of views.
    pub fn fragment(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    /// Returns `true` for [`View::Retain`].
    pub fn is_retain(&self) -> bool {
        matches!(self, Self::Retain)
    }

    /// The first concrete element, descending into leading fragments.
    pub fn anchor(&self) -> Option<&Element<E>> {
        match self {
            Self::Element(el) => Some(el),
            Self::Fragment(children) => children.first()?.anchor(),
            Self::Empty | Self::Text(_) | Self::Retain => None,
        }
    }

    /// Mutable access to the anchor; see [`View::anchor`].
    pub fn anchor_mut(&mut self) -> Option<&mut Element<E>> {
        match self {
            Self::Element(el) => Some(el),
            Self::Fragment(children) => children.first_mut()?.anchor_mut(),
            Self::Empty | Self::Text(_) | Self::Retain => None,
        }
    }

    /// Visit every element in document order (parents before children).
    pub fn visit_elements(&self, f: &mut impl FnMut(&Element<E>)) {
        match self {
            Self::Element(el) => {
                f(el);
                for child in &el.children {
                    child.visit_elements(f);
                }
            }
            Self::Fragment(children) => {
                for child in children {
                    child.visit_elements(f);
                }
            }
            Self::Empty | Self::Text(_) | Self::Retain => {}
        }
    }
}

impl<E> From<Element<E>> for View<E> {
    fn from(el: Element<E>) -> Self {
        Self::Element(el)
    }
}

impl<E> From<&str> for View<E> {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    fn tag_of(view: &View<u32>) -> Option<&str> {
        view.anchor().map(|el| el.tag.as_str())
    }

    #[test]
    fn element_is_its_own_anchor() {
        let view: View<u32> = Element::new("div").into();
        assert_eq!(tag_of(&view), Some("div"));
    }

    #[test]
    fn nested_fragments_descend_into_first_child() {
        let view: View<u32> = View::fragment([
            View::fragment([View::fragment([View::Element(Element::new("span"))])]),
            View::Element(Element::new("p")),
        ]);
        assert_eq!(tag_of(&view), Some("span"));
    }

    #[test]
    fn no_anchor_for_text_empty_retain_or_empty_fragment() {
        assert_eq!(tag_of(&View::text("x")), None);
        assert_eq!(tag_of(&View::Empty), None);
        assert_eq!(tag_of(&View::Retain), None);
        assert_eq!(tag_of(&View::Fragment(vec![])), None);
    }

    #[test]
    fn leading_text_hides_later_elements() {
        // Only the first child is considered; a leading text node means no anchor.
        let view: View<u32> =
            View::fragment([View::text("lead"), View::Element(Element::new("div"))]);
        assert_eq!(tag_of(&view), None);
    }

    #[test]
    fn anchor_mut_edits_in_place() {
        let mut view: View<u32> = View::fragment([View::Element(Element::new("a"))]);
        view.anchor_mut().unwrap().tag = "b".into();
        assert_eq!(tag_of(&view), Some("b"));
    }

    #[test]
    fn visit_elements_is_document_order() {
        let view: View<u32> = Element::new("ul")
            .child(Element::new("li").child(Element::new("b")))
            .child(View::text("gap"))
            .child(Element::new("li"))
            .into();
        let mut tags = vec![];
        view.visit_elements(&mut |el| tags.push(el.tag.clone()));
        assert_eq!(tags, vec!["ul", "li", "b", "li"]);
    }

    #[test]
    fn hooks_clone_share_the_closure() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let hook: Hook<u32> = Hook::new(move |_, _| seen.set(seen.get() + 1));
        let copy = hook.clone();
        assert!(Hook::ptr_eq(&hook, &copy));
        hook.call(&1, true);
        copy.call(&1, false);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn get_attr_finds_first_match() {
        let el: Element<u32> = Element::new("div").attr("key", "a").attr("key", "b");
        assert_eq!(el.get_attr("key"), Some("a"));
        assert_eq!(el.get_attr("missing"), None);
    }
}
