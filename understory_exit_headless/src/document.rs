// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory document: an arena of element and text nodes.
//!
//! Nodes are never freed; removing a node from its parent marks it and its subtree as
//! dead so stale handles stay valid to query.

use std::fmt::Write as _;

/// Handle to a node in a [`Document`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Index of this node in its document's arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
enum Kind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: Kind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    live: bool,
}

/// An arena of nodes.
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created, live or dead.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a parentless element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Kind::Element {
            tag: tag.to_owned(),
            attrs: Vec::new(),
        })
    }

    /// Create a parentless text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Kind::Text(text.to_owned()))
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            live: true,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Tag of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            Kind::Element { tag, .. } => Some(tag),
            Kind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            Kind::Text(text) => Some(text),
            Kind::Element { .. } => None,
        }
    }

    /// Value of an element attribute.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.kind {
            Kind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Kind::Text(_) => None,
        }
    }

    /// Children of `id`, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of `id`, if it is linked into a tree.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Returns `true` until `id` is removed from its parent.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.live)
    }

    /// Compact rendering of the subtree at `id`: `tag[child child]` for elements with
    /// children, bare `tag` otherwise, and quoted text for text nodes.
    pub fn outline(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_outline(id, &mut out);
        out
    }

    fn write_outline(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            out.push('?');
            return;
        };
        match &node.kind {
            Kind::Text(text) => {
                let _ = write!(out, "{text:?}");
            }
            Kind::Element { tag, .. } => {
                out.push_str(tag);
                if !node.children.is_empty() {
                    out.push('[');
                    for (i, child) in node.children.iter().enumerate() {
                        if i > 0 {
                            out.push(' ');
                        }
                        self.write_outline(*child, out);
                    }
                    out.push(']');
                }
            }
        }
    }

    pub(crate) fn set_attrs(&mut self, id: NodeId, new_attrs: &[(String, String)]) {
        if let Some(Node {
            kind: Kind::Element { attrs, .. },
            ..
        }) = self.node_mut(id)
        {
            attrs.clear();
            attrs.extend_from_slice(new_attrs);
        }
    }

    pub(crate) fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: Kind::Element { attrs, .. },
            ..
        }) = self.node_mut(id)
        {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => value.clone_into(v),
                None => attrs.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    pub(crate) fn set_text(&mut self, id: NodeId, new_text: &str) {
        if let Some(Node {
            kind: Kind::Text(text),
            ..
        }) = self.node_mut(id)
            && text != new_text
        {
            new_text.clone_into(text);
        }
    }

    /// Replace the children of `parent`. Former children not in `children` are removed.
    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let old = match self.node_mut(parent) {
            Some(node) => core::mem::take(&mut node.children),
            None => return,
        };
        for stale in old.into_iter().filter(|c| !children.contains(c)) {
            self.remove(stale);
        }
        for child in &children {
            if let Some(node) = self.node_mut(*child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.children = children;
        }
    }

    /// Remove every child of `parent`.
    pub(crate) fn clear_children(&mut self, parent: NodeId) {
        self.set_children(parent, Vec::new());
    }

    fn remove(&mut self, id: NodeId) {
        let mut stack = vec![id];
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
        while let Some(next) = stack.pop() {
            if let Some(node) = self.node_mut(next) {
                node.live = false;
                stack.extend_from_slice(&node.children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_shapes() {
        let mut doc = Document::new();
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        let text = doc.create_text("x");
        doc.set_children(li, vec![text]);
        let empty = doc.create_element("li");
        doc.set_children(ul, vec![li, empty]);
        assert_eq!(doc.outline(ul), r#"ul[li["x"] li]"#);
        assert_eq!(doc.parent(li), Some(ul));
        assert_eq!(doc.text(text), Some("x"));
        assert_eq!(doc.tag(text), None);
    }

    #[test]
    fn replacing_children_kills_dropped_subtrees() {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let inner = doc.create_text("deep");
        doc.set_children(a, vec![inner]);
        doc.set_children(root, vec![a, b]);

        doc.set_children(root, vec![b]);
        assert!(!doc.is_live(a));
        assert!(!doc.is_live(inner));
        assert!(doc.is_live(b));
        assert_eq!(doc.parent(a), None);
        assert_eq!(doc.outline(root), "div[b]");

        doc.clear_children(root);
        assert!(!doc.is_live(b));
        assert!(doc.is_live(root));
    }

    #[test]
    fn attrs_are_replaced_wholesale() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        doc.set_attrs(a, &[("href".into(), "/x".into()), ("id".into(), "l".into())]);
        assert_eq!(doc.attr(a, "href"), Some("/x"));
        doc.set_attrs(a, &[("id".into(), "m".into())]);
        assert_eq!(doc.attr(a, "href"), None);
        assert_eq!(doc.attr(a, "id"), Some("m"));
    }

    #[test]
    fn unknown_ids_are_empty() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let other = Document::new();
        assert!(other.children(a).is_empty());
        assert!(!other.is_live(a));
        assert_eq!(other.outline(a), "?");
        assert_eq!(doc.len(), 1);
    }
}
