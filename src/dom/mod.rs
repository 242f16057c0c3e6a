//! # DOM
//!
//! An arena-backed document tree: nodes live in a flat `Vec` and refer to
//! each other through `NodeId` handles. Detaching a node only unlinks it;
//! the slot stays in the arena so handles held by callers never dangle.
//!
//! This is the "live page" the actions mutate. It deliberately models only
//! what a hypermedia update cycle touches: tags, attributes, text, and
//! tree structure. No styles, no form-control state, no event listeners.

pub mod morph;
pub mod parse;

pub use morph::{Reconcile, StructuralReconciler};
pub use parse::parse_fragment;

use std::collections::BTreeMap;

/// Handle to a node inside a [`Document`] arena.
///
/// Only meaningful for the document that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// Tag name plus attributes. Attributes are kept sorted so serialization
/// is deterministic.
#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    pub(crate) attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An owned document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The document node itself. Always present, never an element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// First element child of the document node, i.e. the `<html>` element
    /// of a full page.
    pub fn root_element(&self) -> Option<NodeId> {
        self.first_element_child(self.root)
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    fn create_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: Option<NodeId>,
        tag: impl Into<String>,
        attrs: BTreeMap<String, String>,
    ) -> NodeId {
        self.create_node(
            parent,
            NodeKind::Element(ElementData {
                tag: tag.into(),
                attrs,
            }),
        )
    }

    pub fn create_text(&mut self, parent: Option<NodeId>, text: impl Into<String>) -> NodeId {
        self.create_node(parent, NodeKind::Text(text.into()))
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub(crate) fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            element.attrs.remove(name);
        }
    }

    /// Text data of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub(crate) fn set_text(&mut self, node: NodeId, value: &str) {
        if let NodeKind::Text(text) = &mut self.nodes[node.0].kind {
            value.clone_into(text);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .find(|child| self.is_element(*child))
    }

    /// Finds the first element in document order whose `id` attribute
    /// matches, like `getElementById`.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.find_by_id(self.root, id)
    }

    fn find_by_id(&self, node: NodeId, id: &str) -> Option<NodeId> {
        if self.attr(node, "id") == Some(id) {
            return Some(node);
        }
        self.nodes[node.0]
            .children
            .iter()
            .find_map(|child| self.find_by_id(*child, id))
    }

    /// Concatenated text of the subtree, like `textContent`.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Document | NodeKind::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
        }
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Unlinks a node from its parent. The node and its subtree stay in
    /// the arena, so existing handles remain valid but detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent {
            self.nodes[parent.0].children.retain(|id| *id != node);
            self.nodes[node.0].parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.insert(0, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Puts `replacement` in `old`'s position and detaches `old`.
    /// No-op when `old` has no parent.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        self.detach(replacement);
        let Some(position) = self.nodes[parent.0]
            .children
            .iter()
            .position(|id| *id == old)
        else {
            return;
        };
        self.nodes[parent.0].children[position] = replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
    }

    /// Deep-copies a subtree out of another document into this one,
    /// optionally attaching it under `parent`. Returns the copy's root.
    pub fn adopt(&mut self, source: &Document, source_node: NodeId, parent: Option<NodeId>) -> NodeId {
        let kind = match &source.nodes[source_node.0].kind {
            // A document node never travels; its children do.
            NodeKind::Document => NodeKind::Element(ElementData {
                tag: "template".to_string(),
                attrs: BTreeMap::new(),
            }),
            other => other.clone(),
        };
        let copy = self.create_node(parent, kind);
        for child in &source.nodes[source_node.0].children {
            self.adopt(source, *child, Some(copy));
        }
        copy
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serializes the whole document.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[self.root.0].children {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Serializes one node and its subtree, like `outerHTML`.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => {
                for child in &self.nodes[node.0].children {
                    self.write_node(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if parse::is_void(&element.tag) {
                    return;
                }
                let raw_text = parse::is_raw_text(&element.tag);
                for child in &self.nodes[node.0].children {
                    if raw_text {
                        if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                            out.push_str(text);
                        }
                    } else {
                        self.write_node(*child, out);
                    }
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
