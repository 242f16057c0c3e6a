//! The outcome of one triggered fetch, handed to exactly one action.

use crate::dom::{Document, NodeId, parse_fragment};

/// A detached parsed subtree: the first top-level element of a response
/// body, still living in its own document until an action adopts it.
#[derive(Debug)]
pub struct Fragment {
    pub document: Document,
    pub root: NodeId,
}

impl Fragment {
    /// Parses `html` and takes its first top-level element, like reading
    /// `firstElementChild` off a template. `None` when the body is empty
    /// or has no element child.
    pub fn from_html(html: &str) -> Option<Fragment> {
        let document = parse_fragment(html);
        let root = document.first_element_child(document.root())?;
        Some(Fragment { document, root })
    }
}

/// Target element plus fetched replacement for one click. Built fresh per
/// exchange, consumed by value by the action, then dropped.
#[derive(Debug)]
pub struct Exchange {
    /// The element named by `phlex-target`, when given and found.
    pub target_node: Option<NodeId>,
    /// The first element parsed out of the response body, when any.
    pub new_node: Option<Fragment>,
}
