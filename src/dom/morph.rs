//! # Reconciliation
//!
//! In-place update of a live subtree to match the shape of a freshly
//! fetched one. The algorithm is pluggable: the engine only depends on the
//! [`Reconcile`] contract, and [`StructuralReconciler`] is the default
//! plug. Swap in something smarter (keyed matching, cursor preservation)
//! at construction time without touching the dispatch flow.

use super::{Document, NodeId};

/// Reconciles a live node against a source node from another document.
///
/// Contract: after the call, `target`'s subtree has the same shape as
/// `source_node`'s, and nodes that already matched keep their identity
/// (their `NodeId` handles stay valid and attached).
pub trait Reconcile: Send + Sync {
    fn reconcile(
        &self,
        doc: &mut Document,
        target: NodeId,
        source: &Document,
        source_node: NodeId,
    );
}

/// Tag-driven structural reconciler.
///
/// Elements with matching tags are patched in place: attributes are
/// synced, then children are walked pairwise. Text refreshes text,
/// same-tag elements recurse, anything else is replaced. Surplus live
/// children are detached, missing ones adopted. Mismatched roots are
/// replaced outright.
pub struct StructuralReconciler;

impl Reconcile for StructuralReconciler {
    fn reconcile(
        &self,
        doc: &mut Document,
        target: NodeId,
        source: &Document,
        source_node: NodeId,
    ) {
        if same_tag(doc, target, source, source_node) {
            patch_element(doc, target, source, source_node);
        } else {
            let replacement = doc.adopt(source, source_node, None);
            doc.replace_with(target, replacement);
        }
    }
}

fn same_tag(doc: &Document, a: NodeId, source: &Document, b: NodeId) -> bool {
    match (doc.tag_name(a), source.tag_name(b)) {
        (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
        _ => false,
    }
}

fn patch_element(doc: &mut Document, target: NodeId, source: &Document, source_node: NodeId) {
    sync_attrs(doc, target, source, source_node);

    let live: Vec<NodeId> = doc.children(target).to_vec();
    let incoming: Vec<NodeId> = source.children(source_node).to_vec();
    let shared = live.len().min(incoming.len());

    for i in 0..shared {
        patch_child(doc, live[i], source, incoming[i]);
    }
    for surplus in &live[shared..] {
        doc.detach(*surplus);
    }
    for missing in &incoming[shared..] {
        doc.adopt(source, *missing, Some(target));
    }
}

fn patch_child(doc: &mut Document, live: NodeId, source: &Document, incoming: NodeId) {
    if let Some(new_text) = source.text(incoming) {
        if let Some(old_text) = doc.text(live) {
            if old_text != new_text {
                doc.set_text(live, new_text);
            }
            return;
        }
    } else if same_tag(doc, live, source, incoming) {
        patch_element(doc, live, source, incoming);
        return;
    }

    let replacement = doc.adopt(source, incoming, None);
    doc.replace_with(live, replacement);
}

fn sync_attrs(doc: &mut Document, target: NodeId, source: &Document, source_node: NodeId) {
    let wanted: Vec<(String, String)> = source
        .element(source_node)
        .map(|e| {
            e.attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();

    let stale: Vec<String> = doc
        .element(target)
        .map(|e| {
            e.attrs
                .keys()
                .filter(|k| !wanted.iter().any(|(name, _)| name == *k))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    for name in stale {
        doc.remove_attr(target, &name);
    }
    for (name, value) in wanted {
        doc.set_attr(target, &name, &value);
    }
}
