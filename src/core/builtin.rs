//! # Built-in Actions
//!
//! The seven stock handlers. Each is a unit struct; behavior lives
//! entirely in its `run`. Missing targets and missing replacement nodes
//! are quiet no-ops, never failures.

use async_trait::async_trait;
use log::debug;

use super::exchange::{Exchange, Fragment};
use super::page::Page;
use super::registry::{Action, ActionContext, ActionError};
use crate::dom::Reconcile;

// ── morph ───────────────────────────────────────────────────────────────────

/// Reconciles the target's subtree in place to match the fetched element.
pub struct MorphAction;

#[async_trait]
impl Action for MorphAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        let (Some(target), Some(new)) = (exchange.target_node, exchange.new_node) else {
            debug!("morph: missing target or replacement, nothing to do");
            return Ok(());
        };
        cx.reconciler
            .reconcile(&mut page.document, target, &new.document, new.root);
        Ok(())
    }
}

// ── replace ─────────────────────────────────────────────────────────────────

/// Swaps the target element for the fetched element.
pub struct ReplaceAction;

#[async_trait]
impl Action for ReplaceAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        _cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        let (Some(target), Some(new)) = (exchange.target_node, exchange.new_node) else {
            return Ok(());
        };
        let replacement = page.document.adopt(&new.document, new.root, None);
        page.document.replace_with(target, replacement);
        Ok(())
    }
}

// ── append ──────────────────────────────────────────────────────────────────

/// Inserts the fetched element as the target's last child.
pub struct AppendAction;

#[async_trait]
impl Action for AppendAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        _cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        let (Some(target), Some(new)) = (exchange.target_node, exchange.new_node) else {
            return Ok(());
        };
        page.document.adopt(&new.document, new.root, Some(target));
        Ok(())
    }
}

// ── prepend ─────────────────────────────────────────────────────────────────

/// Inserts the fetched element as the target's first child.
pub struct PrependAction;

#[async_trait]
impl Action for PrependAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        _cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        let (Some(target), Some(new)) = (exchange.target_node, exchange.new_node) else {
            return Ok(());
        };
        let child = page.document.adopt(&new.document, new.root, None);
        page.document.prepend_child(target, child);
        Ok(())
    }
}

// ── remove ──────────────────────────────────────────────────────────────────

/// Detaches the target element; the fetched content is discarded.
pub struct RemoveAction;

#[async_trait]
impl Action for RemoveAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        _cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        if let Some(target) = exchange.target_node {
            page.document.detach(target);
        }
        Ok(())
    }
}

// ── navigate ────────────────────────────────────────────────────────────────

/// Full-page morph: reconciles the document's root element against the
/// fetched element. Ignores the target.
pub struct NavigateAction;

#[async_trait]
impl Action for NavigateAction {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        if let Some(new) = exchange.new_node {
            reconcile_document_root(page, &new, cx.reconciler);
        }
        Ok(())
    }
}

// ── refresh ─────────────────────────────────────────────────────────────────

/// Reloads the current location and morphs the whole document against the
/// response. The one action that ignores the exchange entirely and
/// fetches for itself: it has no anchor-href semantics to reuse. The only
/// status-code check in the system lives here.
pub struct RefreshAction;

#[async_trait]
impl Action for RefreshAction {
    async fn run(
        &self,
        page: &mut Page,
        _exchange: Exchange,
        cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        let fetched = cx.fetcher.fetch(page.location(), None).await?;
        if !fetched.status.is_success() {
            debug!("refresh: skipped, current location answered {}", fetched.status);
            return Ok(());
        }
        if let Some(new) = Fragment::from_html(&fetched.body) {
            reconcile_document_root(page, &new, cx.reconciler);
        }
        Ok(())
    }
}

/// Reconciles the page's root element against a fragment. A page with no
/// element at all just adopts the fragment.
fn reconcile_document_root(page: &mut Page, fragment: &Fragment, reconciler: &dyn Reconcile) {
    match page.document.root_element() {
        Some(root) => {
            reconciler.reconcile(&mut page.document, root, &fragment.document, fragment.root);
        }
        None => {
            let root = page.document.root();
            page.document.adopt(&fragment.document, fragment.root, Some(root));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, exchange_from, test_page};

    #[tokio::test]
    async fn test_morph_patches_target_in_place() {
        let mut page = test_page(r#"<div id="x" class="old">hi</div>"#);
        let exchange = exchange_from(&page, Some("x"), Some(r#"<div id="x" class="new">hi</div>"#));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;
        let target = exchange.target_node.unwrap();

        MorphAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), r#"<div class="new" id="x">hi</div>"#);
        assert_eq!(page.document.by_id("x"), Some(target));
    }

    #[tokio::test]
    async fn test_morph_without_target_is_noop() {
        let mut page = test_page(r#"<div id="x">hi</div>"#);
        let before = page.html();
        let exchange = exchange_from(&page, None, Some("<p>new</p>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        MorphAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), before);
    }

    #[tokio::test]
    async fn test_replace_swaps_target() {
        let mut page = test_page(r#"<div><p id="x">old</p></div>"#);
        let exchange = exchange_from(&page, Some("x"), Some("<em>new</em>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        ReplaceAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), "<div><em>new</em></div>");
    }

    #[tokio::test]
    async fn test_replace_missing_target_is_noop() {
        let mut page = test_page("<div>kept</div>");
        let exchange = exchange_from(&page, Some("nope"), Some("<em>new</em>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        ReplaceAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), "<div>kept</div>");
    }

    #[tokio::test]
    async fn test_append_adds_last_child() {
        let mut page = test_page(r#"<ul id="list"><li>a</li></ul>"#);
        let exchange = exchange_from(&page, Some("list"), Some("<li>b</li>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        AppendAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), r#"<ul id="list"><li>a</li><li>b</li></ul>"#);
    }

    #[tokio::test]
    async fn test_prepend_adds_first_child() {
        let mut page = test_page(r#"<ul id="list"><li>b</li></ul>"#);
        let exchange = exchange_from(&page, Some("list"), Some("<li>a</li>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        PrependAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), r#"<ul id="list"><li>a</li><li>b</li></ul>"#);
    }

    #[tokio::test]
    async fn test_remove_detaches_target_and_discards_content() {
        let mut page = test_page(r#"<div><p id="x">gone</p><p>kept</p></div>"#);
        let exchange = exchange_from(&page, Some("x"), Some("<em>ignored</em>"));
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        RemoveAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), "<div><p>kept</p></div>");
    }

    #[tokio::test]
    async fn test_navigate_morphs_root_ignoring_target() {
        let mut page = test_page(r#"<html><body id="b">old</body></html>"#);
        let exchange = exchange_from(
            &page,
            Some("b"),
            Some(r#"<html><body id="b">new</body></html>"#),
        );
        let fetcher = crate::fetch::Fetcher::new();
        let reconciler = crate::dom::StructuralReconciler;

        NavigateAction
            .run(&mut page, exchange, &context(&fetcher, &reconciler))
            .await
            .unwrap();

        assert_eq!(page.html(), r#"<html><body id="b">new</body></html>"#);
    }
}
