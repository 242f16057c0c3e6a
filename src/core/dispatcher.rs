//! # Dispatcher
//!
//! Turns anchor clicks into the fetch-and-update cycle, exactly once per
//! eligible click:
//!
//! ```text
//! Click ──handle_click──▶ Disposition
//!                           │ Intercepted(trigger)      (anchor disabled)
//!                           ▼
//!                        resolve ──▶ fetch ──▶ parse ──▶ Exchange
//!                           │                               │
//!                           │                        registry lookup
//!                           │                               │
//!                           ▼                               ▼
//!                     anchor re-enabled  ◀──────── action mutates page
//! ```
//!
//! `handle_click` is synchronous and decides eligibility; `resolve` is the
//! asynchronous continuation. The anchor's `aria-disabled` attribute is
//! set between the two and cleared when the continuation settles, on
//! success and failure alike, so a failed fetch never strands a link.
//! Nothing from this cycle propagates to the embedding application;
//! failures are logged and absorbed here.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Url;

use super::click::Click;
use super::exchange::{Exchange, Fragment};
use super::page::Page;
use super::registry::{Action, ActionContext, ActionError, ActionRegistry, default_registry};
use crate::dom::{NodeId, Reconcile, StructuralReconciler};
use crate::fetch::Fetcher;

// ============================================================================
// Markup contract
// ============================================================================

/// Names the registered action to run; absence leaves the click alone.
pub const ATTR_ACTION: &str = "phlex-action";
/// Id of the element that becomes the exchange's target node.
pub const ATTR_TARGET: &str = "phlex-target";
/// Value forwarded to the server in the `X-Fragment` request header.
pub const ATTR_FRAGMENT: &str = "phlex-fragment";
/// Read to short-circuit clicks, written to mark the in-flight window.
pub const ATTR_DISABLED: &str = "aria-disabled";

// ============================================================================
// Click outcomes
// ============================================================================

/// Everything read off the anchor at interception time.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub anchor: NodeId,
    pub href: Url,
    pub action: String,
    pub target_id: Option<String>,
    pub fragment: Option<String>,
}

/// What a click turned out to be. Only `Intercepted` suppresses default
/// navigation and starts a fetch; `AnchorDisabled` suppresses without
/// fetching; the rest leave the browser-equivalent behavior untouched.
#[derive(Debug)]
pub enum Disposition {
    NotAnAnchor,
    ModifierBypass,
    AnchorDisabled,
    DefaultNavigation,
    Intercepted(Trigger),
}

// ============================================================================
// Dispatcher
// ============================================================================

pub struct Dispatcher {
    registry: ActionRegistry,
    fetcher: Fetcher,
    reconciler: Box<dyn Reconcile>,
}

impl Dispatcher {
    /// Dispatcher with the built-in actions, a plain client, and the
    /// structural reconciler.
    pub fn new() -> Self {
        Self::with_parts(
            default_registry(),
            Fetcher::new(),
            Box::new(StructuralReconciler),
        )
    }

    /// Fully custom wiring; the composition root owns all the choices.
    pub fn with_parts(
        registry: ActionRegistry,
        fetcher: Fetcher,
        reconciler: Box<dyn Reconcile>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            reconciler,
        }
    }

    /// Registers (or overwrites) an action. Usable before or after any
    /// number of clicks.
    pub fn define_action(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.registry.define(name, action);
    }

    /// Synchronous eligibility pass, run before anything suspends.
    ///
    /// On `Intercepted` the anchor has been marked `aria-disabled` and the
    /// returned trigger must be passed to [`resolve`](Self::resolve) to
    /// settle the cycle.
    pub fn handle_click(&self, page: &mut Page, event: &Click) -> Disposition {
        let anchor = event.target;

        if !page
            .document
            .tag_name(anchor)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("a"))
        {
            return Disposition::NotAnAnchor;
        }

        if event.modifiers.any() {
            return Disposition::ModifierBypass;
        }

        if page
            .document
            .attr(anchor, ATTR_DISABLED)
            .is_some_and(|value| !value.is_empty())
        {
            return Disposition::AnchorDisabled;
        }

        let Some(action) = nonempty_attr(page, anchor, ATTR_ACTION) else {
            return Disposition::DefaultNavigation;
        };

        let href = resolve_href(page, anchor);
        let target_id = nonempty_attr(page, anchor, ATTR_TARGET);
        let fragment = nonempty_attr(page, anchor, ATTR_FRAGMENT);

        page.document.set_attr(anchor, ATTR_DISABLED, "true");

        Disposition::Intercepted(Trigger {
            anchor,
            href,
            action,
            target_id,
            fragment,
        })
    }

    /// The asynchronous continuation: fetch, parse, dispatch to the
    /// action, then re-enable the anchor no matter how any of it went.
    pub async fn resolve(&self, page: &mut Page, trigger: Trigger) {
        let anchor = trigger.anchor;
        if let Err(e) = self.run_exchange(page, trigger).await {
            warn!("exchange failed: {e}");
        }
        page.document.remove_attr(anchor, ATTR_DISABLED);
    }

    async fn run_exchange(&self, page: &mut Page, trigger: Trigger) -> Result<(), ActionError> {
        let fetched = self
            .fetcher
            .fetch(&trigger.href, trigger.fragment.as_deref())
            .await?;

        let exchange = Exchange {
            target_node: trigger
                .target_id
                .as_deref()
                .and_then(|id| page.document.by_id(id)),
            new_node: Fragment::from_html(&fetched.body),
        };

        let Some(action) = self.registry.lookup(&trigger.action) else {
            debug!("no action registered under {:?}", trigger.action);
            return Ok(());
        };

        let cx = ActionContext {
            fetcher: &self.fetcher,
            reconciler: self.reconciler.as_ref(),
        };
        action.run(page, exchange, &cx).await
    }

    /// Both phases in one call, for embedders that do not need to observe
    /// the in-flight window.
    pub async fn click(&self, page: &mut Page, event: &Click) -> Disposition {
        let disposition = self.handle_click(page, event);
        if let Disposition::Intercepted(trigger) = &disposition {
            self.resolve(page, trigger.clone()).await;
        }
        disposition
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn nonempty_attr(page: &Page, node: NodeId, name: &str) -> Option<String> {
    page.document
        .attr(node, name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// The anchor's URL, resolved against the page location the way the
/// platform resolves `link.href`. A missing or unresolvable href falls
/// back to the page location itself.
fn resolve_href(page: &Page, anchor: NodeId) -> Url {
    match page.document.attr(anchor, "href").filter(|h| !h.is_empty()) {
        Some(href) => match page.location().join(href) {
            Ok(url) => url,
            Err(e) => {
                debug!("href {href:?} did not resolve: {e}");
                page.location().clone()
            }
        },
        None => page.location().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_page;
    use crate::core::click::Modifiers;

    fn anchor_of(page: &Page) -> NodeId {
        page.document
            .by_id("link")
            .expect("test page must have an #link anchor")
    }

    #[test]
    fn test_click_on_non_anchor_is_ignored() {
        let mut page = test_page(r#"<button id="link">not a link</button>"#);
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        assert!(matches!(disposition, Disposition::NotAnAnchor));
        assert_eq!(page.document.attr(target, ATTR_DISABLED), None);
    }

    #[test]
    fn test_modifier_click_bypasses_even_with_action() {
        let mut page =
            test_page(r#"<a id="link" href="/x" phlex-action="morph">go</a>"#);
        let target = anchor_of(&page);
        let click = Click::with_modifiers(
            target,
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            },
        );
        let disposition = Dispatcher::new().handle_click(&mut page, &click);
        assert!(matches!(disposition, Disposition::ModifierBypass));
        assert_eq!(page.document.attr(target, ATTR_DISABLED), None);
    }

    #[test]
    fn test_disabled_anchor_short_circuits() {
        let mut page = test_page(
            r#"<a id="link" href="/x" phlex-action="morph" aria-disabled="true">go</a>"#,
        );
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        assert!(matches!(disposition, Disposition::AnchorDisabled));
    }

    #[test]
    fn test_empty_disabled_marker_does_not_disable() {
        let mut page = test_page(
            r#"<a id="link" href="/x" phlex-action="morph" aria-disabled="">go</a>"#,
        );
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        assert!(matches!(disposition, Disposition::Intercepted(_)));
    }

    #[test]
    fn test_no_action_attribute_means_default_navigation() {
        let mut page = test_page(r#"<a id="link" href="/x">plain</a>"#);
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        assert!(matches!(disposition, Disposition::DefaultNavigation));
        assert_eq!(page.document.attr(target, ATTR_DISABLED), None);
    }

    #[test]
    fn test_valueless_action_attribute_means_default_navigation() {
        let mut page = test_page(r#"<a id="link" href="/x" phlex-action>plain</a>"#);
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        assert!(matches!(disposition, Disposition::DefaultNavigation));
    }

    #[test]
    fn test_interception_reads_trigger_and_disables_anchor() {
        let mut page = test_page(
            r#"<a id="link" href="items" phlex-action="append" phlex-target="list" phlex-fragment="rows">more</a>"#,
        );
        let target = anchor_of(&page);
        let dispatcher = Dispatcher::new();

        let disposition = dispatcher.handle_click(&mut page, &Click::new(target));
        let Disposition::Intercepted(trigger) = disposition else {
            panic!("expected interception, got {disposition:?}");
        };
        assert_eq!(trigger.anchor, target);
        assert_eq!(trigger.href.as_str(), "http://localhost/items");
        assert_eq!(trigger.action, "append");
        assert_eq!(trigger.target_id.as_deref(), Some("list"));
        assert_eq!(trigger.fragment.as_deref(), Some("rows"));
        assert_eq!(page.document.attr(target, ATTR_DISABLED), Some("true"));

        // The in-flight guard: a second click is rejected outright.
        let second = dispatcher.handle_click(&mut page, &Click::new(target));
        assert!(matches!(second, Disposition::AnchorDisabled));
    }

    #[test]
    fn test_missing_href_falls_back_to_location() {
        let mut page = test_page(r#"<a id="link" phlex-action="refresh">reload</a>"#);
        let target = anchor_of(&page);
        let disposition = Dispatcher::new().handle_click(&mut page, &Click::new(target));
        let Disposition::Intercepted(trigger) = disposition else {
            panic!("expected interception");
        };
        assert_eq!(trigger.href.as_str(), "http://localhost/");
    }
}
