//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;
use reqwest::Url;

use crate::core::exchange::{Exchange, Fragment};
use crate::core::page::Page;
use crate::core::registry::{Action, ActionContext, ActionError};
use crate::dom::Reconcile;
use crate::fetch::Fetcher;

/// An action that does nothing, for registry plumbing tests.
pub struct NoopAction;

#[async_trait]
impl Action for NoopAction {
    async fn run(
        &self,
        _page: &mut Page,
        _exchange: Exchange,
        _cx: &ActionContext<'_>,
    ) -> Result<(), ActionError> {
        Ok(())
    }
}

/// A page anchored at a throwaway localhost location.
pub fn test_page(html: &str) -> Page {
    Page::load(html, Url::parse("http://localhost/").unwrap())
}

/// Builds the exchange an action would receive: target resolved by id in
/// the page, replacement parsed out of `body`.
pub fn exchange_from(page: &Page, target_id: Option<&str>, body: Option<&str>) -> Exchange {
    Exchange {
        target_node: target_id.and_then(|id| page.document.by_id(id)),
        new_node: body.and_then(Fragment::from_html),
    }
}

pub fn context<'a>(fetcher: &'a Fetcher, reconciler: &'a dyn Reconcile) -> ActionContext<'a> {
    ActionContext {
        fetcher,
        reconciler,
    }
}
