//! # phlex
//!
//! Hypermedia click handling for server-rendered pages: intercept an
//! anchor click, fetch its `href`, and apply a named action (morph,
//! replace, append, prepend, remove, navigate, refresh) to the live
//! document with the fetched fragment.
//!
//! The embedding application owns the [`Page`] and delivers [`Click`]s;
//! the [`Dispatcher`] does the rest.

pub mod core;
pub mod dom;
pub mod fetch;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    Action, ActionContext, ActionError, ActionRegistry, Click, Dispatcher, Disposition, Exchange,
    Fragment, Modifiers, Page, Trigger, default_registry,
};
pub use crate::core::dispatcher::{ATTR_ACTION, ATTR_DISABLED, ATTR_FRAGMENT, ATTR_TARGET};
pub use crate::dom::{Document, NodeId, Reconcile, StructuralReconciler, parse_fragment};
pub use crate::fetch::{FRAGMENT_HEADER, FetchError, FetchedBody, Fetcher};
