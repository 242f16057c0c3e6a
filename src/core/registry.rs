//! # Action Registry
//!
//! Named DOM-update handlers. The dispatcher resolves the clicked
//! anchor's `phlex-action` value here after the fetch settles; the found
//! action consumes the [`Exchange`] and mutates the page.
//!
//! The registry is an ordinary owned map, constructed by whoever composes
//! the application and handed to the dispatcher. Registration is an
//! insert, lookup is a get, and the last registration for a name wins.
//! Looking up a name nobody registered is not an error; the dispatcher
//! treats it as a no-op action.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::builtin;
use super::exchange::Exchange;
use super::page::Page;
use crate::dom::Reconcile;
use crate::fetch::{FetchError, Fetcher};

/// Errors an action can surface. They never reach the embedding
/// application from the click path; the dispatcher absorbs and logs them.
#[derive(Debug)]
pub enum ActionError {
    /// A side-channel fetch issued by the action failed.
    Fetch(FetchError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Fetch(e) => write!(f, "action fetch failed: {e}"),
        }
    }
}

impl std::error::Error for ActionError {}

impl From<FetchError> for ActionError {
    fn from(e: FetchError) -> Self {
        ActionError::Fetch(e)
    }
}

/// Collaborators an action may need beyond the page itself.
pub struct ActionContext<'a> {
    pub fetcher: &'a Fetcher,
    pub reconciler: &'a dyn Reconcile,
}

/// A named, registered DOM-update handler.
///
/// Implementations mutate the page as a side effect and swallow their own
/// "nothing to do" cases (missing target, missing replacement) silently.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(
        &self,
        page: &mut Page,
        exchange: Exchange,
        cx: &ActionContext<'_>,
    ) -> Result<(), ActionError>;
}

/// Mapping from action name to handler.
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry, without even the built-ins.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Inserts or overwrites the handler for `name`. Always succeeds.
    pub fn define(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry pre-populated with the seven built-in actions.
pub fn default_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.define("morph", Arc::new(builtin::MorphAction));
    registry.define("replace", Arc::new(builtin::ReplaceAction));
    registry.define("append", Arc::new(builtin::AppendAction));
    registry.define("prepend", Arc::new(builtin::PrependAction));
    registry.define("remove", Arc::new(builtin::RemoveAction));
    registry.define("navigate", Arc::new(builtin::NavigateAction));
    registry.define("refresh", Arc::new(builtin::RefreshAction));
    registry
}
