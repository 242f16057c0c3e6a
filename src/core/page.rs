//! # Page
//!
//! The live session state the dispatcher works on: one document plus the
//! location it was loaded from. The location anchors relative `href`
//! resolution and is what the refresh action re-fetches.
//!
//! The page is owned by the embedding application and lent mutably to the
//! engine per click, which is what serializes all DOM mutation.

use reqwest::Url;

use crate::dom::{Document, parse_fragment};

pub struct Page {
    pub document: Document,
    location: Url,
}

impl Page {
    /// Parses a full page out of `html`, anchored at `location`.
    pub fn load(html: &str, location: Url) -> Self {
        Self {
            document: parse_fragment(html),
            location,
        }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Serialized form of the current document.
    pub fn html(&self) -> String {
        self.document.to_html()
    }
}
