//! Minimal structural query interface over a parsed page.
//!
//! The extractor only needs to find nodes by CSS selector and read their text
//! or attributes, so it is written against [`QueryNode`] and never touches the
//! HTML library directly.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

pub trait QueryNode: Sized {
    /// All descendants matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Result<Vec<Self>, ExtractError>;

    /// Concatenated text of the node and its descendants, untrimmed.
    fn text(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    fn select_first(&self, selector: &str) -> Result<Option<Self>, ExtractError> {
        Ok(self.select_all(selector)?.into_iter().next())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl QueryNode for ElementRef<'_> {
    fn select_all(&self, selector: &str) -> Result<Vec<Self>, ExtractError> {
        let selector = parse_selector(selector)?;
        Ok(self.select(&selector).collect())
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(String::from)
    }
}

/// An HTML page backed by `scraper`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(body: &str) -> Result<Self, ExtractError> {
        if body.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        Ok(Self {
            html: Html::parse_document(body),
        })
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}
