//! Locating the embedded list blob in a list page.
//!
//! The site hands list data to its own front end as a JSON string in the
//! `data-items` attribute of a table. Which table carries it has varied with
//! page state, so the heuristic is kept behind [`ListDataLocator`].

use scraper::{Html, Selector};

pub trait ListDataLocator: Send + Sync {
    /// Return the raw (entity-decoded) blob, or `None` if the page has none.
    fn locate(&self, html: &str) -> Option<String>;
}

/// Reads an attribute from the first element matching `primary`, then from
/// the first element matching `fallback`.
#[derive(Debug, Clone)]
pub struct TableAttributeLocator {
    pub primary: &'static str,
    pub fallback: &'static str,
    pub attribute: &'static str,
}

impl Default for TableAttributeLocator {
    fn default() -> Self {
        Self { primary: "table.list-table", fallback: "table", attribute: "data-items" }
    }
}

impl ListDataLocator for TableAttributeLocator {
    fn locate(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        [self.primary, self.fallback].into_iter().find_map(|css| {
            let sel = Selector::parse(css).ok()?;
            doc.select(&sel).next()?.value().attr(self.attribute).map(str::to_string)
        })
    }
}
