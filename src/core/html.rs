// src/core/html.rs
//
// Helpers over `scraper` for the fragments we pull out of rendered pages
// (select options, container inner HTML).

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};
use super::sanitize::normalize_ws;

/// One `<option>` of a `<select>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub text: String,
    pub value: String,
}

impl SelectOption {
    /// "Select a city…" style entries carry no value.
    pub fn is_placeholder(&self) -> bool {
        self.value.trim().is_empty()
    }
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Extraction(format!("bad selector {css:?}: {e}")))
}

/// Parse the inner HTML of a `<select>` into its options, in document order.
pub fn parse_options(select_inner: &str) -> Vec<SelectOption> {
    // Re-wrap so the fragment parser keeps <option> in a select context.
    let doc = Html::parse_fragment(&format!("<select>{select_inner}</select>"));
    let Ok(sel) = Selector::parse("option") else { return Vec::new() };
    doc.select(&sel)
        .map(|opt| SelectOption {
            text: normalize_ws(&text_of(opt)),
            value: opt.value().attr("value").unwrap_or("").trim().to_string(),
        })
        .collect()
}

/// Options that name an actual entry.
pub fn populated_options(select_inner: &str) -> Vec<SelectOption> {
    parse_options(select_inner)
        .into_iter()
        .filter(|o| !o.is_placeholder())
        .collect()
}

/// Concatenated text of an element, newlines kept.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Text of the element with `id`, trimmed.
pub fn text_by_id(doc: &Html, id: &str) -> Option<String> {
    let sel = selector(&format!("#{id}")).ok()?;
    doc.select(&sel).next().map(|el| text_of(el).trim().to_string())
}

/// Raw text of the first element matching `css`.
pub fn first_text(doc: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next().map(text_of))
}

/// Text of the first `tag` element whose text contains `needle`.
pub fn text_of_tag_containing(doc: &Html, tag: &str, needle: &str) -> Result<Option<String>> {
    let sel = selector(tag)?;
    Ok(doc
        .select(&sel)
        .map(text_of)
        .find(|t| t.contains(needle)))
}
