//! Selector resolution: which rows of the document become CSV
//!
//! A `--select` value is read as an integer index, then as a CSS selector,
//! then as an XPath expression. Only a syntax error moves on to the next
//! interpretation; a valid selector that matches nothing is final.

mod xpath;

pub use xpath::*;

use std::num::IntErrorKind;

use scraper::{ElementRef, Selector as CssSelector};
use tracing::debug;

use crate::document::Document;
use crate::error::{HtmltabError, Result};

/// A parsed `--select` value
#[derive(Debug)]
pub enum Selector {
    /// 1-based position among all `table` elements
    Index(i64),
    Css(CssSelector),
    XPath(XPathQuery),
}

impl Selector {
    /// Interpret `select` as an index, CSS selector, or XPath expression
    pub fn parse(select: &str) -> Result<Self> {
        match select.trim().parse::<i64>() {
            Ok(n) => return Ok(Selector::Index(n)),
            // Still an integer, just one no document has that many tables for
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Ok(Selector::Index(i64::MAX)),
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => return Ok(Selector::Index(i64::MIN)),
            Err(_) => {}
        }

        if let Ok(css) = CssSelector::parse(select) {
            return Ok(Selector::Css(css));
        }

        XPathQuery::compile(select)
            .map(Selector::XPath)
            .map_err(|_| HtmltabError::BadSelector(select.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Selector::Index(_) => "index",
            Selector::Css(_) => "css",
            Selector::XPath(_) => "xpath",
        }
    }

    /// Evaluate against the whole document, returning matches in order
    pub fn matches<'a>(&self, document: &'a Document) -> Result<Vec<ElementRef<'a>>> {
        let found = match self {
            // Zero and negative indices are valid but select nothing
            Selector::Index(n) if *n < 1 => Vec::new(),
            Selector::Index(n) => usize::try_from(*n - 1)
                .ok()
                .and_then(|position| document.tables().nth(position))
                .into_iter()
                .collect(),
            Selector::Css(css) => document.html().select(css).collect(),
            Selector::XPath(query) => query.evaluate(document).map_err(|failure| match failure {
                XPathFailure::Execution(_) => HtmltabError::BadSelector(query.expr().to_string()),
                XPathFailure::NonElement => HtmltabError::MixedOrInvalidMatch,
            })?,
        };
        Ok(found)
    }
}

/// Turn a match set into the `tr` elements to output
///
/// Accepted: exactly one `table` (its own rows), or one or more `tr`
/// elements (used as they are, in match order).
pub fn row_source(matches: Vec<ElementRef<'_>>) -> Result<Vec<ElementRef<'_>>> {
    if matches.is_empty() {
        return Err(HtmltabError::NoMatch);
    }

    if let [single] = matches.as_slice() {
        let tag = single.value().name();
        if tag == "table" {
            return Ok(table_rows(*single));
        }
        if tag != "tr" {
            return Err(HtmltabError::UnexpectedElement(tag.to_string()));
        }
    }

    if matches.iter().all(|el| el.value().name() == "tr") {
        Ok(matches)
    } else {
        Err(HtmltabError::MixedOrInvalidMatch)
    }
}

/// Rows belonging to `table` itself
///
/// Direct `tr` children plus the `tr` children of its `thead`, `tbody` and
/// `tfoot`, in document order. Rows of nested tables are left out; those
/// tables end up as text inside a cell.
pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Resolve `select` against `document` into the rows to convert
pub fn resolve<'a>(document: &'a Document, select: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = Selector::parse(select)?;
    let matches = selector.matches(document)?;
    debug!(select, kind = selector.kind(), matches = matches.len(), "evaluated selector");

    let rows = row_source(matches)?;
    debug!(rows = rows.len(), "resolved row source");
    Ok(rows)
}
