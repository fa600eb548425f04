//! Decoding raw bytes and parsing them into an HTML document
//!
//! Parsing goes through html5ever (via scraper), so malformed markup is
//! recovered the way browsers recover it. The parsed tree is never mutated.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ParseError;

/// How far into the input to look for a `<meta charset>` declaration
const PRESCAN_LIMIT: usize = 1024;

static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));

/// A parsed, immutable HTML document
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Decode raw bytes and parse them
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = decode_html(bytes)?;
        Ok(Self::parse_str(&text))
    }

    /// Parse already-decoded markup
    pub fn parse_str(html: &str) -> Self {
        Document {
            html: Html::parse_document(html),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The `html` element
    pub fn root_element(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All `table` elements, in document order, nested tables included
    pub fn tables(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.select(&SELECTOR_TABLE)
    }
}

/// All descendant text of an element, whitespace runs collapsed and trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<String>();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode raw input to a string, detecting the character encoding
///
/// Candidates, in order: byte-order mark, `<meta>` charset declaration,
/// UTF-8, windows-1252. The first one that decodes without malformed
/// sequences wins.
pub fn decode_html(bytes: &[u8]) -> Result<String, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::NoMarkup);
    }

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!(encoding = encoding.name(), "encoding from byte-order mark");
        return encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .map(|text| text.into_owned())
            .ok_or(ParseError::Encoding);
    }

    let candidates = [sniff_meta_charset(bytes), Some(UTF_8), Some(WINDOWS_1252)];
    for encoding in candidates.into_iter().flatten() {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            debug!(encoding = encoding.name(), "decoded input");
            return Ok(text.into_owned());
        }
    }

    Err(ParseError::Encoding)
}

/// Find a charset declared in a `<meta>` tag near the start of the input
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let end = tag.find('>').unwrap_or(tag.len());
        let attrs = &tag[..end];

        if let Some(pos) = attrs.find("charset") {
            let value = attrs[pos + "charset".len()..].trim_start();
            if let Some(value) = value.strip_prefix('=') {
                let label: String = value
                    .trim_start()
                    .trim_start_matches(&['"', '\''][..])
                    .chars()
                    .take_while(|c| !matches!(c, '"' | '\'' | ';' | '/') && !c.is_whitespace())
                    .collect();
                // UTF-16 labels in a meta tag mean UTF-8
                if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                    return Some(encoding.output_encoding());
                }
            }
        }
        rest = &tag[end..];
    }

    None
}
