//! Parsing of a single `ListRecords` response page.
//!
//! A page is parsed as well-formed XML first. Some repositories answer with
//! malformed or HTML-wrapped markup under error or throttling conditions; for
//! those the page is re-read with a tolerant HTML parser, which can still
//! locate the resumption token but not the records.

use roxmltree::{Document, Node, ParsingOptions};
use scraper::{ElementRef, Html};

use crate::config::OAI_NAMESPACE;
use crate::error::{HarvesterError, Result};
use crate::types::{Record, ResumptionToken};
use crate::xml::{find_by_path, find_child, find_descendants, get_text, serialize_element};

/// How a page body was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Well-formed XML; records and token are reliable.
    Strict,
    /// Tolerant HTML-style parse; only the token was searched for.
    Lenient,
}

/// Records and continuation state extracted from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub mode: ParseMode,

    /// Records in document order (always empty in lenient mode).
    pub records: Vec<Record>,

    /// The page's resumption token, if one was found.
    pub token: Option<ResumptionToken>,
}

impl Page {
    /// Total size of the result set as implied by this (first) page.
    ///
    /// With a token present this is its `completeListSize` (0 when the
    /// attribute is missing). A well-formed page without a token holds the
    /// entire result set, so its record count is the total.
    pub fn total(&self) -> Result<u64> {
        match (&self.token, self.mode) {
            (Some(token), _) => parse_list_size(token.complete_list_size.as_deref()),
            (None, ParseMode::Strict) => Ok(self.records.len() as u64),
            (None, ParseMode::Lenient) => Ok(0),
        }
    }
}

fn parse_list_size(value: Option<&str>) -> Result<u64> {
    match value.map(str::trim) {
        None => Ok(0),
        Some(v) => v
            .parse()
            .map_err(|_| HarvesterError::InvalidListSize(v.to_string())),
    }
}

/// Parse a response body, falling back to lenient parsing if it is not well-formed XML.
pub fn parse_page(body: &[u8]) -> Page {
    match parse_strict(body) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(error = %e, "Response is not well-formed XML, falling back to lenient parsing");
            parse_lenient(body)
        }
    }
}

/// Parse a response body as well-formed OAI-PMH XML.
pub fn parse_strict(body: &[u8]) -> Result<Page> {
    let text = std::str::from_utf8(body)?;

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    let records = find_descendants(root, OAI_NAMESPACE, "record")
        .map(extract_record)
        .collect();

    let token = find_descendants(root, OAI_NAMESPACE, "resumptionToken")
        .next()
        .map(|node| ResumptionToken {
            value: node.text().map(str::to_string),
            complete_list_size: node.attribute("completeListSize").map(str::to_string),
        });

    Ok(Page {
        mode: ParseMode::Strict,
        records,
        token,
    })
}

/// Search a malformed body for a `resumptiontoken` element, case-insensitively.
///
/// The last match wins. No records are extracted. The token value is the
/// element's leading text only. The HTML parser ignores `/>` on unknown
/// elements, so a self-closed token still gets no value even when text
/// follows it, but an element nested after it is treated as its child.
pub fn parse_lenient(body: &[u8]) -> Page {
    let html = Html::parse_document(&String::from_utf8_lossy(body));

    let token = html
        .tree
        .nodes()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name().eq_ignore_ascii_case("resumptiontoken"))
        .last()
        .map(|el| {
            let text = el
                .children()
                .next()
                .and_then(|child| child.value().as_text())
                .map(|text| String::from(&**text));
            ResumptionToken {
                value: text.filter(|t| !t.is_empty()),
                complete_list_size: el
                    .value()
                    .attrs()
                    .find(|(name, _)| name.eq_ignore_ascii_case("completelistsize"))
                    .map(|(_, value)| value.to_string()),
            }
        });

    Page {
        mode: ParseMode::Lenient,
        records: Vec::new(),
        token,
    }
}

fn extract_record(node: Node<'_, '_>) -> Record {
    let header = find_child(node, OAI_NAMESPACE, "header");

    let identifier = find_by_path(node, OAI_NAMESPACE, "header/identifier")
        .map(get_text)
        .filter(|id| !id.is_empty());
    let datestamp = find_by_path(node, OAI_NAMESPACE, "header/datestamp")
        .map(get_text)
        .filter(|d| !d.is_empty());
    let deleted = header.is_some_and(|h| h.attribute("status") == Some("deleted"));

    Record {
        identifier,
        datestamp,
        deleted,
        xml: serialize_element(node),
    }
}
