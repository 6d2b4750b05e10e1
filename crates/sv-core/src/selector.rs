//! Durable selectors: locator strings that survive tree rebuilds.
//!
//! Position-based selectors (nth-child) break as soon as a sibling is
//! inserted or a group fan-out rewrites the document, so identity is
//! content-stamped instead: elements either carry a native `id` or get a
//! `data-sv-id` marker attribute written onto them. Because the marker is
//! part of the persistent tree it is serialized with the document and
//! survives every subsequent parse.

use crate::dom::SvgDocument;
use crate::id::marker_value;
use petgraph::graph::NodeIndex;
use std::fmt;

/// The attribute used to stamp synthetic identity onto elements.
pub const MARKER_ATTR: &str = "data-sv-id";

/// A durable locator for one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Native identity reference: `#the-id`.
    Id(String),
    /// Synthetic marker reference: `[data-sv-id="v"]`.
    Marker(String),
}

impl Selector {
    /// Parse a selector string produced by `Display`. Unknown syntax yields
    /// `None`; the resolver treats that as "does not resolve", never as an
    /// error.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() {
                return None;
            }
            return Some(Selector::Id(id.to_string()));
        }
        let rest = s.strip_prefix('[')?.strip_suffix(']')?;
        let (attr, value) = rest.split_once('=')?;
        if attr != MARKER_ATTR {
            return None;
        }
        let value = value.trim_matches(['"', '\'']);
        if value.is_empty() {
            return None;
        }
        Some(Selector::Marker(value.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Marker(value) => write!(f, "[{MARKER_ATTR}=\"{value}\"]"),
        }
    }
}

/// Derive (or mint) the durable selector for the element at `idx`.
///
/// Preference order: native `id` → previously-stamped marker → freshly
/// synthesized marker, which is written back onto the element so it
/// survives serialization and the next parse. Idempotent: calling twice on
/// the same node returns the same selector.
pub fn generate(doc: &mut SvgDocument, idx: NodeIndex) -> Option<Selector> {
    let el = doc.element(idx)?;

    if let Some(id) = el.dom_id() {
        return Some(Selector::Id(id.to_string()));
    }

    if let Some(existing) = el.attr(MARKER_ATTR) {
        return Some(Selector::Marker(existing.to_string()));
    }

    let value = marker_value();
    doc.set_attr(idx, MARKER_ATTR, value.clone());
    Some(Selector::Marker(value))
}
