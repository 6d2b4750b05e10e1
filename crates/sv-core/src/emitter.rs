//! Emitter: `SvgDocument` → SVG text.
//!
//! Deterministic output: prolog first, then the tree in document order with
//! attribute order preserved. Childless elements self-close. Round-trips
//! through the parser without loss on the supported subset.

use crate::dom::{SvgDocument, XmlNode};
use petgraph::graph::NodeIndex;
use std::fmt::Write;

/// Emit the document as SVG text.
#[must_use]
pub fn emit_document(doc: &SvgDocument) -> String {
    let mut out = String::with_capacity(1024);

    if let Some(decl) = &doc.declaration {
        out.push_str(decl);
        out.push('\n');
    }
    if let Some(doctype) = &doc.doctype {
        out.push_str(doctype);
        out.push('\n');
    }

    emit_node(&mut out, doc, doc.root);
    out
}

fn emit_node(out: &mut String, doc: &SvgDocument, idx: NodeIndex) {
    match &doc.graph[idx] {
        XmlNode::Element(el) => {
            let _ = write!(out, "<{}", el.tag);
            for attr in &el.attrs {
                let _ = write!(out, " {}=\"{}\"", attr.name, escape_attr(&attr.value));
            }

            let children = doc.children(idx);
            if children.is_empty() {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for &child in children {
                emit_node(out, doc, child);
            }
            let _ = write!(out, "</{}>", el.tag);
        }
        XmlNode::Text(text) => out.push_str(&escape_text(text)),
        XmlNode::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        XmlNode::CData(text) => {
            let _ = write!(out, "<![CDATA[{text}]]>");
        }
    }
}

/// Escape character data.
pub fn escape_text(raw: &str) -> String {
    if !raw.contains(['&', '<', '>']) {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape an attribute value for double-quoted emission.
pub fn escape_attr(raw: &str) -> String {
    if !raw.contains(['&', '<', '"']) {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
