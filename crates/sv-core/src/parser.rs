//! Parser for SVG text → `SvgDocument`.
//!
//! Built on `winnow` 0.7 for efficient, streaming parsing. Handles the XML
//! subset that design tools actually emit: declaration, doctype, comments,
//! CDATA, elements with quoted attributes, and character data with the five
//! predefined entities plus numeric references.
//!
//! Well-formedness is not validated beyond what the editor needs: the
//! single requirement is an `<svg>` root element. Mismatched close tags are
//! rejected because they would corrupt the tree.

use crate::dom::{Attr, Element, SvgDocument, XmlNode};
use thiserror::Error;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Why a document could not be turned into a tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input has no identifiable `<svg>` root container.
    #[error("document has no <svg> root element")]
    MissingRoot,

    /// Structurally broken markup (unterminated tag, mismatched close, …).
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Parse an SVG document string into an `SvgDocument`.
#[must_use = "parsing result should be used"]
pub fn parse_document(input: &str) -> Result<SvgDocument, ParseError> {
    let mut rest = input;

    let (declaration, doctype) = parse_prolog(&mut rest);

    skip_whitespace(&mut rest);
    if !rest.starts_with('<') {
        return Err(ParseError::MissingRoot);
    }

    let parsed = parse_element(&mut rest)?;
    if !parsed.element.local_name().eq_ignore_ascii_case("svg") {
        return Err(ParseError::MissingRoot);
    }

    let mut doc = SvgDocument::new(parsed.element);
    doc.declaration = declaration;
    doc.doctype = doctype;
    let root = doc.root;
    for child in parsed.children {
        insert_child_recursive(&mut doc, root, child);
    }
    Ok(doc)
}

// ─── Intermediate representation ─────────────────────────────────────────

/// Element as parsed, before insertion into the graph.
struct ParsedElement {
    element: Element,
    children: Vec<ParsedChild>,
}

enum ParsedChild {
    Element(ParsedElement),
    Text(String),
    Comment(String),
    CData(String),
}

fn insert_child_recursive(
    doc: &mut SvgDocument,
    parent: petgraph::graph::NodeIndex,
    child: ParsedChild,
) {
    match child {
        ParsedChild::Element(parsed) => {
            let idx = doc.add_child(parent, XmlNode::Element(parsed.element));
            for grandchild in parsed.children {
                insert_child_recursive(doc, idx, grandchild);
            }
        }
        ParsedChild::Text(text) => {
            doc.add_child(parent, XmlNode::Text(text));
        }
        ParsedChild::Comment(text) => {
            doc.add_child(parent, XmlNode::Comment(text));
        }
        ParsedChild::CData(text) => {
            doc.add_child(parent, XmlNode::CData(text));
        }
    }
}

// ─── Prolog ──────────────────────────────────────────────────────────────

/// Consume the XML declaration, DOCTYPE, and any leading comments.
/// Declaration and doctype are kept verbatim; prolog comments are dropped.
fn parse_prolog(input: &mut &str) -> (Option<String>, Option<String>) {
    let mut declaration = None;
    let mut doctype = None;

    loop {
        skip_whitespace(input);
        if input.starts_with("<?xml") {
            declaration = take_through(input, "?>");
        } else if input
            .get(..9)
            .is_some_and(|s| s.eq_ignore_ascii_case("<!doctype"))
        {
            doctype = take_through(input, ">");
        } else if input.starts_with("<!--") {
            let _ = take_through(input, "-->");
        } else {
            break;
        }
    }

    (declaration, doctype)
}

/// Consume up to and including `end`, returning the consumed span.
/// Returns the remainder of the input when `end` never appears.
fn take_through(input: &mut &str, end: &str) -> Option<String> {
    match input.find(end) {
        Some(pos) => {
            let span = &input[..pos + end.len()];
            *input = &input[pos + end.len()..];
            Some(span.to_string())
        }
        None => {
            let span = *input;
            *input = "";
            Some(span.to_string())
        }
    }
}

// ─── Low-level parsers ───────────────────────────────────────────────────

fn skip_whitespace(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, ':' | '-' | '_' | '.')
    })
    .parse_next(input)
}

fn malformed(context: &str, rest: &str) -> ParseError {
    let snippet: String = rest.chars().take(24).collect();
    ParseError::Malformed(format!("{context} near `{snippet}`"))
}

// ─── Element parser ──────────────────────────────────────────────────────

fn parse_element(input: &mut &str) -> Result<ParsedElement, ParseError> {
    let _ = '<'
        .parse_next(input)
        .map_err(|_: winnow::error::ErrMode<ContextError>| malformed("expected `<`", input))?;
    let tag = parse_name
        .parse_next(input)
        .map_err(|_| malformed("expected tag name", input))?
        .to_string();

    let mut element = Element::new(tag);
    parse_attributes(input, &mut element)?;

    skip_whitespace(input);
    if input.starts_with("/>") {
        *input = &input[2..];
        return Ok(ParsedElement {
            element,
            children: Vec::new(),
        });
    }
    if !input.starts_with('>') {
        return Err(malformed("unterminated open tag", input));
    }
    *input = &input[1..];

    let children = parse_children(input, &element.tag)?;
    Ok(ParsedElement { element, children })
}

fn parse_attributes(input: &mut &str, element: &mut Element) -> Result<(), ParseError> {
    loop {
        skip_whitespace(input);
        if input.starts_with('>') || input.starts_with("/>") || input.is_empty() {
            return Ok(());
        }

        let name = parse_name
            .parse_next(input)
            .map_err(|_| malformed("expected attribute name", input))?
            .to_string();
        skip_whitespace(input);

        // Bare attributes (no value) occasionally appear in hand-written
        // files; treat them as empty-valued.
        if !input.starts_with('=') {
            element.attrs.push(Attr {
                name,
                value: String::new(),
            });
            continue;
        }
        *input = &input[1..];
        skip_whitespace(input);

        let quote = match input.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(malformed("expected quoted attribute value", input)),
        };
        *input = &input[1..];
        let raw: &str = take_till(0.., |c: char| c == quote)
            .parse_next(input)
            .map_err(|_: winnow::error::ErrMode<ContextError>| {
                malformed("unterminated attribute value", input)
            })?;
        if !input.starts_with(quote) {
            return Err(malformed("unterminated attribute value", input));
        }
        *input = &input[1..];

        element.attrs.push(Attr {
            name,
            value: unescape(raw),
        });
    }
}

fn parse_children(input: &mut &str, open_tag: &str) -> Result<Vec<ParsedChild>, ParseError> {
    let mut children = Vec::new();

    loop {
        if input.is_empty() {
            return Err(ParseError::Malformed(format!(
                "unexpected end of input inside <{open_tag}>"
            )));
        }

        if input.starts_with("</") {
            *input = &input[2..];
            let close = parse_name
                .parse_next(input)
                .map_err(|_| malformed("expected close tag name", input))?;
            if close != open_tag {
                return Err(ParseError::Malformed(format!(
                    "mismatched close tag: expected </{open_tag}>, found </{close}>"
                )));
            }
            skip_whitespace(input);
            if !input.starts_with('>') {
                return Err(malformed("unterminated close tag", input));
            }
            *input = &input[1..];
            return Ok(children);
        }

        if input.starts_with("<!--") {
            *input = &input[4..];
            let body = take_until_terminator(input, "-->", open_tag)?;
            children.push(ParsedChild::Comment(body));
        } else if input.starts_with("<![CDATA[") {
            *input = &input[9..];
            let body = take_until_terminator(input, "]]>", open_tag)?;
            children.push(ParsedChild::CData(body));
        } else if input.starts_with("<?") {
            // Processing instructions inside the body carry nothing the
            // editor uses; skip them.
            let _ = take_through(input, "?>");
        } else if input.starts_with('<') {
            children.push(ParsedChild::Element(parse_element(input)?));
        } else {
            let raw: &str = take_till(1.., |c: char| c == '<')
                .parse_next(input)
                .map_err(|_: winnow::error::ErrMode<ContextError>| {
                    malformed("expected character data", input)
                })?;
            // Whitespace-only runs are formatting, not content.
            if !raw.trim().is_empty() {
                children.push(ParsedChild::Text(unescape(raw)));
            }
        }
    }
}

fn take_until_terminator(
    input: &mut &str,
    terminator: &str,
    open_tag: &str,
) -> Result<String, ParseError> {
    match input.find(terminator) {
        Some(pos) => {
            let body = input[..pos].to_string();
            *input = &input[pos + terminator.len()..];
            Ok(body)
        }
        None => Err(ParseError::Malformed(format!(
            "unterminated `{terminator}` section inside <{open_tag}>"
        ))),
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

/// Decode the predefined entities and numeric character references.
/// Unknown entities pass through verbatim.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';') else {
            out.push_str(rest);
            return out;
        };
        let entity = &rest[1..end];
        match entity {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            "quot" => out.push('"'),
            "apos" => out.push('\''),
            _ => {
                if let Some(code) = parse_char_ref(entity) {
                    out.push(code);
                } else {
                    out.push_str(&rest[..=end]);
                }
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

/// `#NN` or `#xNN` numeric character reference.
fn parse_char_ref(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
