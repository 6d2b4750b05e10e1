//! Visibility overlay: hide/show without touching the tracked document.
//!
//! State is a set of selector strings, entirely separate from document
//! text. The rendered text is recomputed from the clean baseline on every
//! change by locating each hidden element's identity attribute in the text
//! and injecting (or merging) an `opacity: 0` declaration. Because the
//! baseline is tracked separately, un-hiding never has to reverse the
//! injection by parsing, and overlay passes cannot compound.

use std::collections::HashSet;
use sv_core::selector::{MARKER_ATTR, Selector};

/// The set of hidden selectors for one editing session.
#[derive(Debug, Default)]
pub struct VisibilitySet {
    hidden: HashSet<String>,
}

impl VisibilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invert membership for a single element's selector.
    pub fn toggle(&mut self, selector: &str) {
        if !self.hidden.remove(selector) {
            self.hidden.insert(selector.to_string());
        }
    }

    /// Invert membership for a group's selector. Identical set semantics to
    /// `toggle`; the distinction exists so callers can present different
    /// affordances for containers and leaves.
    pub fn toggle_group(&mut self, selector: &str) {
        self.toggle(selector);
    }

    #[must_use]
    pub fn is_visible(&self, selector: &str) -> bool {
        !self.hidden.contains(selector)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    /// Recompute rendered text from the clean baseline.
    #[must_use]
    pub fn apply_overlay(&self, clean_text: &str) -> String {
        let mut rendered = clean_text.to_string();
        for selector in &self.hidden {
            let Some((attr, value)) = identity_key(selector) else {
                continue;
            };
            rendered = hide_in_text(&rendered, attr, &value);
        }
        rendered
    }
}

/// The attribute/value pair a hidden selector keys on. Both native ids and
/// stamped markers work, so any element the tree builder visited can be
/// hidden.
fn identity_key(selector: &str) -> Option<(&'static str, String)> {
    match Selector::parse(selector)? {
        Selector::Id(id) => Some(("id", id)),
        Selector::Marker(value) => Some((MARKER_ATTR, value)),
    }
}

// ─── Text surgery ────────────────────────────────────────────────────────

/// Inject or merge `opacity: 0` into the open tag carrying `attr="value"`.
/// Returns the input unchanged when no such tag exists.
fn hide_in_text(text: &str, attr: &str, value: &str) -> String {
    let Some((tag_start, tag_end)) = find_tag_span(text, attr, value) else {
        return text.to_string();
    };

    let open_tag = &text[tag_start..tag_end];
    let rewritten = match find_style_value(open_tag) {
        Some((style_start, style_end)) => {
            let merged = merge_opacity_zero(&open_tag[style_start..style_end]);
            format!(
                "{}{}{}",
                &open_tag[..style_start],
                merged,
                &open_tag[style_end..]
            )
        }
        None => {
            // No style attribute: add one just before the tag close.
            let insert_at = if open_tag.ends_with('/') {
                open_tag.len() - 1
            } else {
                open_tag.len()
            };
            format!(
                "{} style=\"opacity: 0\"{}",
                open_tag[..insert_at].trim_end(),
                &open_tag[insert_at..]
            )
        }
    };

    format!("{}{}{}", &text[..tag_start], rewritten, &text[tag_end..])
}

/// Locate the open tag containing `attr="value"` (either quote style).
/// The span excludes the closing `>`.
fn find_tag_span(text: &str, attr: &str, value: &str) -> Option<(usize, usize)> {
    for quote in ['"', '\''] {
        let needle = format!("{attr}={quote}{value}{quote}");
        let mut from = 0;
        while let Some(rel) = text[from..].find(&needle) {
            let pos = from + rel;
            from = pos + needle.len();

            // Attribute-name boundary: `id=` must not match `data-sv-id=`.
            let boundary = text[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_'));
            if !boundary {
                continue;
            }

            // Must be inside an open tag: a `<` before the match with no
            // intervening `>`.
            let Some(tag_start) = text[..pos].rfind('<') else {
                continue;
            };
            if text[tag_start..pos].contains('>') {
                continue;
            }
            let Some(rel_end) = text[pos..].find('>') else {
                continue;
            };
            return Some((tag_start, pos + rel_end));
        }
    }
    None
}

/// Byte span of the style attribute's value inside an open tag.
fn find_style_value(open_tag: &str) -> Option<(usize, usize)> {
    for quote in ['"', '\''] {
        let needle = format!("style={quote}");
        if let Some(pos) = open_tag.find(&needle) {
            let start = pos + needle.len();
            let end = start + open_tag[start..].find(quote)?;
            return Some((start, end));
        }
    }
    None
}

/// Drop any existing opacity declaration and append `opacity: 0`.
fn merge_opacity_zero(style: &str) -> String {
    let kept: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| decl.split(':').next().map(str::trim) != Some("opacity"))
        .collect();

    if kept.is_empty() {
        "opacity: 0".to_string()
    } else {
        format!("{}; opacity: 0", kept.join("; "))
    }
}
