//! Selection state: which node is selected, and the attribute snapshot the
//! edit widgets render from.
//!
//! Selection is keyed by selector, never by live reference, so it survives
//! tree rebuilds by lookup. When the selector stops resolving the selection
//! transitions to "nothing selected"; that is a state, not an error.

use serde::Serialize;
use sv_core::dom::{Element, SvgDocument};
use sv_core::id::NodeId;
use sv_core::selector::Selector;
use sv_core::NodeIndex;

/// Snapshot of the selected node's editable values, decoupled from the live
/// tree so widgets can render without re-querying per frame.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedElement {
    pub element_id: NodeId,
    pub tag_name: String,
    pub dom_id: Option<String>,
    pub class_name: Option<String>,
    pub display_name: Option<String>,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: String,
}

/// Per-session selection store. One instance per document; no globals.
#[derive(Debug, Default)]
pub struct SelectionState {
    selector: Option<Selector>,
    current: Option<SelectedElement>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn current(&self) -> Option<&SelectedElement> {
        self.current.as_ref()
    }

    pub fn set(&mut self, selector: Selector, snapshot: SelectedElement) {
        self.selector = Some(selector);
        self.current = Some(snapshot);
    }

    /// Transition to "nothing selected".
    pub fn clear(&mut self) {
        self.selector = None;
        self.current = None;
    }

    /// Re-read the snapshot's attribute values from the live tree after an
    /// edit, keeping identity fields as they were.
    pub fn refresh_from(&mut self, doc: &SvgDocument, idx: NodeIndex) {
        if let (Some(snapshot), Some(el)) = (self.current.as_mut(), doc.element(idx)) {
            let (fill, stroke, stroke_width) = paint_values(el);
            snapshot.fill = fill;
            snapshot.stroke = stroke;
            snapshot.stroke_width = stroke_width;
        }
    }
}

/// Capture a full snapshot for the element at `idx`.
pub fn capture(
    doc: &SvgDocument,
    idx: NodeIndex,
    element_id: NodeId,
    display_name: Option<String>,
) -> Option<SelectedElement> {
    let el = doc.element(idx)?;
    let (fill, stroke, stroke_width) = paint_values(el);

    Some(SelectedElement {
        element_id,
        tag_name: el.tag.to_ascii_lowercase(),
        dom_id: el.dom_id().map(str::to_string),
        class_name: el
            .attr("class")
            .and_then(|c| c.split_whitespace().next())
            .map(str::to_string),
        display_name,
        fill,
        stroke,
        stroke_width,
    })
}

/// Attribute reads with the widget-facing defaults: absent paint is
/// `none`, absent width is `1`. Colors written as `rgb(r, g, b)` are
/// normalized to hex for the pickers.
fn paint_values(el: &Element) -> (String, String, String) {
    let fill = el.attr("fill").filter(|v| !v.is_empty()).unwrap_or("none");
    let stroke = el.attr("stroke").filter(|v| !v.is_empty()).unwrap_or("none");
    let width = el
        .attr("stroke-width")
        .filter(|v| !v.is_empty())
        .unwrap_or("1");
    (rgb_to_hex(fill), rgb_to_hex(stroke), width.to_string())
}

/// `rgb(r, g, b)` → `#rrggbb`; anything else passes through unchanged.
#[must_use]
pub fn rgb_to_hex(value: &str) -> String {
    let parse = || {
        let inner = value.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        parts.next().is_none().then(|| format!("#{r:02x}{g:02x}{b:02x}"))
    };
    parse().unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_core::parser::parse_document;

    #[test]
    fn capture_reads_attributes_with_defaults() {
        let doc = parse_document(
            "<svg><circle id=\"c1\" class=\"dot red\" fill=\"blue\" r=\"4\"/></svg>",
        )
        .unwrap();
        let idx = doc.get_by_id("c1").unwrap();
        let snap = capture(&doc, idx, NodeId::from_dom_id("c1"), None).unwrap();

        assert_eq!(snap.tag_name, "circle");
        assert_eq!(snap.dom_id.as_deref(), Some("c1"));
        assert_eq!(snap.class_name.as_deref(), Some("dot"));
        assert_eq!(snap.fill, "blue");
        assert_eq!(snap.stroke, "none");
        assert_eq!(snap.stroke_width, "1");
    }

    #[test]
    fn rgb_values_normalize_to_hex() {
        assert_eq!(rgb_to_hex("rgb(255, 0, 16)"), "#ff0010");
        assert_eq!(rgb_to_hex("#aabbcc"), "#aabbcc");
        assert_eq!(rgb_to_hex("none"), "none");
        assert_eq!(rgb_to_hex("rgb(1, 2)"), "rgb(1, 2)");
    }

    #[test]
    fn clear_is_nothing_selected() {
        let doc = parse_document("<svg><rect id=\"r\" fill=\"red\"/></svg>").unwrap();
        let idx = doc.get_by_id("r").unwrap();
        let mut state = SelectionState::new();
        let snap = capture(&doc, idx, NodeId::from_dom_id("r"), None).unwrap();
        state.set(Selector::Id("r".into()), snap);
        assert!(state.current().is_some());

        state.clear();
        assert!(state.current().is_none());
        assert!(state.selector().is_none());
    }
}
