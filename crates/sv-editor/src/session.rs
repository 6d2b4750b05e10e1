//! The editing session: one document, one selection, one visibility set.
//!
//! `EditorSession` owns the live tree, the clean (pre-overlay) text, the
//! rendered text, and the metadata tree, and keeps them mutually consistent
//! across the edit cycle:
//!
//! mutate tree → re-emit clean text → re-apply visibility overlay →
//! refresh the selection snapshot → mark the metadata tree dirty.
//!
//! The metadata tree rebuild is coalesced: edits only set a dirty flag and
//! the rebuild happens lazily on the next `tree()` access, so a burst of
//! slider edits costs one rebuild (the library-level form of the source's
//! debounce timer). Edits apply strictly in call order, overlay
//! recomputation runs strictly after each commit (write-then-notify), and
//! a failed edit leaves every piece of state untouched.

use crate::selection::{self, SelectedElement, SelectionState};
use crate::visibility::VisibilitySet;
use log::debug;
use sv_core::dom::SvgDocument;
use sv_core::gradient::{self, GradientConfig};
use sv_core::id::NodeId;
use sv_core::mutate::{self, EditError, PaintProperty};
use sv_core::parser::{ParseError, parse_document};
use sv_core::selector::Selector;
use sv_core::tree::{self, TreeNode};
use sv_core::{emit_document, resolver};

/// One editing session over one document. Construct per document; there are
/// no globals, so multiple sessions can coexist.
#[derive(Default)]
pub struct EditorSession {
    doc: Option<SvgDocument>,
    clean_text: String,
    rendered_text: String,
    tree: Vec<TreeNode>,
    tree_dirty: bool,
    selection: SelectionState,
    visibility: VisibilitySet,
}

impl EditorSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Document lifecycle ──────────────────────────────────────────────

    /// Load a new document. On parse failure the previous state is retained
    /// in full and the error is returned.
    pub fn load(&mut self, text: &str) -> Result<(), ParseError> {
        let doc = parse_document(text)?;

        self.clean_text = emit_document(&doc);
        self.doc = Some(doc);
        self.selection.clear();
        self.visibility = VisibilitySet::new();
        self.tree = Vec::new();
        self.tree_dirty = true;
        self.rendered_text = self.clean_text.clone();
        Ok(())
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.doc.is_some()
    }

    /// The clean document text: the source of truth, without overlay.
    #[must_use]
    pub fn document_text(&self) -> &str {
        &self.clean_text
    }

    /// The text handed to the preview: clean text plus visibility overlay.
    #[must_use]
    pub fn rendered_text(&self) -> &str {
        &self.rendered_text
    }

    // ─── Metadata tree ───────────────────────────────────────────────────

    /// The current metadata tree, rebuilding first if edits are pending.
    pub fn tree(&mut self) -> &[TreeNode] {
        if self.tree_dirty {
            if let Some(doc) = self.doc.as_mut() {
                self.tree = tree::build_tree(doc);
                // Stamping during the build may have touched the document.
                self.clean_text = emit_document(doc);
                self.rendered_text = self.visibility.apply_overlay(&self.clean_text);
            }
            self.tree_dirty = false;
        }
        &self.tree
    }

    /// Flip a tree node's fold state. View state only.
    pub fn toggle_expand(&mut self, logical_id: NodeId) -> bool {
        self.tree();
        tree::toggle_expanded(&mut self.tree, logical_id)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select the element the selector resolves to. Returns the captured
    /// snapshot, or `None` (with selection cleared) when the selector does
    /// not resolve. Stale selection is a state, not an error.
    pub fn select(&mut self, selector_str: &str) -> Option<&SelectedElement> {
        self.tree();

        let parsed = Selector::parse(selector_str);
        let (idx, parsed) = match (parsed, self.doc.as_ref()) {
            (Some(sel), Some(doc)) => match resolver::resolve(doc, &sel) {
                Some(idx) => (idx, sel),
                None => {
                    debug!("selection lost: `{selector_str}` no longer resolves");
                    self.selection.clear();
                    return None;
                }
            },
            _ => {
                self.selection.clear();
                return None;
            }
        };

        let node = find_tree_node(&self.tree, selector_str);
        let element_id = node
            .map(|n| n.logical_id)
            .unwrap_or_else(|| NodeId::intern(selector_str));
        let display_name = node.and_then(|n| n.display_name.clone());

        let doc = self.doc.as_ref()?;
        let snapshot = selection::capture(doc, idx, element_id, display_name)?;
        self.selection.set(parsed, snapshot);
        self.selection.current()
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// The current selection snapshot, absent when nothing is selected.
    #[must_use]
    pub fn selected(&self) -> Option<&SelectedElement> {
        self.selection.current()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a solid fill or stroke color (`#rrggbb`) to the selector's
    /// target: the element itself, or every styleable descendant of a
    /// container.
    pub fn apply_color(
        &mut self,
        selector_str: &str,
        property: PaintProperty,
        color: &str,
    ) -> Result<(), EditError> {
        let selector = parse_edit_selector(selector_str)?;
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| EditError::TargetNotFound(selector_str.to_string()))?;
        let new_text = mutate::apply_color(doc, &selector, property, color)?;
        self.commit(new_text);
        Ok(())
    }

    /// Apply a stroke width (non-negative) to the selector's target.
    pub fn apply_stroke_width(
        &mut self,
        selector_str: &str,
        width: f32,
    ) -> Result<(), EditError> {
        let selector = parse_edit_selector(selector_str)?;
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| EditError::TargetNotFound(selector_str.to_string()))?;
        let new_text = mutate::apply_stroke_width(doc, &selector, width.max(0.0))?;
        self.commit(new_text);
        Ok(())
    }

    /// Synthesize a gradient and point the target's fill or stroke at it.
    pub fn apply_gradient(
        &mut self,
        selector_str: &str,
        property: PaintProperty,
        config: &GradientConfig,
    ) -> Result<(), EditError> {
        let selector = parse_edit_selector(selector_str)?;
        let doc = self
            .doc
            .as_mut()
            .ok_or_else(|| EditError::TargetNotFound(selector_str.to_string()))?;
        let new_text = gradient::apply_gradient(doc, &selector, property, config)?;
        self.commit(new_text);
        Ok(())
    }

    // ─── Visibility ──────────────────────────────────────────────────────

    pub fn toggle_visibility(&mut self, selector_str: &str) {
        self.visibility.toggle(selector_str);
        self.rendered_text = self.visibility.apply_overlay(&self.clean_text);
    }

    pub fn toggle_group_visibility(&mut self, selector_str: &str) {
        self.visibility.toggle_group(selector_str);
        self.rendered_text = self.visibility.apply_overlay(&self.clean_text);
    }

    #[must_use]
    pub fn is_visible(&self, selector_str: &str) -> bool {
        self.visibility.is_visible(selector_str)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Commit a successful mutation: new clean text becomes the source of
    /// truth, the overlay is re-applied on top of it, the metadata rebuild
    /// is deferred, and the selection snapshot is refreshed (or dropped if
    /// the selector no longer resolves).
    fn commit(&mut self, new_text: String) {
        self.clean_text = new_text;
        self.tree_dirty = true;
        self.rendered_text = self.visibility.apply_overlay(&self.clean_text);
        self.refresh_selection();
    }

    fn refresh_selection(&mut self) {
        let Some(selector) = self.selection.selector().cloned() else {
            return;
        };
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        match resolver::resolve(doc, &selector) {
            Some(idx) => self.selection.refresh_from(doc, idx),
            None => {
                debug!("selection lost after edit: `{selector}`");
                self.selection.clear();
            }
        }
    }
}

/// Depth-first search for the tree node carrying this selector.
fn find_tree_node<'a>(nodes: &'a [TreeNode], selector: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.selector == selector {
            return Some(node);
        }
        if let Some(found) = find_tree_node(&node.children, selector) {
            return Some(found);
        }
    }
    None
}

/// Selector strings arriving from widgets; unknown syntax cannot resolve,
/// which an edit reports as a missing target.
fn parse_edit_selector(selector_str: &str) -> Result<Selector, EditError> {
    Selector::parse(selector_str)
        .ok_or_else(|| EditError::TargetNotFound(selector_str.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<svg viewBox=\"0 0 10 10\"><circle id=\"c1\" fill=\"blue\" r=\"4\"/></svg>";

    #[test]
    fn load_failure_retains_previous_state() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();
        let before = session.document_text().to_string();

        assert!(session.load("<div>not svg</div>").is_err());
        assert_eq!(session.document_text(), before);
        assert!(session.is_loaded());
    }

    #[test]
    fn select_then_edit_refreshes_snapshot() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();

        let snap = session.select("#c1").unwrap();
        assert_eq!(snap.fill, "blue");

        session
            .apply_color("#c1", PaintProperty::Fill, "#00ff00")
            .unwrap();
        assert_eq!(session.selected().unwrap().fill, "#00ff00");
        assert!(session.document_text().contains("fill=\"#00ff00\""));
    }

    #[test]
    fn failed_edit_changes_nothing() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();
        session.select("#c1");
        let text_before = session.document_text().to_string();

        let result = session.apply_color("#ghost", PaintProperty::Fill, "#ff0000");
        assert!(matches!(result, Err(EditError::TargetNotFound(_))));
        assert_eq!(session.document_text(), text_before);
        assert_eq!(session.selected().unwrap().fill, "blue");
    }

    #[test]
    fn selection_survives_rebuild_by_selector() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();
        session.select("#c1");

        // Edit forces a rebuild of the metadata tree on next access.
        session
            .apply_color("#c1", PaintProperty::Stroke, "#123456")
            .unwrap();
        let tree = session.tree();
        assert_eq!(tree[0].selector, "#c1");
        assert!(session.selected().is_some());
    }

    #[test]
    fn visibility_overlay_layers_over_clean_text() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();

        session.toggle_visibility("#c1");
        assert!(!session.is_visible("#c1"));
        assert!(session.rendered_text().contains("opacity: 0"));
        assert!(!session.document_text().contains("opacity: 0"));

        session.toggle_visibility("#c1");
        assert!(session.is_visible("#c1"));
        assert_eq!(session.rendered_text(), session.document_text());
    }

    #[test]
    fn overlay_reapplies_after_each_edit() {
        let mut session = EditorSession::new();
        session.load(DOC).unwrap();
        session.toggle_visibility("#c1");

        session
            .apply_color("#c1", PaintProperty::Fill, "#ff00ff")
            .unwrap();
        let rendered = session.rendered_text();
        assert!(rendered.contains("fill=\"#ff00ff\""));
        assert!(rendered.contains("opacity: 0"));
        assert!(!session.document_text().contains("opacity: 0"));
    }

    #[test]
    fn tree_rebuild_is_coalesced() {
        let mut session = EditorSession::new();
        session.load("<svg><rect id=\"a\"/><rect id=\"b\"/></svg>").unwrap();

        // Burst of edits; no tree access in between.
        for color in ["#111111", "#222222", "#333333"] {
            session.apply_color("#a", PaintProperty::Fill, color).unwrap();
        }
        let tree = session.tree();
        assert_eq!(tree.len(), 2);
        assert!(session.document_text().contains("fill=\"#333333\""));
    }

    #[test]
    fn expand_state_toggles_by_logical_id() {
        let mut session = EditorSession::new();
        session
            .load("<svg><g id=\"grp\"><rect id=\"r\"/></g></svg>")
            .unwrap();
        session.tree();
        assert!(session.toggle_expand(NodeId::from_dom_id("grp")));
        assert!(!session.tree()[0].is_expanded);
    }
}
