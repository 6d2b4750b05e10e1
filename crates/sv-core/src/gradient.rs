//! Gradient synthesizer: reusable `<linearGradient>`/`<radialGradient>`
//! definitions linked to targets by `url(#…)` reference.
//!
//! Linear geometry places the gradient axis through the element center:
//! a unit vector rotated by the author-facing angle (degrees, clockwise
//! from the positive x-axis, matching the slider), scaled to 50% and
//! mirrored around (50%, 50%). Radial gradients are a fixed centered
//! circle; the angle is retained in the config for UI continuity only.

use crate::classify::is_container;
use crate::dom::{Element, SvgDocument, XmlNode};
use crate::emitter::emit_document;
use crate::mutate::{EditError, PaintProperty, edit_targets, ensure_identity, strip_style_props};
use crate::resolver;
use crate::selector::Selector;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

// ─── Config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

/// Author-facing gradient description, mirrored by the edit widgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientConfig {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub start_color: String,
    pub end_color: String,
    /// Degrees in [0, 360). Meaningless for radial, kept for UI continuity.
    pub angle: f32,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            start_color: "#000000".into(),
            end_color: "#ffffff".into(),
            angle: 0.0,
        }
    }
}

// ─── Definition synthesis ────────────────────────────────────────────────

/// Percentage with at most two decimals, trailing zeros trimmed.
fn format_pct(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}%", rounded as i64)
    } else {
        format!("{rounded}%")
    }
}

/// Build the definition element (with its two stops) under `defs`.
fn insert_gradient_def(
    doc: &mut SvgDocument,
    defs: NodeIndex,
    gradient_id: &str,
    config: &GradientConfig,
) {
    let el = match config.kind {
        GradientKind::Linear => {
            let radians = config.angle.to_radians();
            let (sin, cos) = radians.sin_cos();
            let mut el = Element::new("linearGradient");
            el.set_attr("id", gradient_id);
            el.set_attr("x1", format_pct(50.0 - 50.0 * cos));
            el.set_attr("y1", format_pct(50.0 - 50.0 * sin));
            el.set_attr("x2", format_pct(50.0 + 50.0 * cos));
            el.set_attr("y2", format_pct(50.0 + 50.0 * sin));
            el
        }
        GradientKind::Radial => {
            let mut el = Element::new("radialGradient");
            el.set_attr("id", gradient_id);
            el.set_attr("cx", "50%");
            el.set_attr("cy", "50%");
            el.set_attr("r", "50%");
            el
        }
    };
    let def_idx = doc.add_child(defs, XmlNode::Element(el));

    for (offset, color) in [("0%", &config.start_color), ("100%", &config.end_color)] {
        let mut stop = Element::new("stop");
        stop.set_attr("offset", offset);
        stop.set_attr("style", format!("stop-color:{color};stop-opacity:1"));
        doc.add_child(def_idx, XmlNode::Element(stop));
    }
}

/// Find the document's `defs` container, creating one as the first child of
/// the root when absent.
fn ensure_defs(doc: &mut SvgDocument) -> NodeIndex {
    let existing = doc.element_children(doc.root).into_iter().find(|&c| {
        doc.element(c)
            .is_some_and(|el| el.local_name().eq_ignore_ascii_case("defs"))
    });
    match existing {
        Some(idx) => idx,
        None => doc.insert_first_child(doc.root, XmlNode::Element(Element::new("defs"))),
    }
}

// ─── Application ─────────────────────────────────────────────────────────

/// Link fill or stroke of the selected element (or every styleable
/// descendant of a container) to a synthesized gradient definition.
/// Returns the new document text.
///
/// Container fan-out produces one independently-keyed gradient per target,
/// so per-element recoloring stays possible even though the config is
/// shared. Re-applying with the same selector replaces the prior
/// definitions instead of accumulating them.
pub fn apply_gradient(
    doc: &mut SvgDocument,
    selector: &Selector,
    property: PaintProperty,
    config: &GradientConfig,
) -> Result<String, EditError> {
    let targets = edit_targets(doc, selector)?;
    // Fan-out keying follows container-ness, not target count: a group with
    // one styleable descendant still gets the indexed key form.
    let fan_out = resolver::resolve(doc, selector)
        .map(|idx| is_container(doc, idx))
        .unwrap_or(false);
    let defs = ensure_defs(doc);

    for (index, idx) in targets.into_iter().enumerate() {
        let Some(identity) = ensure_identity(doc, idx) else {
            continue;
        };
        let gradient_id = if fan_out {
            format!("{}-gradient-{identity}-{index}", property.as_str())
        } else {
            format!("{}-gradient-{identity}", property.as_str())
        };

        // Replace any prior definition carrying the same key.
        if let Some(stale) = doc
            .element_children(defs)
            .into_iter()
            .find(|&c| doc.element(c).and_then(Element::dom_id) == Some(gradient_id.as_str()))
        {
            doc.remove_subtree(stale);
        }

        insert_gradient_def(doc, defs, &gradient_id, config);
        doc.set_attr(idx, property.as_str(), format!("url(#{gradient_id})"));
        strip_style_props(doc, idx, &[property.as_str(), property.opacity_companion()]);
    }

    Ok(emit_document(doc))
}

/// Look up the two stop colors of the gradient a paint value references
/// (`url(#key)`), if that definition exists. Used by tests and by widgets
/// that mirror the current gradient back into the editor controls.
#[must_use]
pub fn referenced_stops(doc: &SvgDocument, paint_value: &str) -> Option<(String, String)> {
    let key = paint_value.strip_prefix("url(#")?.strip_suffix(')')?;
    let def = resolver::resolve(doc, &Selector::Id(key.to_string()))?;

    let mut colors = doc.element_children(def).into_iter().filter_map(|stop| {
        let el = doc.element(stop)?;
        let style = el.attr("style")?;
        style.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            (name.trim() == "stop-color").then(|| value.trim().to_string())
        })
    });
    Some((colors.next()?, colors.next()?))
}
