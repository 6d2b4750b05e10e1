//! Export preparation: the encoders live outside the core, but they must
//! receive a self-contained, clean document.
//!
//! Vector export strips leftover selection styling and guarantees the
//! namespace/version declarations plus an XML declaration. Raster export
//! additionally needs canvas metrics derived from the view box.

use crate::dom::SvgDocument;
use crate::emitter::emit_document;
use crate::mutate::strip_style_props;
use crate::parser::{ParseError, parse_document};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Supersampling multiplier for raster export.
pub const RASTER_SCALE: u32 = 2;
/// Raster output is flattened onto this opaque background.
pub const RASTER_BACKGROUND: &str = "#ffffff";
/// Default bitmap encoder quality.
pub const RASTER_QUALITY: f32 = 0.95;
/// Canvas size when neither a view box nor a rendered size is available.
pub const RASTER_FALLBACK_SIZE: (f32, f32) = (800.0, 600.0);

/// Produce the downloadable vector document: selection styling removed,
/// namespaces and version guaranteed, XML declaration prepended.
///
/// Falls back to string-level cleaning when the current text does not parse
/// (better a slightly dirty download than none).
#[must_use]
pub fn prepare_vector_export(text: &str) -> String {
    match try_prepare(text) {
        Ok(prepared) => prepared,
        Err(_) => prepare_direct(text),
    }
}

fn try_prepare(text: &str) -> Result<String, ParseError> {
    let mut doc = parse_document(text)?;

    // Remove selection outline styling and `selected` class tokens left by
    // the preview layer.
    for idx in doc.descendants(doc.root) {
        strip_style_props(&mut doc, idx, &["outline", "outline-offset"]);
        let Some(el) = doc.element_mut(idx) else {
            continue;
        };
        if let Some(class) = el.attr("class") {
            let kept: Vec<&str> = class
                .split_whitespace()
                .filter(|token| *token != "selected")
                .collect();
            if kept.is_empty() {
                el.remove_attr("class");
            } else {
                el.set_attr("class", kept.join(" "));
            }
        }
    }

    let root = doc.root;
    if doc.element(root).is_some_and(|el| el.attr("xmlns").is_none()) {
        doc.set_attr(root, "xmlns", SVG_NAMESPACE);
    }
    if doc
        .element(root)
        .is_some_and(|el| el.attr("xmlns:xlink").is_none())
    {
        doc.set_attr(root, "xmlns:xlink", XLINK_NAMESPACE);
    }
    if doc.element(root).is_some_and(|el| el.attr("version").is_none()) {
        doc.set_attr(root, "version", "1.1");
    }

    doc.declaration = Some(XML_DECLARATION.to_string());
    Ok(emit_document(&doc))
}

/// String-level fallback cleaning for unparseable input.
fn prepare_direct(text: &str) -> String {
    let mut cleaned = text.to_string();

    if !cleaned.contains("xmlns=\"http://www.w3.org/2000/svg\"") {
        cleaned = cleaned.replacen("<svg", &format!("<svg xmlns=\"{SVG_NAMESPACE}\""), 1);
    }

    if cleaned.starts_with("<?xml") {
        cleaned
    } else {
        format!("{XML_DECLARATION}\n{cleaned}")
    }
}

// ─── Raster metrics ──────────────────────────────────────────────────────

/// Canvas dimensions for the bitmap encoder, already supersampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterMetrics {
    pub width: u32,
    pub height: u32,
}

/// Size the raster canvas: declared view box → caller-measured rendered
/// size → fixed default, all multiplied by `RASTER_SCALE`.
#[must_use]
pub fn raster_metrics(doc: &SvgDocument, rendered_size: Option<(f32, f32)>) -> RasterMetrics {
    let base = view_box_size(doc)
        .or(rendered_size)
        .unwrap_or(RASTER_FALLBACK_SIZE);

    RasterMetrics {
        width: (base.0.max(1.0) as u32) * RASTER_SCALE,
        height: (base.1.max(1.0) as u32) * RASTER_SCALE,
    }
}

fn view_box_size(doc: &SvgDocument) -> Option<(f32, f32)> {
    let view_box = doc.element(doc.root)?.attr("viewBox")?;
    let mut parts = view_box
        .split([' ', ','])
        .filter(|p| !p.is_empty())
        .skip(2)
        .filter_map(|p| p.parse::<f32>().ok());
    let width = parts.next()?;
    let height = parts.next()?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}
