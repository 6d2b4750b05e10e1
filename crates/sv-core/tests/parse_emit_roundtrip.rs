//! Integration tests: parse → emit → re-parse round-trip.
//!
//! Verifies that no addressable structure is lost when converting SVG text
//! → document tree → SVG text.

use sv_core::dom::XmlNode;
use sv_core::emitter::emit_document;
use sv_core::parser::parse_document;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Parse, emit, re-parse, and compare element counts + native ids.
fn assert_roundtrip_preserves(input: &str) {
    let doc1 = parse_document(input).expect("first parse failed");
    let emitted = emit_document(&doc1);
    let doc2 = parse_document(&emitted).expect("re-parse failed");

    let count = |doc: &sv_core::SvgDocument| {
        doc.descendants(doc.root)
            .iter()
            .filter(|&&i| matches!(doc.graph[i], XmlNode::Element(_)))
            .count()
    };
    assert_eq!(
        count(&doc1),
        count(&doc2),
        "element count mismatch after round-trip.\nOriginal:\n{input}\nEmitted:\n{emitted}"
    );

    for id in doc1.id_index.keys() {
        assert!(
            doc2.id_index.contains_key(id),
            "element id `{id}` lost after round-trip"
        );
    }
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_badge_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/badge.svg"));
}

#[test]
fn roundtrip_icons_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/icons.svg"));
}

// ─── Structure preservation ──────────────────────────────────────────────

#[test]
fn roundtrip_preserves_prolog() {
    let input = include_str!("fixtures/badge.svg");
    let doc = parse_document(input).unwrap();
    let emitted = emit_document(&doc);
    assert!(emitted.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[test]
fn roundtrip_preserves_namespaced_and_filtered_elements() {
    // Elements excluded from the metadata tree must still survive in the
    // document itself: filtering is a view concern, not a document edit.
    let input = include_str!("fixtures/badge.svg");
    let doc = parse_document(input).unwrap();
    let emitted = emit_document(&doc);
    assert!(emitted.contains("<sodipodi:namedview id=\"base\"/>"));
    assert!(emitted.contains("<metadata>generated by hand</metadata>"));
    assert!(emitted.contains("<title>Badge</title>"));
}

#[test]
fn roundtrip_preserves_gradient_reference() {
    let input = include_str!("fixtures/badge.svg");
    let doc = parse_document(input).unwrap();
    let face = doc.get_by_id("face").expect("face circle present");
    assert_eq!(doc.element(face).unwrap().attr("fill"), Some("url(#sky)"));

    let doc2 = parse_document(&emit_document(&doc)).unwrap();
    assert!(doc2.get_by_id("sky").is_some(), "gradient def must survive");
}

#[test]
fn roundtrip_preserves_inline_style_verbatim() {
    let input = include_str!("fixtures/badge.svg");
    let doc = parse_document(input).unwrap();
    let emitted = emit_document(&doc);
    assert!(emitted.contains("style=\"stroke-linecap: round\""));
}
