//! Integration tests for the full edit pipeline: build an addressable tree,
//! resolve selectors, mutate, re-parse the committed text, and verify the
//! logical node still reaches its live counterpart.

use sv_core::gradient::{self, GradientConfig, GradientKind};
use sv_core::mutate::{self, EditError, PaintProperty};
use sv_core::selector::Selector;
use sv_core::tree::{TreeNode, build_tree};
use sv_core::{SvgDocument, emit_document, parse_document, resolver};

fn flatten<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
    for node in nodes {
        out.push(node);
        flatten(&node.children, out);
    }
}

// ─── Resolver round-trip over a real build ───────────────────────────────

#[test]
fn every_built_node_resolves_to_itself() {
    let mut doc = parse_document(include_str!("fixtures/badge.svg")).unwrap();
    let tree = build_tree(&mut doc);

    let mut all = Vec::new();
    flatten(&tree, &mut all);
    assert!(!all.is_empty());

    for node in all {
        let idx = resolver::resolve_str(&doc, &node.selector)
            .unwrap_or_else(|| panic!("selector `{}` must resolve", node.selector));
        let el = doc.element(idx).unwrap();
        assert_eq!(el.tag.to_ascii_lowercase(), node.tag_name);
        assert_eq!(el.dom_id().map(str::to_string), node.dom_id);
    }
}

#[test]
fn selector_generation_is_stable_across_builds() {
    let mut doc = parse_document("<svg><path d=\"M0 0\"/><rect width=\"4\"/></svg>").unwrap();
    let first = build_tree(&mut doc);

    // Rebuild from the committed text, the way every edit cycle does.
    let mut reparsed = parse_document(&emit_document(&doc)).unwrap();
    let second = build_tree(&mut reparsed);

    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.selector, b.selector, "selectors must survive the rebuild");
    }
}

// ─── Mutation persistence ────────────────────────────────────────────────

#[test]
fn color_edit_persists_through_rebuild() {
    let mut doc = parse_document(include_str!("fixtures/badge.svg")).unwrap();
    let sel = Selector::Id("check".into());
    let text = mutate::apply_color(&mut doc, &sel, PaintProperty::Fill, "#ff0000").unwrap();

    let rebuilt = parse_document(&text).unwrap();
    let idx = resolver::resolve(&rebuilt, &sel).expect("selector survives rebuild");
    assert_eq!(rebuilt.element(idx).unwrap().attr("fill"), Some("#ff0000"));
}

#[test]
fn uploaded_circle_scenario() {
    // Upload → select #c1 → fill #00ff00 → no leftover fill:blue anywhere.
    let mut doc =
        parse_document("<svg><circle id=\"c1\" style=\"fill:blue\" r=\"5\"/></svg>").unwrap();
    let text = mutate::apply_color(
        &mut doc,
        &Selector::Id("c1".into()),
        PaintProperty::Fill,
        "#00ff00",
    )
    .unwrap();

    assert!(text.contains("fill=\"#00ff00\""));
    assert!(!text.contains("fill:blue"));
}

// ─── Group fan-out ───────────────────────────────────────────────────────

#[test]
fn anonymous_group_fans_out_to_identified_paths() {
    // The group has no native id: its selector comes from marker stamping.
    let mut doc = parse_document(include_str!("fixtures/icons.svg")).unwrap();
    let tree = build_tree(&mut doc);
    let group_selector = tree[0].selector.clone();
    assert!(group_selector.starts_with("[data-sv-id="));

    let sel = Selector::parse(&group_selector).unwrap();
    let text = mutate::apply_color(&mut doc, &sel, PaintProperty::Fill, "#112233").unwrap();

    let rebuilt = parse_document(&text).unwrap();
    for id in ["p1", "p2", "p3"] {
        let idx = rebuilt.get_by_id(id).unwrap();
        assert_eq!(
            rebuilt.element(idx).unwrap().attr("fill"),
            Some("#112233"),
            "path {id} must carry the fan-out fill"
        );
    }
    // The group element itself stays paint-free.
    let group = resolver::resolve(&rebuilt, &sel).unwrap();
    assert_eq!(rebuilt.element(group).unwrap().attr("fill"), None);
}

#[test]
fn fan_out_touches_exactly_the_styleable_set() {
    let mut doc = parse_document(
        "<svg><g id=\"grp\"><rect id=\"a\"/><g id=\"inner\"><line id=\"b\"/></g>\
         <desc>note</desc></g></svg>",
    )
    .unwrap();
    let text = mutate::apply_color(
        &mut doc,
        &Selector::Id("grp".into()),
        PaintProperty::Fill,
        "#445566",
    )
    .unwrap();

    assert_eq!(text.matches("fill=\"#445566\"").count(), 2);
    let rebuilt = parse_document(&text).unwrap();
    let inner = rebuilt.get_by_id("inner").unwrap();
    assert_eq!(rebuilt.element(inner).unwrap().attr("fill"), None);
}

// ─── Gradient round-trip ─────────────────────────────────────────────────

#[test]
fn gradient_roundtrip_through_rebuild() {
    let mut doc = parse_document("<svg><rect id=\"r\" width=\"8\" height=\"8\"/></svg>").unwrap();
    let config = GradientConfig {
        kind: GradientKind::Linear,
        start_color: "#000000".into(),
        end_color: "#ffffff".into(),
        angle: 90.0,
    };
    let text = gradient::apply_gradient(
        &mut doc,
        &Selector::Id("r".into()),
        PaintProperty::Fill,
        &config,
    )
    .unwrap();

    let rebuilt = parse_document(&text).unwrap();
    let idx = resolver::resolve(&rebuilt, &Selector::Id("r".into())).unwrap();
    let fill = rebuilt.element(idx).unwrap().attr("fill").unwrap().to_string();
    assert!(fill.starts_with("url(#"));

    let (start, end) = gradient::referenced_stops(&rebuilt, &fill).expect("definition present");
    assert_eq!(start, "#000000");
    assert_eq!(end, "#ffffff");
}

#[test]
fn gradient_on_existing_defs_does_not_duplicate_container() {
    let mut doc = parse_document(include_str!("fixtures/badge.svg")).unwrap();
    let text = gradient::apply_gradient(
        &mut doc,
        &Selector::Id("face".into()),
        PaintProperty::Fill,
        &GradientConfig::default(),
    )
    .unwrap();
    assert_eq!(text.matches("<defs").count(), 1);
}

// ─── Error paths ─────────────────────────────────────────────────────────

#[test]
fn unresolvable_selector_drops_edit_and_keeps_text() {
    let mut doc = parse_document(include_str!("fixtures/icons.svg")).unwrap();
    let before = emit_document(&doc);

    let result = mutate::apply_color(
        &mut doc,
        &Selector::Id("nope".into()),
        PaintProperty::Fill,
        "#ff0000",
    );
    assert!(matches!(result, Err(EditError::TargetNotFound(_))));
    assert_eq!(emit_document(&doc), before);
}

#[test]
fn degenerate_group_drops_edit() {
    let mut doc =
        parse_document("<svg><g id=\"empty\"><metadata>x</metadata></g></svg>").unwrap();
    let before = emit_document(&doc);
    let result = gradient::apply_gradient(
        &mut doc,
        &Selector::Id("empty".into()),
        PaintProperty::Fill,
        &GradientConfig::default(),
    );
    assert!(matches!(result, Err(EditError::DegenerateGroup(_))));
    assert_eq!(emit_document(&doc), before);
}

// ─── Addressable tree consistency ────────────────────────────────────────

#[test]
fn tree_and_live_document_stay_consistent_over_edit_cycle() {
    let mut doc: SvgDocument = parse_document(include_str!("fixtures/badge.svg")).unwrap();
    let tree = build_tree(&mut doc);

    // Every edit keyed off tree selectors must leave each selector
    // resolving to a node with the same tag as before.
    let mut all = Vec::new();
    flatten(&tree, &mut all);
    let expectations: Vec<(String, String)> = all
        .iter()
        .map(|n| (n.selector.clone(), n.tag_name.clone()))
        .collect();

    let sel = Selector::Id("badge".into());
    let text = mutate::apply_color(&mut doc, &sel, PaintProperty::Stroke, "#0f0f0f").unwrap();
    let mut rebuilt = parse_document(&text).unwrap();
    let _ = build_tree(&mut rebuilt);

    for (selector, tag) in expectations {
        let idx = resolver::resolve_str(&rebuilt, &selector)
            .unwrap_or_else(|| panic!("`{selector}` lost across edit cycle"));
        assert_eq!(rebuilt.element(idx).unwrap().tag.to_ascii_lowercase(), tag);
    }
}
