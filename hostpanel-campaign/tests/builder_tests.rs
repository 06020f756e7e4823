//! Tests for builder.rs and options.rs.

use hostpanel_campaign::{
    BrandGuide, Campaign, CampaignBuilder, CampaignError, ElementKind, PaletteColor, Selection,
    StyleProperty,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn section_indices(builder: &CampaignBuilder) -> Vec<usize> {
    builder
        .campaign()
        .ordered_sections()
        .iter()
        .map(|s| s.index)
        .collect()
}

fn element_kinds(builder: &CampaignBuilder, section: hostpanel_types::SectionId) -> Vec<ElementKind> {
    builder
        .campaign()
        .section_elements(section)
        .iter()
        .map(|e| e.kind)
        .collect()
}

fn assert_contiguous(campaign: &Campaign) {
    let sections = campaign.ordered_sections();
    for (i, s) in sections.iter().enumerate() {
        assert_eq!(s.index, i);
        for (j, e) in campaign.section_elements(s.id).iter().enumerate() {
            assert_eq!(e.index, j);
        }
    }
}

// ── Sections ────────────────────────────────────────────────────

#[test]
fn sections_are_appended_in_order_and_selected() {
    let mut b = CampaignBuilder::new("Launch");
    let first = b.add_section();
    let second = b.add_section();
    assert_eq!(section_indices(&b), [0, 1]);
    assert_eq!(b.selection(), Some(Selection::Section(second)));
    assert_ne!(first, second);
}

#[test]
fn removing_a_section_drops_its_elements_and_renumbers() {
    let mut b = CampaignBuilder::new("Launch");
    let a = b.add_section();
    let c = b.add_section();
    b.add_element(a, ElementKind::Text).unwrap();
    b.add_element(c, ElementKind::Image).unwrap();

    b.remove_section(a).unwrap();
    assert_eq!(b.campaign().sections.len(), 1);
    assert_eq!(b.campaign().sections[0].index, 0);
    assert_eq!(b.campaign().elements.len(), 1);
    assert!(matches!(
        b.remove_section(a),
        Err(CampaignError::SectionNotFound(_))
    ));
}

#[test]
fn moving_sections_reorders_indices() {
    let mut b = CampaignBuilder::new("Launch");
    let a = b.add_section();
    let c = b.add_section();
    let d = b.add_section();
    b.move_section(0, 2).unwrap();
    let order: Vec<_> = b.campaign().ordered_sections().iter().map(|s| s.id).collect();
    assert_eq!(order, [c, d, a]);
    assert!(matches!(
        b.move_section(0, 3),
        Err(CampaignError::MoveOutOfRange { len: 3, .. })
    ));
}

// ── Elements ────────────────────────────────────────────────────

#[test]
fn elements_get_defaults_and_selection() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    let id = b.add_element(s, ElementKind::Spacer).unwrap();
    assert_eq!(b.selection(), Some(Selection::Element(id)));
    assert_eq!(b.active_section(), Some(s));
    assert_eq!(
        b.active_styles().unwrap().get("height").map(String::as_str),
        Some("24px")
    );
}

#[test]
fn moving_an_element_within_a_section() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    b.add_element(s, ElementKind::Text).unwrap();
    b.add_element(s, ElementKind::Divider).unwrap();
    let img = b.add_element(s, ElementKind::Image).unwrap();

    b.move_element(img, s, 0).unwrap();
    assert_eq!(
        element_kinds(&b, s),
        [ElementKind::Image, ElementKind::Text, ElementKind::Divider]
    );
    assert_contiguous(b.campaign());
}

#[test]
fn moving_an_element_across_sections() {
    let mut b = CampaignBuilder::new("Launch");
    let top = b.add_section();
    let bottom = b.add_section();
    let text = b.add_element(top, ElementKind::Text).unwrap();
    b.add_element(top, ElementKind::Link).unwrap();
    b.add_element(bottom, ElementKind::Image).unwrap();

    b.select_element(text).unwrap();
    b.move_element(text, bottom, 1).unwrap();
    assert_eq!(element_kinds(&b, top), [ElementKind::Link]);
    assert_eq!(element_kinds(&b, bottom), [ElementKind::Image, ElementKind::Text]);
    assert_eq!(b.active_section(), Some(bottom));
    assert_contiguous(b.campaign());

    assert!(matches!(
        b.move_element(text, top, 5),
        Err(CampaignError::MoveOutOfRange { .. })
    ));
}

#[test]
fn removing_an_element_renumbers_its_section() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    let first = b.add_element(s, ElementKind::Text).unwrap();
    b.add_element(s, ElementKind::Text).unwrap();
    b.add_element(s, ElementKind::Text).unwrap();
    b.remove_element(first).unwrap();
    assert_contiguous(b.campaign());
    assert_eq!(b.campaign().section_elements(s).len(), 2);
}

#[test]
fn content_edits_check_element_kind() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    let link = b.add_element(s, ElementKind::Link).unwrap();
    let img = b.add_element(s, ElementKind::Image).unwrap();
    let spacer = b.add_element(s, ElementKind::Spacer).unwrap();

    b.set_link(link, "https://example.com", Some("Visit".into())).unwrap();
    b.set_image(img, "https://cdn/x.png", Some("Logo".into()), None).unwrap();
    let e = b.campaign().element(link).unwrap();
    assert_eq!(e.href.as_deref(), Some("https://example.com"));
    assert_eq!(e.text_content.as_deref(), Some("Visit"));

    assert!(matches!(
        b.set_text(spacer, "nope"),
        Err(CampaignError::WrongElementKind {
            kind: ElementKind::Spacer,
            ..
        })
    ));
    assert!(matches!(
        b.set_image(link, "x", None, None),
        Err(CampaignError::WrongElementKind { .. })
    ));
}

#[test]
fn opening_a_stored_campaign_normalizes_indices() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    b.add_element(s, ElementKind::Text).unwrap();
    b.add_element(s, ElementKind::Link).unwrap();
    let mut stored = b.into_campaign();
    stored.sections[0].index = 7;
    stored.elements[0].index = 10;
    stored.elements[1].index = 3;

    let reopened = CampaignBuilder::from_campaign(stored);
    assert_contiguous(reopened.campaign());
    assert_eq!(element_kinds(&reopened, s), [ElementKind::Link, ElementKind::Text]);
    assert_eq!(reopened.selection(), None);
}

// ── Styles ──────────────────────────────────────────────────────

#[test]
fn style_edits_apply_to_the_selection() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    let text = b.add_element(s, ElementKind::Text).unwrap();

    b.set_style("font-size", "24px").unwrap();
    assert_eq!(b.campaign().element(text).unwrap().styles["font-size"], "24px");

    b.select_section(s).unwrap();
    b.set_style("Background-Color", "#ffeecc").unwrap();
    assert_eq!(
        b.campaign().section(s).unwrap().styles["background-color"],
        "#ffeecc"
    );
    assert_eq!(b.remove_style("background-color").unwrap(), Some("#ffeecc".into()));
}

#[test]
fn style_values_must_come_from_the_option_tables() {
    let mut b = CampaignBuilder::new("Launch");
    let s = b.add_section();
    b.add_element(s, ElementKind::Text).unwrap();

    assert!(matches!(
        b.set_style("font-size", "13px"),
        Err(CampaignError::InvalidStyleValue { .. })
    ));
    assert!(matches!(
        b.set_style("color", "red"),
        Err(CampaignError::InvalidStyleValue { .. })
    ));
    assert!(matches!(
        b.set_style("z-index", "3"),
        Err(CampaignError::UnknownStyleProperty(_))
    ));

    b.clear_selection();
    assert!(matches!(
        b.set_style("font-size", "16px"),
        Err(CampaignError::NoSelection)
    ));
}

#[test]
fn style_property_acceptance() {
    assert!(StyleProperty::Color.accepts("#fff"));
    assert!(StyleProperty::Color.accepts("transparent"));
    assert!(!StyleProperty::Color.accepts("#ffff"));
    assert!(StyleProperty::Width.accepts("600px"));
    assert!(StyleProperty::Width.accepts("50%"));
    assert!(!StyleProperty::Width.accepts("wide"));
    assert!(StyleProperty::PaddingTop.accepts("16px"));
    assert!(!StyleProperty::PaddingTop.accepts("15px"));
    assert_eq!(StyleProperty::parse(" TEXT-ALIGN "), Some(StyleProperty::TextAlign));
}

#[test]
fn palette_lists_brand_colors_then_neutrals() {
    let brand = BrandGuide {
        primary_color: Some("#1A73E8".into()),
        accent_color: Some("not a color".into()),
        text_color: Some("#000000".into()),
        extra_colors: vec![PaletteColor {
            name: "Mint".into(),
            value: "#3eb489".into(),
        }],
        ..Default::default()
    };
    let b = CampaignBuilder::new("Launch").with_brand_guide(brand);
    let palette: Vec<_> = b
        .palette()
        .into_iter()
        .map(|c| (c.name, c.value))
        .collect();
    assert_eq!(
        palette,
        vec![
            ("Primary".to_string(), "#1a73e8".to_string()),
            ("Text".to_string(), "#000000".to_string()),
            ("Mint".to_string(), "#3eb489".to_string()),
            ("White".to_string(), "#ffffff".to_string()),
        ]
    );
}

// ── Ordering invariant ──────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    AddSection,
    AddElement(usize),
    RemoveSection(usize),
    RemoveElement(usize),
    MoveSection(usize, usize),
    MoveElement(usize, usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddSection),
        (0..4usize).prop_map(Op::AddElement),
        (0..4usize).prop_map(Op::RemoveSection),
        (0..8usize).prop_map(Op::RemoveElement),
        (0..4usize, 0..4usize).prop_map(|(a, b)| Op::MoveSection(a, b)),
        (0..8usize, 0..4usize, 0..4usize).prop_map(|(e, s, t)| Op::MoveElement(e, s, t)),
    ]
}

proptest! {
    #[test]
    fn indices_stay_contiguous(ops in proptest::collection::vec(op(), 0..40)) {
        let mut b = CampaignBuilder::new("Prop");
        for op in ops {
            let sections: Vec<_> = b.campaign().sections.iter().map(|s| s.id).collect();
            let elements: Vec<_> = b.campaign().elements.iter().map(|e| e.id).collect();
            // Out-of-range picks are skipped; errors are allowed.
            let _ = match op {
                Op::AddSection => { b.add_section(); Ok(()) }
                Op::AddElement(s) => match sections.get(s) {
                    Some(&id) => b.add_element(id, ElementKind::Text).map(|_| ()),
                    None => Ok(()),
                },
                Op::RemoveSection(s) => match sections.get(s) {
                    Some(&id) => b.remove_section(id).map(|_| ()),
                    None => Ok(()),
                },
                Op::RemoveElement(e) => match elements.get(e) {
                    Some(&id) => b.remove_element(id).map(|_| ()),
                    None => Ok(()),
                },
                Op::MoveSection(from, to) => b.move_section(from, to),
                Op::MoveElement(e, s, to) => match (elements.get(e), sections.get(s)) {
                    (Some(&id), Some(&section)) => b.move_element(id, section, to),
                    _ => Ok(()),
                },
            };
        }
        let campaign = b.campaign();
        let mut indices: Vec<_> = campaign.sections.iter().map(|s| s.index).collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..campaign.sections.len()).collect::<Vec<_>>());
        for s in &campaign.sections {
            let mut idx: Vec<_> = campaign
                .elements
                .iter()
                .filter(|e| e.section_id == s.id)
                .map(|e| e.index)
                .collect();
            idx.sort_unstable();
            prop_assert_eq!(idx.clone(), (0..idx.len()).collect::<Vec<_>>());
        }
        for e in &campaign.elements {
            prop_assert!(campaign.section(e.section_id).is_some());
        }
    }
}
