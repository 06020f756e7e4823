use hostpanel_types::{CollectionId, ElementId, EntryId, FieldId, SectionId};
use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;

// ── FieldId ───────────────────────────────────────────────────────

#[test]
fn field_id_new_is_unique() {
    let a = FieldId::new();
    let b = FieldId::new();
    assert_ne!(a, b);
}

#[test]
fn field_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = FieldId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn field_id_display_and_parse() {
    let id = FieldId::new();
    let parsed = FieldId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn field_id_parse_invalid() {
    assert!(FieldId::parse("not-a-uuid").is_err());
    assert!(FieldId::from_str("garbage").is_err());
}

#[test]
fn field_id_serializes_as_plain_string() {
    let id = FieldId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: FieldId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// ── Ordering ──────────────────────────────────────────────────────

#[test]
fn ids_are_time_ordered() {
    let first = EntryId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = EntryId::new();
    assert!(first < second);
}

#[test]
fn ids_are_hashable() {
    let mut set = HashSet::new();
    let id = SectionId::new();
    set.insert(id);
    set.insert(id);
    set.insert(SectionId::new());
    assert_eq!(set.len(), 2);
}

// ── Other id kinds ────────────────────────────────────────────────

#[test]
fn every_id_kind_parses_its_own_display() {
    let c = CollectionId::new();
    let e = EntryId::new();
    let s = SectionId::new();
    let el = ElementId::new();
    assert_eq!(CollectionId::from_str(&c.to_string()).unwrap(), c);
    assert_eq!(EntryId::from_str(&e.to_string()).unwrap(), e);
    assert_eq!(SectionId::from_str(&s.to_string()).unwrap(), s);
    assert_eq!(ElementId::from_str(&el.to_string()).unwrap(), el);
}

proptest! {
    #[test]
    fn any_uuid_survives_display_parse(bits in any::<u128>()) {
        let id = ElementId::from_uuid(uuid::Uuid::from_u128(bits));
        prop_assert_eq!(ElementId::parse(&id.to_string()).unwrap(), id);
    }
}
