//! Tests for validate.rs: presence, per-rule messages and nested paths.

use hostpanel_entry::{is_present, validate_field, validate_record, FormRecord};
use hostpanel_schema::{FieldDefinition, FieldKind, NestedSchemaConfig, ValidationRules};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn price() -> FieldDefinition {
    FieldDefinition::new("Price", "price", FieldKind::Number).with_validation(ValidationRules {
        min_value: Some(0.0),
        max_value: Some(100.0),
        ..Default::default()
    })
}

fn title() -> FieldDefinition {
    FieldDefinition::new("Title", "title", FieldKind::ShortText)
        .required()
        .with_validation(ValidationRules {
            min_length: Some(3),
            max_length: Some(10),
            ..Default::default()
        })
}

fn record(value: Value) -> FormRecord {
    FormRecord::from_value(value).unwrap()
}

// ── is_present ──────────────────────────────────────────────────

#[test]
fn zero_and_false_are_present() {
    assert!(is_present(Some(&json!(0))));
    assert!(is_present(Some(&json!(false))));
    assert!(is_present(Some(&json!("x"))));
    assert!(is_present(Some(&json!([1]))));
}

#[test]
fn blank_and_empty_values_are_absent() {
    assert!(!is_present(None));
    assert!(!is_present(Some(&Value::Null)));
    assert!(!is_present(Some(&json!(""))));
    assert!(!is_present(Some(&json!("   "))));
    assert!(!is_present(Some(&json!([]))));
    assert!(!is_present(Some(&json!({}))));
}

// ── validate_field ──────────────────────────────────────────────

#[test]
fn number_above_max_reports_at_most() {
    assert_eq!(
        validate_field(&price(), Some(&json!(150))),
        Some("Price must be at most 100".to_string())
    );
}

#[test]
fn number_below_min_reports_at_least() {
    assert_eq!(
        validate_field(&price(), Some(&json!(-1))),
        Some("Price must be at least 0".to_string())
    );
}

#[test]
fn number_bounds_are_inclusive() {
    assert_eq!(validate_field(&price(), Some(&json!(0))), None);
    assert_eq!(validate_field(&price(), Some(&json!(100))), None);
}

#[test]
fn numeric_strings_are_checked_as_numbers() {
    assert_eq!(
        validate_field(&price(), Some(&json!("150"))),
        Some("Price must be at most 100".to_string())
    );
    assert_eq!(
        validate_field(&price(), Some(&json!("abc"))),
        Some("Price must be a number".to_string())
    );
}

#[test]
fn required_zero_passes() {
    let field = price().required();
    assert_eq!(validate_field(&field, Some(&json!(0))), None);
}

#[test]
fn required_false_passes() {
    let field = FieldDefinition::new(
        "Featured",
        "featured",
        FieldKind::empty(hostpanel_schema::FieldType::Boolean).unwrap(),
    )
    .required();
    assert_eq!(validate_field(&field, Some(&json!(false))), None);
}

#[test]
fn missing_required_value_wins_over_other_rules() {
    assert_eq!(
        validate_field(&title(), Some(&json!(" "))),
        Some("Title is required".to_string())
    );
}

#[test]
fn optional_empty_value_skips_rules() {
    let field = FieldDefinition::new("Subtitle", "subtitle", FieldKind::ShortText)
        .with_validation(ValidationRules {
            min_length: Some(5),
            ..Default::default()
        });
    assert_eq!(validate_field(&field, Some(&json!(""))), None);
    assert_eq!(validate_field(&field, None), None);
}

#[test]
fn length_rules_count_characters() {
    assert_eq!(
        validate_field(&title(), Some(&json!("ab"))),
        Some("Title must be at least 3 characters".to_string())
    );
    assert_eq!(
        validate_field(&title(), Some(&json!("abcdefghijk"))),
        Some("Title must be at most 10 characters".to_string())
    );
    // Three characters, more than three bytes.
    assert_eq!(validate_field(&title(), Some(&json!("héé"))), None);
}

#[test]
fn pattern_mismatch_reports_invalid_format() {
    let field = FieldDefinition::new("Code", "code", FieldKind::ShortText).with_validation(
        ValidationRules {
            pattern: Some("^[A-Z]{3}$".into()),
            ..Default::default()
        },
    );
    assert_eq!(validate_field(&field, Some(&json!("ABC"))), None);
    assert_eq!(
        validate_field(&field, Some(&json!("abc"))),
        Some("Code has an invalid format".to_string())
    );
}

#[test]
fn length_is_checked_before_pattern() {
    let field = FieldDefinition::new("Code", "code", FieldKind::ShortText).with_validation(
        ValidationRules {
            max_length: Some(2),
            pattern: Some("^[A-Z]+$".into()),
            ..Default::default()
        },
    );
    assert_eq!(
        validate_field(&field, Some(&json!("abc"))),
        Some("Code must be at most 2 characters".to_string())
    );
}

// ── validate_record ─────────────────────────────────────────────

#[test]
fn every_field_is_checked() {
    let fields = vec![title(), price()];
    let errors = validate_record(&fields, &record(json!({ "price": 150 })));
    assert_eq!(errors.len(), 2);
    assert_eq!(errors["title"], "Title is required");
    assert_eq!(errors["price"], "Price must be at most 100");
}

#[test]
fn valid_record_has_no_errors() {
    let fields = vec![title(), price()];
    let errors = validate_record(&fields, &record(json!({ "title": "Hello", "price": 5 })));
    assert!(errors.is_empty());
}

#[test]
fn nested_list_items_report_dotted_paths() {
    let links = FieldDefinition::new(
        "Links",
        "links",
        FieldKind::NestedSchema(NestedSchemaConfig {
            fields: vec![FieldDefinition::new("URL", "url", FieldKind::ShortText).required()],
            is_multiple: true,
        }),
    );
    let data = record(json!({ "links": [{ "url": "https://a" }, { "url": "" }] }));
    let errors = validate_record(&[links], &data);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["links.1.url"], "URL is required");
}

#[test]
fn nested_object_reports_dotted_paths() {
    let seo = FieldDefinition::new(
        "SEO",
        "seo",
        FieldKind::NestedSchema(NestedSchemaConfig {
            fields: vec![title()],
            is_multiple: false,
        }),
    );
    let data = record(json!({ "seo": { "title": "ab" } }));
    let errors = validate_record(&[seo], &data);
    assert_eq!(errors["seo.title"], "Title must be at least 3 characters");
}
