//! HTML export.
//!
//! Email clients ignore most of CSS layout, so the document is emitted as
//! nested `<table>` markup with inline styles: one outer table, one row per
//! section holding its own table, one row per element. Text and frame
//! content is authored HTML and is injected as-is; every attribute value
//! is escaped.

use crate::model::{Campaign, Element, ElementKind, StyleMap};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// Properties that lay out the wrapping cell rather than style the content.
const CELL_PROPERTIES: &[&str] = &[
    "text-align",
    "background-color",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

const TABLE_ATTRS: &str =
    r#"role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0""#;

/// Renders a campaign to a complete HTML document.
pub fn render_html(campaign: &Campaign) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str(r#"<meta charset="utf-8">"#);
    out.push('\n');
    out.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
    out.push('\n');
    let _ = writeln!(out, "<title>{}</title>", encode_text(&campaign.subject));
    out.push_str("</head>\n<body style=\"margin:0;padding:0;\">\n");
    if let Some(preheader) = campaign.preheader.as_deref().filter(|p| !p.is_empty()) {
        let _ = writeln!(
            out,
            r#"<div style="display:none;max-height:0;overflow:hidden;">{}</div>"#,
            encode_text(preheader)
        );
    }

    let _ = writeln!(out, "<table {TABLE_ATTRS}>");
    for section in campaign.ordered_sections() {
        let _ = writeln!(out, "<tr><td{}>", style_attr(&section.styles));
        let _ = writeln!(out, "<table {TABLE_ATTRS}>");
        for element in campaign.section_elements(section.id) {
            render_element(&mut out, element);
        }
        out.push_str("</table>\n</td></tr>\n");
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn render_element(out: &mut String, element: &Element) {
    let text = element.text_content.as_deref().unwrap_or_default();
    match element.kind {
        ElementKind::Text => {
            let _ = writeln!(out, "<tr><td{}>{text}</td></tr>", style_attr(&element.styles));
        }
        ElementKind::Link => {
            let (cell, inner) = split_styles(&element.styles);
            let _ = writeln!(
                out,
                r#"<tr><td{}><a href="{}" target="_blank"{}>{}</a></td></tr>"#,
                style_attr(&cell),
                encode_double_quoted_attribute(element.href.as_deref().unwrap_or("#")),
                style_attr(&with(inner, "text-decoration", "underline")),
                encode_text(text),
            );
        }
        ElementKind::Image => {
            let (cell, inner) = split_styles(&element.styles);
            let width = inner.get("width").map_or("100%", String::as_str);
            let img = format!(
                r#"<img src="{}" alt="{}" width="{}"{}>"#,
                encode_double_quoted_attribute(element.src.as_deref().unwrap_or_default()),
                encode_double_quoted_attribute(element.alt_text.as_deref().unwrap_or_default()),
                encode_double_quoted_attribute(width.trim_end_matches("px")),
                style_attr(&with(inner.clone(), "display", "block")),
            );
            let content = match element.href.as_deref() {
                Some(href) => format!(
                    r#"<a href="{}" target="_blank">{img}</a>"#,
                    encode_double_quoted_attribute(href)
                ),
                None => img,
            };
            let _ = writeln!(out, "<tr><td{}>{content}</td></tr>", style_attr(&cell));
        }
        ElementKind::Divider => {
            let (cell, inner) = split_styles(&element.styles);
            let width = inner.get("border-width").map_or("1px", String::as_str);
            let color = inner.get("border-color").map_or("#e5e7eb", String::as_str);
            let rule = StyleMap::from([
                ("border-top".to_string(), format!("{width} solid {color}")),
                ("font-size".to_string(), "0".to_string()),
                ("line-height".to_string(), "0".to_string()),
            ]);
            let _ = writeln!(
                out,
                "<tr><td{}><table {TABLE_ATTRS}><tr><td{}>&nbsp;</td></tr></table></td></tr>",
                style_attr(&cell),
                style_attr(&rule),
            );
        }
        ElementKind::Spacer => {
            let height = element.styles.get("height").map_or("24px", String::as_str);
            let cell = StyleMap::from([
                ("height".to_string(), height.to_string()),
                ("font-size".to_string(), "0".to_string()),
                ("line-height".to_string(), "0".to_string()),
            ]);
            let _ = writeln!(out, "<tr><td{}>&nbsp;</td></tr>", style_attr(&cell));
        }
        ElementKind::Frame => {
            let mut frame = element.styles.clone();
            let width = frame.remove("border-width");
            let color = frame.remove("border-color");
            if let (Some(width), Some(color)) = (width, color) {
                frame.insert("border".to_string(), format!("{width} solid {color}"));
            }
            let _ = writeln!(
                out,
                "<tr><td><table {TABLE_ATTRS}><tr><td{}>{text}</td></tr></table></td></tr>",
                style_attr(&frame),
            );
        }
    }
}

/// Splits styles into cell layout properties and content properties.
fn split_styles(styles: &StyleMap) -> (StyleMap, StyleMap) {
    styles
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| CELL_PROPERTIES.contains(&k.as_str()))
}

fn with(mut styles: StyleMap, property: &str, value: &str) -> StyleMap {
    styles
        .entry(property.to_string())
        .or_insert_with(|| value.to_string());
    styles
}

/// ` style="k:v;k:v;"`, or nothing for an empty map.
fn style_attr(styles: &StyleMap) -> String {
    if styles.is_empty() {
        return String::new();
    }
    let css: String = styles.iter().map(|(k, v)| format!("{k}:{v};")).collect();
    format!(r#" style="{}""#, encode_double_quoted_attribute(&css))
}
