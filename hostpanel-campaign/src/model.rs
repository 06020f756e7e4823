use hostpanel_types::{ElementId, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// CSS property name → value, e.g. `"padding-top" → "16px"`.
pub type StyleMap = BTreeMap<String, String>;

/// Content unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Link,
    Image,
    Divider,
    Spacer,
    /// Bordered box with its own nested table around rich text.
    Frame,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Text,
        ElementKind::Link,
        ElementKind::Image,
        ElementKind::Divider,
        ElementKind::Spacer,
        ElementKind::Frame,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Link => "link",
            ElementKind::Image => "image",
            ElementKind::Divider => "divider",
            ElementKind::Spacer => "spacer",
            ElementKind::Frame => "frame",
        }
    }

    /// Whether the element carries editable text.
    pub const fn has_text(&self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::Link | ElementKind::Frame)
    }

    /// Styles a freshly added element starts with.
    pub fn default_styles(&self) -> StyleMap {
        let pairs: &[(&str, &str)] = match self {
            ElementKind::Text => &[
                ("font-family", "Arial, sans-serif"),
                ("font-size", "16px"),
                ("color", "#333333"),
                ("text-align", "left"),
                ("padding-top", "8px"),
                ("padding-bottom", "8px"),
            ],
            ElementKind::Link => &[
                ("font-family", "Arial, sans-serif"),
                ("font-size", "16px"),
                ("color", "#1a73e8"),
                ("text-align", "left"),
            ],
            ElementKind::Image => &[("width", "100%"), ("text-align", "center")],
            ElementKind::Divider => &[
                ("border-width", "1px"),
                ("border-color", "#e5e7eb"),
                ("padding-top", "8px"),
                ("padding-bottom", "8px"),
            ],
            ElementKind::Spacer => &[("height", "24px")],
            ElementKind::Frame => &[
                ("border-width", "1px"),
                ("border-color", "#e5e7eb"),
                ("border-radius", "4px"),
                ("padding-top", "16px"),
                ("padding-right", "16px"),
                ("padding-bottom", "16px"),
                ("padding-left", "16px"),
            ],
        };
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layout row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub index: usize,
    #[serde(default)]
    pub styles: StyleMap,
}

impl Section {
    pub fn new(index: usize) -> Self {
        Self {
            id: SectionId::new(),
            index,
            styles: StyleMap::new(),
        }
    }
}

/// A content unit inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub styles: StyleMap,
    pub section_id: SectionId,
}

impl Element {
    /// A new element of `kind` with that kind's default styles.
    pub fn new(kind: ElementKind, section_id: SectionId, index: usize) -> Self {
        let text_content = match kind {
            ElementKind::Text | ElementKind::Frame => Some("Add your text here".to_string()),
            ElementKind::Link => Some("Click here".to_string()),
            _ => None,
        };
        Self {
            id: ElementId::new(),
            index,
            kind,
            text_content,
            src: None,
            href: None,
            alt_text: None,
            styles: kind.default_styles(),
            section_id,
        }
    }
}

/// A complete campaign document.
///
/// Sections and elements are stored flat, as persisted; order comes from
/// each object's `index`, elements are grouped by `section_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub subject: String,
    /// Preview text shown by inboxes next to the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Campaign {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sections sorted by index.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.index);
        sections
    }

    /// Elements of one section sorted by index.
    pub fn section_elements(&self, section_id: SectionId) -> Vec<&Element> {
        let mut elements: Vec<_> = self
            .elements
            .iter()
            .filter(|e| e.section_id == section_id)
            .collect();
        elements.sort_by_key(|e| e.index);
        elements
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Parses a campaign from its persisted JSON.
    pub fn from_json(json: &str) -> crate::CampaignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
