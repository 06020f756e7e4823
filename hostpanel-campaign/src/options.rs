//! Style option tables and the brand palette.
//!
//! The properties panel only offers values from these tables. Color
//! properties take a hex color (usually picked from the brand palette) or
//! `transparent`; width and height take a pixel or percent length.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const FONT_FAMILIES: &[&str] = &[
    "Arial, sans-serif",
    "Helvetica, sans-serif",
    "Verdana, sans-serif",
    "Tahoma, sans-serif",
    "Trebuchet MS, sans-serif",
    "Georgia, serif",
    "Times New Roman, serif",
    "Courier New, monospace",
];

pub const FONT_SIZES: &[&str] = &[
    "10px", "12px", "14px", "16px", "18px", "20px", "24px", "28px", "32px", "36px", "48px",
];

pub const FONT_WEIGHTS: &[&str] = &["normal", "bold", "300", "400", "500", "600", "700"];

pub const ALIGNMENTS: &[&str] = &["left", "center", "right"];

pub const BORDER_RADIUS_STEPS: &[&str] = &["0px", "2px", "4px", "6px", "8px", "12px", "16px", "24px"];

pub const BORDER_WIDTHS: &[&str] = &["0px", "1px", "2px", "3px", "4px"];

pub const SPACING_STEPS: &[&str] = &[
    "0px", "4px", "8px", "12px", "16px", "20px", "24px", "32px", "40px", "48px", "64px",
];

pub const LINE_HEIGHTS: &[&str] = &["1", "1.25", "1.5", "1.75", "2"];

static HEX_COLOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok());

static LENGTH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{1,4}(?:\.\d+)?(?:px|%)$").ok());

/// Style properties the builder can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleProperty {
    FontFamily,
    FontSize,
    FontWeight,
    LineHeight,
    TextAlign,
    Color,
    BackgroundColor,
    BorderColor,
    BorderWidth,
    BorderRadius,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    Width,
    Height,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 16] = [
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::FontWeight,
        StyleProperty::LineHeight,
        StyleProperty::TextAlign,
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
        StyleProperty::BorderColor,
        StyleProperty::BorderWidth,
        StyleProperty::BorderRadius,
        StyleProperty::PaddingTop,
        StyleProperty::PaddingRight,
        StyleProperty::PaddingBottom,
        StyleProperty::PaddingLeft,
        StyleProperty::Width,
        StyleProperty::Height,
    ];

    /// The CSS property name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StyleProperty::FontFamily => "font-family",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::LineHeight => "line-height",
            StyleProperty::TextAlign => "text-align",
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::BorderColor => "border-color",
            StyleProperty::BorderWidth => "border-width",
            StyleProperty::BorderRadius => "border-radius",
            StyleProperty::PaddingTop => "padding-top",
            StyleProperty::PaddingRight => "padding-right",
            StyleProperty::PaddingBottom => "padding-bottom",
            StyleProperty::PaddingLeft => "padding-left",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// The fixed choices for this property, or `None` for colors and
    /// free lengths.
    pub const fn options(&self) -> Option<&'static [&'static str]> {
        match self {
            StyleProperty::FontFamily => Some(FONT_FAMILIES),
            StyleProperty::FontSize => Some(FONT_SIZES),
            StyleProperty::FontWeight => Some(FONT_WEIGHTS),
            StyleProperty::LineHeight => Some(LINE_HEIGHTS),
            StyleProperty::TextAlign => Some(ALIGNMENTS),
            StyleProperty::BorderWidth => Some(BORDER_WIDTHS),
            StyleProperty::BorderRadius => Some(BORDER_RADIUS_STEPS),
            StyleProperty::PaddingTop
            | StyleProperty::PaddingRight
            | StyleProperty::PaddingBottom
            | StyleProperty::PaddingLeft => Some(SPACING_STEPS),
            StyleProperty::Color
            | StyleProperty::BackgroundColor
            | StyleProperty::BorderColor
            | StyleProperty::Width
            | StyleProperty::Height => None,
        }
    }

    pub const fn is_color(&self) -> bool {
        matches!(
            self,
            StyleProperty::Color | StyleProperty::BackgroundColor | StyleProperty::BorderColor
        )
    }

    /// Whether `value` is acceptable for this property.
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        if let Some(options) = self.options() {
            return options.contains(&value);
        }
        if self.is_color() {
            return value == "transparent" || is_hex_color(value);
        }
        (*LENGTH).as_ref().is_some_and(|re| re.is_match(value))
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true for `#rgb` and `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    (*HEX_COLOR).as_ref().is_some_and(|re| re.is_match(value))
}

/// One swatch of the color picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub value: String,
}

/// An organization's brand colors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandGuide {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    /// Additional named brand colors.
    #[serde(default)]
    pub extra_colors: Vec<PaletteColor>,
}

impl BrandGuide {
    /// Brand swatches followed by black and white.
    ///
    /// Invalid hex values are skipped and each color appears once, under
    /// the first name that used it.
    pub fn palette(&self) -> Vec<PaletteColor> {
        let named = [
            ("Primary", &self.primary_color),
            ("Secondary", &self.secondary_color),
            ("Accent", &self.accent_color),
            ("Text", &self.text_color),
            ("Background", &self.background_color),
        ];
        let brand = named
            .into_iter()
            .filter_map(|(name, value)| {
                value.as_ref().map(|v| PaletteColor {
                    name: name.to_string(),
                    value: v.clone(),
                })
            })
            .chain(self.extra_colors.iter().cloned());
        let neutrals = [("Black", "#000000"), ("White", "#ffffff")]
            .into_iter()
            .map(|(name, value)| PaletteColor {
                name: name.to_string(),
                value: value.to_string(),
            });

        let mut palette: Vec<PaletteColor> = Vec::new();
        for color in brand.chain(neutrals) {
            let value = color.value.trim().to_ascii_lowercase();
            if !is_hex_color(&value) || palette.iter().any(|c| c.value == value) {
                continue;
            }
            palette.push(PaletteColor {
                name: color.name,
                value,
            });
        }
        palette
    }
}
