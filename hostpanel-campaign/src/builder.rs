//! Campaign editing with a selection.
//!
//! Section indices stay contiguous `0..n`; element indices stay contiguous
//! `0..n` within each section. Every structural edit renumbers the level
//! it touched.

use crate::error::{CampaignError, CampaignResult};
use crate::model::{Campaign, Element, ElementKind, Section, StyleMap};
use crate::options::{BrandGuide, PaletteColor, StyleProperty};
use hostpanel_types::{ElementId, SectionId};
use tracing::debug;

/// What the properties panel is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Section(SectionId),
    Element(ElementId),
}

/// Editor state for one campaign.
#[derive(Debug, Clone, Default)]
pub struct CampaignBuilder {
    campaign: Campaign,
    active_section: Option<SectionId>,
    active_element: Option<ElementId>,
    brand: BrandGuide,
}

impl CampaignBuilder {
    pub fn new(subject: impl Into<String>) -> Self {
        Self::from_campaign(Campaign::new(subject))
    }

    /// Opens a stored campaign. Indices are normalized to display order.
    ///
    /// Elements whose section no longer exists are dropped.
    pub fn from_campaign(mut campaign: Campaign) -> Self {
        campaign.sections.sort_by_key(|s| s.index);
        let ids: Vec<SectionId> = campaign.sections.iter().map(|s| s.id).collect();
        campaign.elements.retain(|e| ids.contains(&e.section_id));
        let mut builder = Self {
            campaign,
            ..Self::default()
        };
        builder.renumber_sections();
        for id in ids {
            builder.renumber_elements(id);
        }
        builder
    }

    pub fn with_brand_guide(mut self, brand: BrandGuide) -> Self {
        self.brand = brand;
        self
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn into_campaign(self) -> Campaign {
        self.campaign
    }

    /// Color swatches for the picker.
    pub fn palette(&self) -> Vec<PaletteColor> {
        self.brand.palette()
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.campaign.subject = subject.into();
    }

    pub fn set_preheader(&mut self, preheader: Option<String>) {
        self.campaign.preheader = preheader;
    }

    // ---- sections ----

    /// Appends an empty section and selects it.
    pub fn add_section(&mut self) -> SectionId {
        let section = Section::new(self.campaign.sections.len());
        let id = section.id;
        self.campaign.sections.push(section);
        self.active_section = Some(id);
        self.active_element = None;
        debug!(%id, "campaign section added");
        id
    }

    /// Removes a section together with its elements.
    pub fn remove_section(&mut self, id: SectionId) -> CampaignResult<Section> {
        let pos = self.section_pos(id)?;
        let section = self.campaign.sections.remove(pos);
        self.campaign.elements.retain(|e| e.section_id != id);
        self.renumber_sections();
        if self.active_section == Some(id) {
            self.clear_selection();
        }
        debug!(%id, "campaign section removed");
        Ok(section)
    }

    /// Moves the section at display position `from` to `to`.
    pub fn move_section(&mut self, from: usize, to: usize) -> CampaignResult<()> {
        let len = self.campaign.sections.len();
        if from >= len || to >= len {
            return Err(CampaignError::MoveOutOfRange { from, to, len });
        }
        let section = self.campaign.sections.remove(from);
        self.campaign.sections.insert(to, section);
        self.renumber_sections();
        Ok(())
    }

    // ---- elements ----

    /// Appends an element of `kind` to a section and selects it.
    pub fn add_element(&mut self, section_id: SectionId, kind: ElementKind) -> CampaignResult<ElementId> {
        self.section_pos(section_id)?;
        let index = self.element_count(section_id);
        let element = Element::new(kind, section_id, index);
        let id = element.id;
        self.campaign.elements.push(element);
        self.select_element(id)?;
        debug!(%id, %kind, "campaign element added");
        Ok(id)
    }

    pub fn remove_element(&mut self, id: ElementId) -> CampaignResult<Element> {
        let pos = self.element_pos(id)?;
        let element = self.campaign.elements.remove(pos);
        self.renumber_elements(element.section_id);
        if self.active_element == Some(id) {
            self.active_element = None;
        }
        Ok(element)
    }

    /// Moves an element to position `to` of `section_id`, which may be
    /// its current section or another one.
    pub fn move_element(
        &mut self,
        id: ElementId,
        section_id: SectionId,
        to: usize,
    ) -> CampaignResult<()> {
        self.section_pos(section_id)?;
        let pos = self.element_pos(id)?;
        let source = self.campaign.elements[pos].section_id;
        let from = self.campaign.elements[pos].index;

        let mut order = self.ordered_element_ids(section_id);
        if source == section_id {
            order.retain(|e| *e != id);
        }
        if to > order.len() {
            return Err(CampaignError::MoveOutOfRange {
                from,
                to,
                len: order.len(),
            });
        }
        order.insert(to, id);

        self.campaign.elements[pos].section_id = section_id;
        for (index, element_id) in order.iter().enumerate() {
            if let Some(e) = self.campaign.elements.iter_mut().find(|e| e.id == *element_id) {
                e.index = index;
            }
        }
        if source != section_id {
            self.renumber_elements(source);
            if self.active_element == Some(id) {
                self.active_section = Some(section_id);
            }
        }
        Ok(())
    }

    /// Replaces the text of a text, link or frame element.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> CampaignResult<()> {
        let element = self.element_mut(id)?;
        if !element.kind.has_text() {
            return Err(CampaignError::WrongElementKind {
                kind: element.kind,
                action: "set text",
            });
        }
        element.text_content = Some(text.into());
        Ok(())
    }

    pub fn set_link(
        &mut self,
        id: ElementId,
        href: impl Into<String>,
        text: Option<String>,
    ) -> CampaignResult<()> {
        let element = self.element_mut(id)?;
        if element.kind != ElementKind::Link {
            return Err(CampaignError::WrongElementKind {
                kind: element.kind,
                action: "set a link",
            });
        }
        element.href = Some(href.into());
        if let Some(text) = text {
            element.text_content = Some(text);
        }
        Ok(())
    }

    pub fn set_image(
        &mut self,
        id: ElementId,
        src: impl Into<String>,
        alt_text: Option<String>,
        href: Option<String>,
    ) -> CampaignResult<()> {
        let element = self.element_mut(id)?;
        if element.kind != ElementKind::Image {
            return Err(CampaignError::WrongElementKind {
                kind: element.kind,
                action: "set an image",
            });
        }
        element.src = Some(src.into());
        element.alt_text = alt_text;
        element.href = href;
        Ok(())
    }

    // ---- selection ----

    pub fn selection(&self) -> Option<Selection> {
        match (self.active_element, self.active_section) {
            (Some(element), _) => Some(Selection::Element(element)),
            (None, Some(section)) => Some(Selection::Section(section)),
            (None, None) => None,
        }
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.active_section
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.active_element
    }

    /// Selects a section; any element selection is cleared.
    pub fn select_section(&mut self, id: SectionId) -> CampaignResult<()> {
        self.section_pos(id)?;
        self.active_section = Some(id);
        self.active_element = None;
        Ok(())
    }

    /// Selects an element and its section.
    pub fn select_element(&mut self, id: ElementId) -> CampaignResult<()> {
        let pos = self.element_pos(id)?;
        self.active_section = Some(self.campaign.elements[pos].section_id);
        self.active_element = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.active_section = None;
        self.active_element = None;
    }

    /// Styles of the selected element, or of the selected section.
    pub fn active_styles(&self) -> Option<&StyleMap> {
        match self.selection()? {
            Selection::Element(id) => self.campaign.element(id).map(|e| &e.styles),
            Selection::Section(id) => self.campaign.section(id).map(|s| &s.styles),
        }
    }

    /// Sets a style on the selection after checking it against the
    /// option tables.
    pub fn set_style(&mut self, property: &str, value: &str) -> CampaignResult<()> {
        let prop = StyleProperty::parse(property)
            .ok_or_else(|| CampaignError::UnknownStyleProperty(property.to_string()))?;
        let value = value.trim();
        if !prop.accepts(value) {
            return Err(CampaignError::InvalidStyleValue {
                property: prop.as_str().to_string(),
                value: value.to_string(),
            });
        }
        let styles = self.active_styles_mut()?;
        styles.insert(prop.as_str().to_string(), value.to_string());
        debug!(property = %prop, value, "campaign style set");
        Ok(())
    }

    pub fn remove_style(&mut self, property: &str) -> CampaignResult<Option<String>> {
        let prop = StyleProperty::parse(property)
            .ok_or_else(|| CampaignError::UnknownStyleProperty(property.to_string()))?;
        Ok(self.active_styles_mut()?.remove(prop.as_str()))
    }

    // ---- helpers ----

    fn active_styles_mut(&mut self) -> CampaignResult<&mut StyleMap> {
        match self.selection().ok_or(CampaignError::NoSelection)? {
            Selection::Element(id) => Ok(&mut self.element_mut(id)?.styles),
            Selection::Section(id) => {
                let pos = self.section_pos(id)?;
                Ok(&mut self.campaign.sections[pos].styles)
            }
        }
    }

    fn section_pos(&self, id: SectionId) -> CampaignResult<usize> {
        self.campaign
            .sections
            .iter()
            .position(|s| s.id == id)
            .ok_or(CampaignError::SectionNotFound(id))
    }

    fn element_pos(&self, id: ElementId) -> CampaignResult<usize> {
        self.campaign
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(CampaignError::ElementNotFound(id))
    }

    fn element_mut(&mut self, id: ElementId) -> CampaignResult<&mut Element> {
        self.campaign
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CampaignError::ElementNotFound(id))
    }

    fn element_count(&self, section_id: SectionId) -> usize {
        self.campaign
            .elements
            .iter()
            .filter(|e| e.section_id == section_id)
            .count()
    }

    fn ordered_element_ids(&self, section_id: SectionId) -> Vec<ElementId> {
        self.campaign
            .section_elements(section_id)
            .into_iter()
            .map(|e| e.id)
            .collect()
    }

    fn renumber_sections(&mut self) {
        for (index, section) in self.campaign.sections.iter_mut().enumerate() {
            section.index = index;
        }
    }

    fn renumber_elements(&mut self, section_id: SectionId) {
        for (index, id) in self.ordered_element_ids(section_id).into_iter().enumerate() {
            if let Some(e) = self.campaign.elements.iter_mut().find(|e| e.id == id) {
                e.index = index;
            }
        }
    }
}
