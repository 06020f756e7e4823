//! Core type definitions for hostpanel.
//!
//! This crate defines the identifier types shared by the content-modeling
//! and campaign crates:
//! - Field, Collection and Entry identifiers for the CMS
//! - Section and Element identifiers for the email campaign builder
//!
//! All identifiers are UUID v7 so that freshly created objects sort in
//! creation order.

mod ids;

pub use ids::{CollectionId, ElementId, EntryId, FieldId, SectionId};
