//! Email campaign builder for hostpanel.
//!
//! A campaign is a two-level document: ordered [`Section`]s (layout rows),
//! each holding ordered [`Element`]s (text, link, image, divider, spacer,
//! frame). Both levels carry a [`StyleMap`] of CSS properties.
//!
//! - [`CampaignBuilder`] edits the document and tracks the selection the
//!   properties panel works on
//! - [`StyleProperty`] and the option tables constrain style values
//! - [`render_html`] exports the document as nested tables, the layout
//!   email clients render reliably

mod builder;
mod error;
mod model;
pub mod options;
mod render;

pub use builder::{CampaignBuilder, Selection};
pub use error::{CampaignError, CampaignResult};
pub use model::{Campaign, Element, ElementKind, Section, StyleMap};
pub use options::{BrandGuide, PaletteColor, StyleProperty};
pub use render::render_html;
