//! Template management module.
//!
//! Provides the template model and storage. Historical `variables` encodings
//! are folded into the canonical list at the repository boundary, so every
//! consumer of a [`Template`] sees one shape.

mod model;
mod repository;

pub(crate) use repository::ensure_schema;

pub use model::{Template, TemplateId};
pub use repository::TemplateRepository;
