//! Direct editing of the active resume document

pub mod path;
pub mod document;

pub use document::{read_text, DocumentEditor};
pub use path::{EducationField, ExperienceField, FieldPath, ListPath};
