//! Raw career details: file type detection, text extraction and input sources

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use manager::{InputManager, RawInput};
