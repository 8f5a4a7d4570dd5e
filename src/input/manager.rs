//! Input manager: where raw career details come from

use crate::error::{FastCvError, Result};
use crate::input::file_detector::{FileType, SUPPORTED_EXTENSIONS};
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// A source of pasted or uploaded career details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    File(PathBuf),
    Text(String),
    Stdin,
}

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn read(&mut self, input: &RawInput) -> Result<String> {
        match input {
            RawInput::File(path) => self.extract_text(path).await,
            RawInput::Text(text) => Ok(text.clone()),
            RawInput::Stdin => {
                info!("Reading career details from stdin");
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                Ok(text)
            }
        }
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(FastCvError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(FastCvError::UnsupportedFormat(format!(
                    "{} (supported: {})",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        if text.trim().is_empty() {
            return Err(FastCvError::InvalidInput(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
