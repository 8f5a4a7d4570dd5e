//! Text extraction from uploaded files

use crate::error::{FastCvError, Result};
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            FastCvError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(normalize_whitespace(&text))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(normalize_whitespace(&content))
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown))
    }
}

/// Render markdown to plain text, keeping list items on their own lines
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(chunk) | Event::Code(chunk) => text.push_str(&chunk),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item) => text.push('\n'),
            _ => {}
        }
    }
    normalize_whitespace(&text)
}

/// Collapse runs of spaces and blank lines left behind by extraction
pub fn normalize_whitespace(text: &str) -> String {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    let spaces = SPACES.get_or_init(|| Regex::new(r"[ \t\x{A0}]+").expect("valid regex"));
    let blank_lines = BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid regex"));

    let text = text.replace("\r\n", "\n");
    let collapsed = spaces.replace_all(&text, " ");
    let lines: Vec<&str> = collapsed.lines().map(str::trim).collect();
    blank_lines.replace_all(&lines.join("\n"), "\n\n").trim().to_string()
}
