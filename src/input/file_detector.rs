//! File type detection for uploaded career details

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" | "text" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert_eq!(FileType::from_path(Path::new("cv.PDF")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("notes.markdown")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("linkedin.txt")), FileType::Text);
        assert_eq!(FileType::from_path(Path::new("resume.docx")), FileType::Unknown);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Unknown);
    }
}
