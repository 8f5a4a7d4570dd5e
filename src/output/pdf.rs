//! Direct PDF export laid out on A4 pages with the builtin Helvetica fonts

use crate::config::OutputFormat;
use crate::error::{FastCvError, Result};
use crate::output::formatter::{effective_view, ResumeFormatter};
use crate::profile::types::{ResumeProfile, View};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use unicode_segmentation::UnicodeSegmentation;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph width as a fraction of the font size
const AVG_GLYPH_EM: f32 = 0.5;

pub struct PdfFormatter;

impl PdfFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResumeFormatter for PdfFormatter {
    fn format_resume(&self, profile: &ResumeProfile, view: View) -> Result<Vec<u8>> {
        let view = effective_view(profile, view);
        let title = match view {
            View::Resume => format!("{} - Resume", profile.display_name()),
            View::CoverLetter => format!("{} - Cover Letter", profile.display_name()),
        };
        let mut writer = PageWriter::new(&title)?;

        writer.paragraph(&profile.display_name().to_uppercase(), 20.0, Style::Bold, 0.0);
        let contacts = profile.contact_line().join("  |  ");
        if !contacts.is_empty() {
            writer.paragraph(&contacts, 9.5, Style::Regular, 0.0);
        }
        writer.gap(4.0);

        match view {
            View::CoverLetter => {
                let letter = profile.cover_letter.as_deref().unwrap_or_default();
                for paragraph in letter.trim().split('\n') {
                    if paragraph.trim().is_empty() {
                        writer.gap(3.0);
                    } else {
                        writer.paragraph(paragraph.trim(), 11.0, Style::Regular, 0.0);
                    }
                }
            }
            View::Resume => write_resume(&mut writer, profile),
        }

        writer.finish()
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }
}

fn write_resume(writer: &mut PageWriter, profile: &ResumeProfile) {
    if !profile.summary.trim().is_empty() {
        writer.paragraph(profile.summary.trim(), 10.5, Style::Regular, 0.0);
    }

    if !profile.experience.is_empty() {
        writer.heading("EXPERIENCE");
        for exp in &profile.experience {
            writer.keep_together(14.0);
            writer.paragraph(&exp.role, 12.0, Style::Bold, 0.0);
            let period = exp.period();
            let company = if period.is_empty() {
                exp.company.clone()
            } else {
                format!("{}  ({})", exp.company, period)
            };
            writer.paragraph(&company, 10.0, Style::Italic, 0.0);
            for bullet in &exp.description {
                writer.bullet(bullet, 10.0);
            }
            writer.gap(2.5);
        }
    }

    if !profile.skills.is_empty() {
        writer.heading("SKILLS");
        writer.paragraph(&profile.skills.join("  ·  "), 10.0, Style::Regular, 0.0);
    }

    if !profile.education.is_empty() {
        writer.heading("EDUCATION");
        for edu in &profile.education {
            writer.keep_together(10.0);
            writer.paragraph(&edu.degree, 10.5, Style::Bold, 0.0);
            let detail = [edu.institution.trim(), edu.year.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !detail.is_empty() {
                writer.paragraph(&detail, 10.0, Style::Regular, 0.0);
            }
            writer.gap(1.5);
        }
    }
}

#[derive(Clone, Copy)]
enum Style {
    Regular,
    Bold,
    Italic,
}

/// Keeps a cursor on the current page and starts a new page when it runs out
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    cursor: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            cursor: PAGE_HEIGHT - MARGIN,
        })
    }

    fn font(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Regular => &self.regular,
            Style::Bold => &self.bold,
            Style::Italic => &self.italic,
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn keep_together(&mut self, height: f32) {
        if self.cursor - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.cursor -= height;
    }

    /// One unwrapped line at `indent` mm from the left margin
    fn line(&mut self, text: &str, size: f32, style: Style, indent: f32) {
        let height = size * PT_TO_MM * 1.45;
        self.keep_together(height);
        self.cursor -= height;
        let text = to_win_ansi(text);
        self.layer.use_text(
            text,
            size,
            Mm(MARGIN + indent),
            Mm(self.cursor),
            self.font(style),
        );
    }

    fn paragraph(&mut self, text: &str, size: f32, style: Style, indent: f32) {
        for line in wrap(text, chars_per_line(size, indent)) {
            self.line(&line, size, style, indent);
        }
    }

    fn bullet(&mut self, text: &str, size: f32) {
        let mut lines = wrap(text, chars_per_line(size, 5.0)).into_iter();
        if let Some(first) = lines.next() {
            self.line(&format!("-  {}", first), size, Style::Regular, 1.5);
        }
        for rest in lines {
            self.line(&rest, size, Style::Regular, 5.0);
        }
    }

    fn heading(&mut self, title: &str) {
        self.gap(3.0);
        self.keep_together(16.0);
        self.line(title, 11.0, Style::Bold, 0.0);
        self.gap(1.5);
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn pdf_error(e: printpdf::Error) -> FastCvError {
    FastCvError::OutputFormatting(format!("PDF generation failed: {}", e))
}

fn chars_per_line(size: f32, indent: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;
    let glyph = size * PT_TO_MM * AVG_GLYPH_EM;
    ((usable / glyph) as usize).max(10)
}

/// Greedy word wrap counting graphemes; words longer than a line are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let graphemes: Vec<&str> = word.graphemes(true).collect();
        for chunk in graphemes.chunks(width) {
            let chunk_len = chunk.len();
            let needed = if current_len == 0 { chunk_len } else { current_len + 1 + chunk_len };
            if needed > width && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&chunk.concat());
            current_len += chunk_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The builtin fonts only cover WinAnsi; map common typography and drop the rest
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            '\u{00A0}' => ' ',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::{Education, Experience};

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(lines.iter().all(|l| l.graphemes(true).count() <= 10));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("abcdefghijkl", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
        assert!(wrap("   ", 5).is_empty());
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(to_win_ansi("“Led” – café • 漢"), "\"Led\" - café - ?");
    }

    #[test]
    fn test_pdf_bytes() {
        let profile = ResumeProfile {
            full_name: "Jane Doe".into(),
            summary: "Builds things. ".repeat(60),
            experience: (0..30)
                .map(|i| Experience {
                    company: format!("Company {}", i),
                    role: "Engineer".into(),
                    description: vec!["Shipped features".into(); 3],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let bytes = PdfFormatter::new().format_resume(&profile, View::Resume).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_titles_wrap_onto_more_lines() {
        let height_used = |role: &str, company: &str| {
            let profile = ResumeProfile {
                experience: vec![Experience {
                    role: role.into(),
                    company: company.into(),
                    ..Default::default()
                }],
                education: vec![Education {
                    degree: role.into(),
                    institution: company.into(),
                    ..Default::default()
                }],
                ..Default::default()
            };
            let mut writer = PageWriter::new("Layout").unwrap();
            let start = writer.cursor;
            write_resume(&mut writer, &profile);
            start - writer.cursor
        };

        let long_role = "Principal Staff Software Engineer, Distributed Storage, Streaming Ingestion and Developer Productivity Platforms for the Europe and Asia Pacific Regions";
        let long_company = "The Extremely Long Named International Consolidated Holdings Group of Engineering Companies Limited Partnership";
        assert!(height_used(long_role, long_company) > height_used("Engineer", "Acme"));
    }
}
