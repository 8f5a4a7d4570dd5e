//! Export formatters for the active resume and cover letter

use crate::config::OutputFormat;
use crate::error::{FastCvError, Result};
use crate::output::pdf::PdfFormatter;
use crate::profile::types::{Education, ResumeProfile, View};
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering a resume document in one output format
pub trait ResumeFormatter {
    fn format_resume(&self, profile: &ResumeProfile, view: View) -> Result<Vec<u8>>;
    fn supports_format(&self) -> OutputFormat;
}

/// The cover letter view is only available once a letter exists
pub fn effective_view(profile: &ResumeProfile, view: View) -> View {
    match view {
        View::CoverLetter if profile.has_cover_letter() => View::CoverLetter,
        _ => View::Resume,
    }
}

/// Colored terminal preview
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// Full profile data, for re-import or other tools
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

/// Print-ready HTML page; the browser's print dialog turns it into a PDF
pub struct HtmlFormatter {
    include_styles: bool,
}

/// Coordinates the individual formatters
pub struct ExportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
    pdf_formatter: PdfFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    {% if include_styles %}
    <style>
        @page { size: A4; margin: 15mm; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            color: #1e293b;
            background: #f1f5f9;
            margin: 0;
        }
        .page {
            background: white;
            max-width: 21cm;
            min-height: 29.7cm;
            margin: 24px auto;
            padding: 48px;
            box-sizing: border-box;
            box-shadow: 0 10px 30px rgba(15, 23, 42, 0.12);
        }
        header { border-bottom: 2px solid #1e293b; padding-bottom: 20px; margin-bottom: 24px; }
        h1 { font-size: 30px; text-transform: uppercase; letter-spacing: 0.08em; margin: 0 0 10px; }
        .contact { font-size: 13px; color: #475569; }
        .contact span + span::before { content: "\00B7"; margin: 0 8px; }
        h2 {
            font-size: 13px;
            text-transform: uppercase;
            letter-spacing: 0.12em;
            color: #0f766e;
            border-bottom: 1px solid #e2e8f0;
            padding-bottom: 4px;
            margin: 24px 0 12px;
        }
        .summary { line-height: 1.6; }
        .job { margin-bottom: 16px; page-break-inside: avoid; }
        .job-head { display: flex; justify-content: space-between; align-items: baseline; }
        .job-head h3 { font-size: 16px; margin: 0; }
        .period { font-size: 12px; color: #64748b; white-space: nowrap; }
        .company { font-weight: 600; color: #0f766e; font-size: 14px; margin: 2px 0 6px; }
        ul { margin: 0; padding-left: 18px; }
        li { line-height: 1.5; font-size: 14px; margin-bottom: 3px; }
        .columns { display: grid; grid-template-columns: 1fr 1fr; gap: 32px; }
        .skills span {
            display: inline-block;
            background: #f1f5f9;
            border: 1px solid #e2e8f0;
            border-radius: 4px;
            padding: 3px 8px;
            margin: 0 6px 6px 0;
            font-size: 13px;
        }
        .degree { font-weight: 600; margin: 0; font-size: 14px; }
        .institution, .year { font-size: 13px; color: #475569; }
        .letter { font-family: Georgia, 'Times New Roman', serif; line-height: 1.9; white-space: pre-wrap; }
        @media print {
            body { background: none; }
            .page { box-shadow: none; margin: 0; padding: 0; max-width: none; min-height: 0; }
        }
    </style>
    {% endif %}
</head>
<body>
    <div class="page">
        <header>
            <h1>{{ name }}</h1>
            <div class="contact">{% for item in contacts %}<span>{{ item }}</span>{% endfor %}</div>
        </header>
        {% if let Some(letter) = cover_letter %}
        <div class="letter">{{ letter }}</div>
        {% else %}
        {% if !summary.is_empty() %}
        <section><p class="summary">{{ summary }}</p></section>
        {% endif %}
        {% if !experience.is_empty() %}
        <section>
            <h2>Experience</h2>
            {% for job in experience %}
            <div class="job">
                <div class="job-head"><h3>{{ job.role }}</h3><span class="period">{{ job.period }}</span></div>
                <div class="company">{{ job.company }}</div>
                <ul>
                    {% for bullet in job.bullets %}<li>{{ bullet }}</li>{% endfor %}
                </ul>
            </div>
            {% endfor %}
        </section>
        {% endif %}
        <div class="columns">
            {% if !skills.is_empty() %}
            <section class="skills">
                <h2>Skills</h2>
                {% for skill in skills %}<span>{{ skill }}</span>{% endfor %}
            </section>
            {% endif %}
            {% if !education.is_empty() %}
            <section>
                <h2>Education</h2>
                {% for edu in education %}
                <p class="degree">{{ edu.degree }}</p>
                <div class="institution">{{ edu.institution }}</div>
                <div class="year">{{ edu.year }}</div>
                {% endfor %}
            </section>
            {% endif %}
        </div>
        {% endif %}
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate<'a> {
    include_styles: bool,
    title: String,
    name: &'a str,
    contacts: Vec<&'a str>,
    summary: &'a str,
    experience: Vec<HtmlExperience<'a>>,
    skills: &'a [String],
    education: &'a [Education],
    cover_letter: Option<&'a str>,
}

struct HtmlExperience<'a> {
    role: &'a str,
    company: &'a str,
    period: String,
    bullets: &'a [String],
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "▓".color(Color::Green).bold(), title.color(Color::Green).bold())
        } else {
            format!("\n▓ {}\n", title)
        }
    }

    fn render(&self, profile: &ResumeProfile, view: View) -> String {
        let mut output = String::new();

        let name = profile.display_name().to_uppercase();
        if self.use_colors {
            output.push_str(&format!("{}\n", name.bold()));
        } else {
            output.push_str(&format!("{}\n", name));
        }
        let contacts = profile.contact_line().join(" · ");
        if !contacts.is_empty() {
            output.push_str(&self.colorize(&contacts, Color::BrightBlack));
            output.push('\n');
        }

        if view == View::CoverLetter {
            output.push_str(&self.format_header("Cover Letter"));
            output.push_str(profile.cover_letter.as_deref().unwrap_or_default().trim());
            output.push('\n');
            return output;
        }

        if !profile.summary.trim().is_empty() {
            output.push_str(&self.format_header("Summary"));
            output.push_str(profile.summary.trim());
            output.push('\n');
        }

        if !profile.experience.is_empty() {
            output.push_str(&self.format_header("Experience"));
            for (i, exp) in profile.experience.iter().enumerate() {
                output.push_str(&format!(
                    "[{}] {} @ {}  {}\n",
                    i,
                    self.colorize(&exp.role, Color::Cyan),
                    exp.company,
                    self.colorize(&exp.period(), Color::BrightBlack)
                ));
                for (j, bullet) in exp.description.iter().enumerate() {
                    output.push_str(&format!("    {}. {}\n", j, bullet));
                }
            }
        }

        if !profile.skills.is_empty() {
            output.push_str(&self.format_header("Skills"));
            let numbered: Vec<String> = profile
                .skills
                .iter()
                .enumerate()
                .map(|(i, skill)| format!("[{}] {}", i, skill))
                .collect();
            output.push_str(&numbered.join("  "));
            output.push('\n');
        }

        if !profile.education.is_empty() {
            output.push_str(&self.format_header("Education"));
            for (i, edu) in profile.education.iter().enumerate() {
                output.push_str(&format!(
                    "[{}] {}, {} {}\n",
                    i,
                    self.colorize(&edu.degree, Color::Cyan),
                    edu.institution,
                    self.colorize(&edu.year, Color::BrightBlack)
                ));
            }
        }

        if profile.has_cover_letter() {
            output.push_str(&self.colorize("\n(cover letter attached, view with --view cover-letter)\n", Color::Yellow));
        }

        output
    }
}

impl ResumeFormatter for ConsoleFormatter {
    fn format_resume(&self, profile: &ResumeProfile, view: View) -> Result<Vec<u8>> {
        Ok(self.render(profile, effective_view(profile, view)).into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ResumeFormatter for JsonFormatter {
    fn format_resume(&self, profile: &ResumeProfile, _view: View) -> Result<Vec<u8>> {
        if self.pretty {
            Ok(serde_json::to_vec_pretty(profile)?)
        } else {
            Ok(serde_json::to_vec(profile)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn render(profile: &ResumeProfile, view: View) -> String {
        let mut output = format!("# {}\n\n", profile.display_name());
        let contacts = profile.contact_line();
        if !contacts.is_empty() {
            output.push_str(&format!("{}\n\n", contacts.join(" · ")));
        }

        if view == View::CoverLetter {
            output.push_str(profile.cover_letter.as_deref().unwrap_or_default().trim());
            output.push('\n');
            return output;
        }

        if !profile.summary.trim().is_empty() {
            output.push_str(&format!("{}\n\n", profile.summary.trim()));
        }

        if !profile.experience.is_empty() {
            output.push_str("## Experience\n\n");
            for exp in &profile.experience {
                output.push_str(&format!("### {}\n\n", exp.role));
                let period = exp.period();
                if period.is_empty() {
                    output.push_str(&format!("**{}**\n\n", exp.company));
                } else {
                    output.push_str(&format!("**{}** | *{}*\n\n", exp.company, period));
                }
                for bullet in &exp.description {
                    output.push_str(&format!("- {}\n", bullet));
                }
                if !exp.description.is_empty() {
                    output.push('\n');
                }
            }
        }

        if !profile.skills.is_empty() {
            output.push_str("## Skills\n\n");
            output.push_str(&profile.skills.join(" · "));
            output.push_str("\n\n");
        }

        if !profile.education.is_empty() {
            output.push_str("## Education\n\n");
            for edu in &profile.education {
                let mut line = format!("- **{}**, {}", edu.degree, edu.institution);
                if !edu.year.trim().is_empty() {
                    line.push_str(&format!(" ({})", edu.year.trim()));
                }
                output.push_str(&line);
                output.push('\n');
            }
        }

        output.trim_end().to_string() + "\n"
    }
}

impl ResumeFormatter for MarkdownFormatter {
    fn format_resume(&self, profile: &ResumeProfile, view: View) -> Result<Vec<u8>> {
        Ok(Self::render(profile, effective_view(profile, view)).into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data<'a>(&self, profile: &'a ResumeProfile, view: View) -> HtmlTemplate<'a> {
        let cover_letter = match view {
            View::CoverLetter => profile.cover_letter.as_deref().map(str::trim),
            View::Resume => None,
        };
        let title = match view {
            View::CoverLetter => format!("{} - Cover Letter", profile.display_name()),
            View::Resume => format!("{} - Resume", profile.display_name()),
        };

        HtmlTemplate {
            include_styles: self.include_styles,
            title,
            name: profile.display_name(),
            contacts: profile.contact_line(),
            summary: profile.summary.trim(),
            experience: profile
                .experience
                .iter()
                .map(|exp| HtmlExperience {
                    role: &exp.role,
                    company: &exp.company,
                    period: exp.period(),
                    bullets: &exp.description,
                })
                .collect(),
            skills: &profile.skills,
            education: &profile.education,
            cover_letter,
        }
    }
}

impl ResumeFormatter for HtmlFormatter {
    fn format_resume(&self, profile: &ResumeProfile, view: View) -> Result<Vec<u8>> {
        let template_data = self.create_template_data(profile, effective_view(profile, view));
        let html = template_data
            .render()
            .map_err(|e| FastCvError::OutputFormatting(e.to_string()))?;
        Ok(html.into_bytes())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ExportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_html_styles: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
            html_formatter: HtmlFormatter::new(include_html_styles),
            pdf_formatter: PdfFormatter::new(),
        }
    }

    pub fn generate(&self, profile: &ResumeProfile, view: View, format: OutputFormat) -> Result<Vec<u8>> {
        let formatter: &dyn ResumeFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Html => &self.html_formatter,
            OutputFormat::Pdf => &self.pdf_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), format);
        formatter.format_resume(profile, view)
    }
}

impl Default for ExportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_export_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// `jane_doe_resume.html`, `jane_doe_cover_letter.pdf`, ...
pub fn suggest_filename(format: OutputFormat, full_name: &str, view: View) -> String {
    let slug: String = full_name
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let base_name = if slug.is_empty() { "cv".to_string() } else { slug };
    let kind = match view {
        View::Resume => "resume",
        View::CoverLetter => "cover_letter",
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Pdf => "pdf",
    };
    format!("{}_{}.{}", base_name, kind, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::Experience;

    fn sample() -> ResumeProfile {
        ResumeProfile {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            location: "Berlin".into(),
            summary: "Systems engineer".into(),
            skills: vec!["Rust".into(), "Kubernetes".into()],
            experience: vec![Experience {
                company: "Acme <Labs>".into(),
                role: "Engineer".into(),
                start_date: "2019".into(),
                end_date: "Present".into(),
                description: vec!["Cut latency by 40%".into()],
            }],
            education: vec![Education {
                institution: "TU Berlin".into(),
                degree: "MSc Computer Science".into(),
                year: "2018".into(),
            }],
            ..Default::default()
        }
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_markdown_sections() {
        let md = text(MarkdownFormatter.format_resume(&sample(), View::Resume).unwrap());

        assert!(md.starts_with("# Jane Doe\n\njane@example.com · Berlin\n"));
        assert!(md.contains("### Engineer\n\n**Acme <Labs>** | *2019 - Present*"));
        assert!(md.contains("- Cut latency by 40%"));
        assert!(md.contains("Rust · Kubernetes"));
        assert!(md.contains("- **MSc Computer Science**, TU Berlin (2018)"));
    }

    #[test]
    fn test_html_escapes_and_has_print_rules() {
        let html = text(HtmlFormatter::new(true).format_resume(&sample(), View::Resume).unwrap());

        assert!(html.contains("@page { size: A4"));
        assert!(html.contains("@media print"));
        assert!(html.contains("Acme &lt;Labs&gt;"));
        assert!(!html.contains("Acme <Labs>"));
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert!(html.contains("<li>Cut latency by 40%</li>"));
    }

    #[test]
    fn test_html_without_styles() {
        let html = text(HtmlFormatter::new(false).format_resume(&sample(), View::Resume).unwrap());
        assert!(!html.contains("<style>"));
    }

    #[test]
    fn test_cover_letter_view_falls_back_without_letter() {
        let profile = sample();
        assert_eq!(effective_view(&profile, View::CoverLetter), View::Resume);

        let md = text(MarkdownFormatter.format_resume(&profile, View::CoverLetter).unwrap());
        assert!(md.contains("## Experience"));
    }

    #[test]
    fn test_cover_letter_view() {
        let mut profile = sample();
        profile.cover_letter = Some("Dear Hiring Manager,\n\nI build fast systems.".into());

        let html = text(HtmlFormatter::new(true).format_resume(&profile, View::CoverLetter).unwrap());
        assert!(html.contains("class=\"letter\">Dear Hiring Manager,"));
        assert!(!html.contains("<h2>Experience</h2>"));

        let console = text(ConsoleFormatter::new(false).format_resume(&profile, View::CoverLetter).unwrap());
        assert!(console.contains("I build fast systems."));
        assert!(!console.contains("Kubernetes"));
    }

    #[test]
    fn test_placeholder_name() {
        let md = text(MarkdownFormatter.format_resume(&ResumeProfile::default(), View::Resume).unwrap());
        assert_eq!(md, "# Your Name\n");
    }

    #[test]
    fn test_console_shows_indices_for_editing() {
        let console = text(ConsoleFormatter::new(false).format_resume(&sample(), View::Resume).unwrap());
        assert!(console.starts_with("JANE DOE\n"));
        assert!(console.contains("[0] Engineer @ Acme <Labs>"));
        assert!(console.contains("    0. Cut latency by 40%"));
        assert!(console.contains("[1] Kubernetes"));
    }

    #[test]
    fn test_json_export_roundtrips() {
        let bytes = ExportGenerator::new()
            .generate(&sample(), View::Resume, OutputFormat::Json)
            .unwrap();
        let parsed: ResumeProfile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(
            suggest_filename(OutputFormat::Html, "Jane  Doe", View::Resume),
            "jane_doe_resume.html"
        );
        assert_eq!(
            suggest_filename(OutputFormat::Pdf, "", View::CoverLetter),
            "cv_cover_letter.pdf"
        );
    }
}
