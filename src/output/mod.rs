//! Rendering the working document for the terminal and for export

pub mod formatter;
pub mod pdf;

pub use formatter::{
    effective_view, save_export_to_file, suggest_filename, ConsoleFormatter, ExportGenerator, HtmlFormatter,
    JsonFormatter, MarkdownFormatter, ResumeFormatter,
};
pub use pdf::PdfFormatter;
