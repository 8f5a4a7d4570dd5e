//! CLI interface for FastCV

use crate::config::OutputFormat;
use crate::profile::types::View;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fastcv")]
#[command(about = "AI-assisted resume builder: extract, tailor, edit and export your CV")]
#[command(long_about = "Turn free-form career details into a structured resume, tailor it to a job title, \
write cover letters, edit it in place and export print-ready documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the base profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Tailor the base profile for a job title
    Tailor {
        /// Target job title, e.g. "Senior Backend Engineer"
        job: String,
    },

    /// Write a cover letter for the active document
    CoverLetter {
        /// Target job title (defaults to the last tailored job)
        #[arg(short, long)]
        job: Option<String>,
    },

    /// Let the AI rewrite one field of the active document
    Rewrite {
        /// Field path, e.g. summary or experience.0.description.1
        path: String,

        /// What to change (defaults to a general polish)
        #[arg(short, long)]
        instruction: Option<String>,
    },

    /// Edit the active document in place
    Edit {
        #[command(subcommand)]
        action: EditAction,
    },

    /// Save the active document to history
    Save {
        /// Label for the record (defaults to "<job> (Edited)")
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Browse and manage saved resumes
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Switch the active view between resume and cover letter
    View {
        /// resume or cover-letter
        view: String,
    },

    /// Export the active document
    Export {
        /// Output format: console, json, markdown, html, pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Override the active view: resume or cover-letter
        #[arg(long)]
        view: Option<String>,

        /// Output file (defaults to a name derived from the profile)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Show the base profile, active document and history at a glance
    Status,

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Build the base profile from career details using the AI
    Extract {
        /// Resume or notes file (PDF, TXT, MD)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Career details as literal text
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Show the base profile
    Show {
        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        format: String,
    },

    /// Use a JSON profile as the base profile
    Import {
        /// Path to a JSON file (e.g. an earlier json export)
        file: PathBuf,
    },

    /// Make the active document the new base profile
    Promote,

    /// Forget the base profile and the active document (history is kept)
    Reset,
}

#[derive(Subcommand)]
pub enum EditAction {
    /// Print the text at a field path
    Get { path: String },

    /// Replace the text at a field path
    Set { path: String, value: String },

    /// Add an item to skills, experience, education or experience.N.description
    Add {
        list: String,
        text: String,

        /// Insert at this index instead of appending
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove an item from a list
    Remove { list: String, index: usize },

    /// Move an item to another position
    Move { list: String, from: usize, to: usize },

    /// Move an item one position up
    Up { list: String, index: usize },

    /// Move an item one position down
    Down { list: String, index: usize },

    /// Replace the bullets of one experience entry, one bullet per line
    Bullets {
        /// Experience index
        index: usize,

        /// Bullet text (read from stdin when omitted)
        text: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List saved records, newest first
    List,

    /// Show one record
    Show {
        id: String,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        format: String,
    },

    /// Make a saved record the active document
    Load { id: String },

    /// Delete one or more records
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete all records
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Copy a record
    Duplicate { id: String },

    /// Find records by target job
    Search { query: String },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "ai.model")
        key: String,

        /// Configuration value
        value: String,
    },
}

impl Commands {
    /// Whether the command calls the AI service
    pub fn needs_ai(&self) -> bool {
        matches!(
            self,
            Commands::Profile {
                action: ProfileAction::Extract { .. }
            } | Commands::Tailor { .. }
                | Commands::CoverLetter { .. }
                | Commands::Rewrite { .. }
        )
    }
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "pdf" => Ok(OutputFormat::Pdf),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html, pdf",
            format
        )),
    }
}

pub fn parse_view(view: &str) -> Result<View, String> {
    match view.to_lowercase().replace('_', "-").as_str() {
        "resume" | "cv" => Ok(View::Resume),
        "cover-letter" | "letter" | "coverletter" => Ok(View::CoverLetter),
        _ => Err(format!("Invalid view: {}. Supported: resume, cover-letter", view)),
    }
}
