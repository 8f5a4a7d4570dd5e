//! FastCV: AI-assisted resume builder

use clap::Parser;
use colored::Colorize;
use fastcv::ai::{GeminiGateway, Operation};
use fastcv::cli::{self, Cli, Commands, ConfigAction, EditAction, HistoryAction, ProfileAction};
use fastcv::config::{Config, OutputFormat};
use fastcv::editor::{read_text, FieldPath, ListPath};
use fastcv::error::{FastCvError, Result};
use fastcv::input::{InputManager, RawInput};
use fastcv::output::{effective_view, save_export_to_file, suggest_filename, ExportGenerator};
use fastcv::profile::{CVRecord, FileStorage, ProfileStore, ResumeProfile, View};
use fastcv::workspace::Workspace;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

type AppWorkspace = Workspace<FileStorage, Option<GeminiGateway>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    if !config.output.color_output {
        colored::control::set_override(false);
    }

    // Only AI commands need an API key
    let gateway = if command.needs_ai() {
        let gateway = GeminiGateway::from_config(&config)?;
        info!("Using model {}", gateway.model());
        Some(gateway)
    } else {
        None
    };
    let storage = FileStorage::open(config.data_dir())?;
    let mut workspace = Workspace::open(ProfileStore::new(storage), gateway)?;
    let exporter = ExportGenerator::with_options(config.output.color_output, true, true);

    match command {
        Commands::Profile { action } => handle_profile(&mut workspace, action, &exporter).await?,

        Commands::Tailor { job } => {
            let record = with_spinner(Operation::Tailor, workspace.tailor(&job)).await?;
            println!("✨ Tailored resume for '{}'", record.target_job);
            println!("💾 Saved to history as {}", record.id.dimmed());
            print_document(&exporter, workspace.active()?, View::Resume)?;
        }

        Commands::CoverLetter { job } => {
            let record = with_spinner(Operation::CoverLetter, workspace.cover_letter(job.as_deref())).await?;
            println!("✉️  Cover letter written");
            println!("💾 Saved to history as {} ('{}')", record.id.dimmed(), record.target_job);
            print_document(&exporter, workspace.active()?, View::CoverLetter)?;
        }

        Commands::Rewrite { path, instruction } => {
            let path: FieldPath = path.parse()?;
            let instruction = instruction.unwrap_or_default();
            let rewritten = with_spinner(Operation::Rewrite, workspace.rewrite(&path, &instruction)).await?;
            println!("✏️  {} rewritten:\n", path.to_string().cyan());
            println!("{}", rewritten);
        }

        Commands::Edit { action } => handle_edit(&mut workspace, action).await?,

        Commands::Save { label } => {
            let record = workspace.save_snapshot(label.as_deref())?;
            println!("💾 Saved '{}' ({})", record.target_job, record.id.dimmed());
        }

        Commands::History { action } => handle_history(&mut workspace, action, &exporter)?,

        Commands::View { view } => {
            let view = cli::parse_view(&view).map_err(FastCvError::InvalidInput)?;
            if view == View::CoverLetter && !workspace.active()?.has_cover_letter() {
                warn!("No cover letter yet; run `fastcv cover-letter` to write one");
            }
            workspace.set_view(view)?;
            println!("👁️  Active view: {}", view);
        }

        Commands::Export {
            format,
            view,
            output,
            stdout,
        } => {
            let format = match format {
                Some(format) => cli::parse_output_format(&format).map_err(FastCvError::InvalidInput)?,
                None => config.output.format,
            };
            let requested = match view {
                Some(view) => cli::parse_view(&view).map_err(FastCvError::InvalidInput)?,
                None => workspace.session().map(|session| session.view).unwrap_or_default(),
            };
            export(&workspace, &exporter, format, requested, output, stdout)?;
        }

        Commands::Status => print_status(&workspace, &config)?,

        Commands::Config { action } => handle_config(action, config.clone(), config_path)?,
    }

    Ok(())
}

async fn handle_profile(workspace: &mut AppWorkspace, action: ProfileAction, exporter: &ExportGenerator) -> Result<()> {
    match action {
        ProfileAction::Extract { file, text } => {
            let input = match (file, text) {
                (Some(path), _) => RawInput::File(path),
                (None, Some(text)) => RawInput::Text(text),
                (None, None) => RawInput::Stdin,
            };
            let raw_text = InputManager::new().read(&input).await?;
            let profile = with_spinner(Operation::Extract, workspace.extract_profile(&raw_text)).await?;
            println!(
                "✅ Profile ready: {} ({} Roles, {} Skills)",
                profile.display_name().bold(),
                profile.role_count(),
                profile.skill_count()
            );
            println!("💡 Next: fastcv tailor \"<job title>\"");
        }

        ProfileAction::Show { format } => {
            let format = cli::parse_output_format(&format).map_err(FastCvError::InvalidInput)?;
            let profile = workspace.base_profile().ok_or(FastCvError::NoProfile)?;
            write_stdout(&exporter.generate(profile, View::Resume, format)?)?;
        }

        ProfileAction::Import { file } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let profile: ResumeProfile = serde_json::from_str(&content)?;
            let profile = workspace.import_profile(profile)?;
            println!("✅ Imported profile for {}", profile.display_name().bold());
        }

        ProfileAction::Promote => {
            workspace.promote_active()?;
            println!("✅ Active document is now the base profile");
        }

        ProfileAction::Reset => {
            workspace.reset()?;
            println!("🔄 Base profile cleared (history kept)");
        }
    }
    Ok(())
}

async fn handle_edit(workspace: &mut AppWorkspace, action: EditAction) -> Result<()> {
    match action {
        EditAction::Get { path } => {
            let path: FieldPath = path.parse()?;
            println!("{}", read_text(workspace.active()?, &path)?);
        }

        EditAction::Set { path, value } => {
            let path: FieldPath = path.parse()?;
            workspace.edit(|editor| editor.set_text(&path, &value))?;
            println!("✅ Updated {}", path.to_string().cyan());
        }

        EditAction::Add { list, text, at } => {
            let list: ListPath = list.parse()?;
            let index = workspace.edit(|editor| editor.insert_item(&list, at, &text))?;
            println!("✅ Added {}.{}", list.to_string().cyan(), index);
        }

        EditAction::Remove { list, index } => {
            let list: ListPath = list.parse()?;
            workspace.edit(|editor| editor.remove_item(&list, index))?;
            println!("🗑️  Removed {}.{}", list.to_string().cyan(), index);
        }

        EditAction::Move { list, from, to } => {
            let list: ListPath = list.parse()?;
            workspace.edit(|editor| editor.move_item(&list, from, to))?;
            println!("↕️  Moved {} item {} to {}", list.to_string().cyan(), from, to);
        }

        EditAction::Up { list, index } => {
            let list: ListPath = list.parse()?;
            if workspace.edit(|editor| editor.move_up(&list, index))? {
                println!("⬆️  Moved {}.{} up", list.to_string().cyan(), index);
            } else {
                println!("Already at the top");
            }
        }

        EditAction::Down { list, index } => {
            let list: ListPath = list.parse()?;
            if workspace.edit(|editor| editor.move_down(&list, index))? {
                println!("⬇️  Moved {}.{} down", list.to_string().cyan(), index);
            } else {
                println!("Already at the bottom");
            }
        }

        EditAction::Bullets { index, text } => {
            let text = match text {
                Some(text) => text,
                None => InputManager::new().read(&RawInput::Stdin).await?,
            };
            let count = workspace.edit(|editor| editor.replace_bullets(index, &text))?;
            println!("✅ experience.{} now has {} bullets", index, count);
        }
    }
    Ok(())
}

fn handle_history(workspace: &mut AppWorkspace, action: HistoryAction, exporter: &ExportGenerator) -> Result<()> {
    match action {
        HistoryAction::List => {
            let records = workspace.store().history()?;
            if records.is_empty() {
                println!("No saved resumes yet.");
            }
            print_records(&records);
        }

        HistoryAction::Show { id, format } => {
            let format = cli::parse_output_format(&format).map_err(FastCvError::InvalidInput)?;
            let record = workspace.store().get_record(&id)?;
            write_stdout(&exporter.generate(&record.profile, View::Resume, format)?)?;
        }

        HistoryAction::Load { id } => {
            let session = workspace.load_record(&id)?;
            println!("📂 Loaded {} as the active document", session.profile.display_name().bold());
        }

        HistoryAction::Delete { ids } => {
            let removed = if let [id] = ids.as_slice() {
                usize::from(workspace.store_mut().delete_record(id)?)
            } else {
                workspace.store_mut().delete_records(&ids)?
            };
            if removed == 0 {
                return Err(FastCvError::RecordNotFound(ids.join(", ")));
            }
            println!("🗑️  Deleted {} record(s)", removed);
        }

        HistoryAction::Clear { yes } => {
            let count = workspace.store().history()?.len();
            if count == 0 {
                println!("History is already empty.");
                return Ok(());
            }
            if !yes && !confirm(&format!("Delete all {} saved resumes?", count))? {
                println!("Cancelled.");
                return Ok(());
            }
            let removed = workspace.store_mut().clear_history()?;
            println!("🗑️  Deleted {} record(s)", removed);
        }

        HistoryAction::Duplicate { id } => {
            let copy = workspace.store_mut().duplicate_record(&id)?;
            println!("📑 Created '{}' ({})", copy.target_job, copy.id.dimmed());
        }

        HistoryAction::Search { query } => {
            let matches = workspace.store().search_history(&query)?;
            if matches.is_empty() {
                println!("No saved resumes match '{}'.", query);
            }
            print_records(&matches);
        }
    }
    Ok(())
}

fn handle_config(action: Option<ConfigAction>, mut config: Config, config_path: &Path) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            if config.ai.api_key.is_some() {
                config.ai.api_key = Some("********".into());
            }
            let content = toml::to_string_pretty(&config)
                .map_err(|e| FastCvError::Configuration(format!("Failed to serialize config: {}", e)))?;
            println!("⚙️  Current Configuration ({})\n", config_path.display());
            println!("{}", content);
        }

        Some(ConfigAction::Path) => println!("{}", config_path.display()),

        Some(ConfigAction::Reset) => {
            println!("🔄 Resetting configuration to defaults...");
            Config::default().save(config_path)?;
            println!("✅ Configuration reset successfully!");
        }

        Some(ConfigAction::Set { key, value }) => {
            config.set_value(&key, &value)?;
            config.save(config_path)?;
            println!("✅ {} = {}", key, value);
        }
    }
    Ok(())
}

fn export(
    workspace: &AppWorkspace,
    exporter: &ExportGenerator,
    format: OutputFormat,
    requested: View,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<()> {
    let profile = workspace.active()?;
    let view = effective_view(profile, requested);
    if view != requested {
        warn!("No cover letter yet, exporting the resume instead");
    }

    let content = exporter.generate(profile, view, format)?;
    if stdout || (format == OutputFormat::Console && output.is_none()) {
        return write_stdout(&content);
    }

    let path = output.unwrap_or_else(|| PathBuf::from(suggest_filename(format, &profile.full_name, view)));
    save_export_to_file(&content, &path)?;
    println!("📄 Exported {} to {}", view, path.display());
    if format == OutputFormat::Html {
        println!("💡 Open it in a browser and print to PDF (A4) for the on-screen layout");
    }
    Ok(())
}

fn print_status(workspace: &AppWorkspace, config: &Config) -> Result<()> {
    println!("{}", "FastCV".bold());
    match workspace.base_profile() {
        Some(base) => println!(
            "👤 Base profile: {} ({} Roles, {} Skills)",
            base.display_name(),
            base.role_count(),
            base.skill_count()
        ),
        None => println!("👤 Base profile: none yet, run `fastcv profile extract`"),
    }
    if let Some(session) = workspace.session() {
        let job = if session.target_job.is_empty() {
            "-"
        } else {
            session.target_job.as_str()
        };
        println!("📝 Active document: {} | target: {} | view: {}", session.profile.display_name(), job, session.view);
        if session.profile.has_cover_letter() {
            println!("✉️  Cover letter attached");
        }
    }
    println!("📚 History: {} saved resume(s)", workspace.store().history()?.len());
    println!("🤖 Model: {}", config.ai.model);
    println!("💾 Data: {}", config.data_dir().display());
    Ok(())
}

fn print_document(exporter: &ExportGenerator, profile: &ResumeProfile, view: View) -> Result<()> {
    println!();
    write_stdout(&exporter.generate(profile, view, OutputFormat::Console)?)
}

fn print_records(records: &[CVRecord]) {
    for record in records {
        println!(
            "{}  {:<10}  {}  {}",
            record.id.dimmed(),
            record.date,
            truncate_text(&record.target_job, 48).bold(),
            record.profile.display_name().dimmed()
        );
    }
}

async fn with_spinner<T>(operation: Operation, task: impl Future<Output = Result<T>>) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(operation.progress_label());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = task.await;
    spinner.finish_and_clear();
    if let Err(e) = &result {
        warn!("{} failed: {}", operation, e);
    }
    result
}

fn write_stdout(content: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content)?;
    stdout.flush()?;
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Truncate text to a maximum number of graphemes with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_length {
        return text.to_string();
    }
    let truncated = graphemes[..max_length].concat();
    // Cut at the last word boundary when there is one
    let cut = truncated.rfind(' ').unwrap_or(truncated.len());
    format!("{}...", truncated[..cut].trim_end())
}
