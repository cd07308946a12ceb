//! assignplan - milestone planner for assignments
//!
//! CLI entry point for planning, inspecting and editing assignments.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use assignplan::cli::{Cli, Command, OutputFormat, get_log_path};
use assignplan::config::Config;
use assignplan::domain::{
    Assignment, AssignmentDetail, AssignmentUpdate, MilestoneDraft, MilestonePatch, NewAssignment, ReorderRequest,
};
use assignplan::llm::create_client;
use assignplan::planning::{Decomposer, DecomposerConfig, PlanOutcome};
use assignplan::service::{AssignmentService, CreatedAssignment};
use assignplan::state::StateManager;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to the log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

/// Wire the decomposer and store from config
fn build_service(config: &Config, db: Option<PathBuf>) -> Result<AssignmentService> {
    let generator = match create_client(&config.llm) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "Text generation disabled; new plans will use the fallback");
            None
        }
    };
    let decomposer = Decomposer::new(generator, DecomposerConfig::from(config));

    let db_path = db.unwrap_or_else(|| config.storage.database_path.clone());
    let state = StateManager::spawn(&db_path).context(format!("Failed to open database {}", db_path.display()))?;
    Ok(AssignmentService::new(state, decomposer))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "assignplan loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    if let Command::Logs { lines } = cli.command {
        return cmd_logs(lines);
    }

    let service = build_service(&config, cli.db)?;
    let format = cli.format;

    match cli.command {
        Command::Split { description, due } => {
            let outcome = service.split(&description, &due, Local::now().date_naive()).await?;
            print_outcome(&outcome, &format)
        }
        Command::Create {
            title,
            due,
            description,
            milestones,
            owner,
        } => {
            let mut input = NewAssignment::new(owner, title, due).with_description(description);
            if !milestones.is_empty() {
                input = input.with_milestones(milestones.into_iter().map(MilestoneDraft::new).collect());
            }
            let created = service.create(input).await?;
            print_created(&created, &format)
        }
        Command::List { owner, archived, all } => {
            let filter = if all { None } else { Some(archived) };
            let assignments = service.list(owner, filter).await?;
            print_list(&assignments, &format)
        }
        Command::Show { id } => {
            let detail = service.get(id).await?;
            print_detail(&detail, &format)
        }
        Command::Update {
            id,
            title,
            description,
            due,
            milestones,
        } => {
            let update = AssignmentUpdate {
                title,
                description,
                deadline: due,
                milestones: if milestones.is_empty() {
                    None
                } else {
                    Some(milestones.into_iter().map(MilestoneDraft::new).collect())
                },
            };
            let detail = service.update(id, update).await?;
            print_detail(&detail, &format)
        }
        Command::Check { id, undo } => {
            let patch = MilestonePatch {
                text: None,
                completed: Some(!undo),
            };
            let milestone = service.patch_milestone(id, patch).await?;
            let detail = service.get(milestone.assignment_id).await?;
            print_detail(&detail, &format)
        }
        Command::Edit { id, text, done, undone } => {
            let completed = match (done, undone) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let milestone = service.patch_milestone(id, MilestonePatch { text, completed }).await?;
            let detail = service.get(milestone.assignment_id).await?;
            print_detail(&detail, &format)
        }
        Command::Reorder { id, order } => {
            let ack = service.reorder(id, ReorderRequest { order }).await?;
            match format {
                OutputFormat::Json => print_json(&ack),
                OutputFormat::Text => {
                    println!("{}", "Milestones reordered successfully".green());
                    Ok(())
                }
            }
        }
        Command::Repair { id } => {
            let moved = service.repair(id).await?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "moved": moved })),
                OutputFormat::Text => {
                    println!("Repaired order of assignment {}: {} milestone(s) moved", id, moved);
                    Ok(())
                }
            }
        }
        Command::Archive { id, undo } => {
            service.archive(id, !undo).await?;
            let verb = if undo { "Restored" } else { "Archived" };
            print_status(&format, &format!("{} assignment {}", verb, id))
        }
        Command::Delete { id } => {
            service.delete(id).await?;
            print_status(&format, &format!("Deleted assignment {}", id))
        }
        Command::Logs { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(format: &OutputFormat, message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "status": "ok", "message": message })),
        OutputFormat::Text => {
            println!("{}", message.green());
            Ok(())
        }
    }
}

fn print_outcome(outcome: &PlanOutcome, format: &OutputFormat) -> Result<()> {
    if *format == OutputFormat::Json {
        return print_json(outcome);
    }

    if let PlanOutcome::Fallback { reason, .. } = outcome {
        println!("{} {}", "Using the standard plan:".yellow(), reason);
    }
    for m in outcome.milestones() {
        let dates = if m.suggested_start_date.is_empty() {
            String::new()
        } else {
            format!(" ({} → {})", m.suggested_start_date, m.suggested_end_date)
        };
        println!("{}. {}{}", m.id, m.title.bold(), dates.dimmed());
        if !m.description.is_empty() {
            println!("   {}", m.description);
        }
    }
    Ok(())
}

fn print_created(created: &CreatedAssignment, format: &OutputFormat) -> Result<()> {
    if *format == OutputFormat::Json {
        return print_json(created);
    }

    println!(
        "{} assignment {} with {} milestone(s) from {}",
        "Created".green(),
        created.detail.assignment.id,
        created.detail.milestones.len(),
        created.source
    );
    if let Some(reason) = &created.fallback_reason {
        println!("{} {}", "Note:".yellow(), reason);
    }
    print_detail(&created.detail, format)
}

fn print_detail(detail: &AssignmentDetail, format: &OutputFormat) -> Result<()> {
    if *format == OutputFormat::Json {
        return print_json(detail);
    }

    let a = &detail.assignment;
    let archived = if a.archived { " [archived]" } else { "" };
    println!("#{} {}{}", a.id, a.title.bold(), archived.dimmed());
    println!("Due: {}   Progress: {}%", a.deadline, a.progress);
    if a.has_description() {
        println!("{}", a.description);
    }
    for m in &detail.milestones {
        let mark = if m.completed { "[x]".green() } else { "[ ]".normal() };
        println!("  {} {} {}", mark, format!("({})", m.id).dimmed(), m.text);
    }
    Ok(())
}

fn print_list(assignments: &[Assignment], format: &OutputFormat) -> Result<()> {
    if *format == OutputFormat::Json {
        return print_json(&assignments);
    }

    if assignments.is_empty() {
        println!("No assignments");
        return Ok(());
    }
    for a in assignments {
        println!(
            "{:>4}  {:<32}  due {}  {:>3}%{}",
            a.id,
            a.title,
            a.deadline,
            a.progress,
            if a.archived { "  archived" } else { "" }
        );
    }
    Ok(())
}

/// Print the last `lines` lines of the log file
fn cmd_logs(lines: usize) -> Result<()> {
    let log_path = get_log_path();

    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let reader = BufReader::new(file);
    let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{}", line);
    }

    Ok(())
}
