//! sdkmig CLI - migrate Java sources from AWS SDK for Java v1 to v2
//!
//! Rewrites v1 types, client builders, request construction, S3 calls and
//! client configuration into their v2 equivalents. Code without an automatic
//! equivalent is annotated with `/*AWS SDK for Java v2 migration: ...*/`.

mod config;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use output::{EditInfo, FileReport, OutputFormat, Reporter};
use process::{process_file, write_file};
use sdkmig_core::logging;
use sdkmig_rules::{MigrationSettings, Rule};

#[derive(Parser)]
#[command(name = "sdkmig")]
#[command(version)]
#[command(about = "Migrate Java code from AWS SDK for Java v1 to v2")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Report changes without applying them (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Rewrite files in place
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .sdkmig.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Write a migration log (skipped types, unattached payloads, pass limits)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose {
            eprintln!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose {
                    eprintln!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    let settings = config.migration_settings();
    let registry = settings
        .registry()
        .context("Failed to build migration rules")?;

    // Handle --list-rules
    if cli.list_rules {
        println!("{}", "Available rules (pipeline order):".bold());
        for (name, description, category) in registry.list_rules() {
            println!("  {} [{}] - {}", name.green(), category, description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Determine output format: CLI, then config, then text
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format
            )
        })?
    };

    if let Some(log_path) = cli.log_file.as_ref().or(config.logging.file.as_ref()) {
        let path = logging::init_logger(Some(log_path.as_path()))
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        if cli.verbose && output_format == OutputFormat::Text {
            println!("{}: {}", "Log file".bold(), path.display());
        }
    }

    let all_rules = registry.all_names();

    // Validate rule names from CLI
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }

    let enabled_rules = config.effective_rules(&all_rules, &cli.rule);
    if enabled_rules.is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }
    let rules = registry.get_enabled(&enabled_rules);
    let rule_names: Vec<String> = rules.iter().map(|r| r.name().to_string()).collect();

    let fix_mode = cli.fix && !cli.check;
    let check_mode = !fix_mode;

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!("{}: {}", "Rules".bold(), rule_names.join(", "));
        println!();
    }

    // Collect all file paths first
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<PathBuf> = Vec::new();

    for path in &cli.paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "java"))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    logging::log_run_start(file_paths.len(), &rule_names);

    // Files share nothing, so they migrate in parallel
    let results: Vec<FileResult> = file_paths
        .par_iter()
        .map(|path| process_file_to_result(path, &rules, &settings))
        .collect();

    // Sort results by path for deterministic output
    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    for (result, path) in sorted_results {
        report_result(path, result, fix_mode, &mut reporter)?;
    }

    let summary = reporter.summary();
    logging::log_run_complete(summary.files_with_changes, summary.errors);
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode);

    Ok(exit_code)
}

/// Result of processing a single file (for parallel processing)
enum FileResult {
    NoChanges,
    HasChanges {
        edits: Vec<EditInfo>,
        capped: Vec<String>,
        old_source: String,
        new_source: String,
    },
    ParseError,
    Error(String),
}

/// Process a file and return a result (no writes, suitable for parallel execution)
fn process_file_to_result(
    path: &PathBuf,
    rules: &[&dyn Rule],
    settings: &MigrationSettings,
) -> FileResult {
    match process_file(path, rules, settings) {
        Ok(Some(result)) => match result.new_source {
            Some(new_source) if !result.edits.is_empty() => FileResult::HasChanges {
                edits: result.edits,
                capped: result.capped,
                old_source: result.old_source,
                new_source,
            },
            _ => FileResult::NoChanges,
        },
        Ok(None) => FileResult::ParseError,
        Err(e) => FileResult::Error(format!("{:#}", e)),
    }
}

/// Report a file result and optionally apply fixes
fn report_result(
    path: &PathBuf,
    result: FileResult,
    fix_mode: bool,
    reporter: &mut Reporter,
) -> Result<()> {
    match result {
        FileResult::NoChanges => {
            reporter.report_skipped(path);
        }
        FileResult::HasChanges {
            edits,
            capped,
            old_source,
            new_source,
        } => {
            let report = FileReport::migrated(path, edits, capped, &old_source, &new_source);
            if fix_mode {
                write_file(path, &new_source)?;
                reporter.report_fix(report);
            } else {
                reporter.report_check(report, &old_source, &new_source);
            }
        }
        FileResult::ParseError => {
            reporter.report_error(path, "Parse error, skipping");
        }
        FileResult::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}
