use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use escalation_paths::batch::{self, BatchReport};
use escalation_paths::config::ValidatorConfig;
use escalation_paths::export::export;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// escalation-paths - validate and export privilege-escalation path documents
#[derive(Parser, Debug)]
#[command(name = "escalation-paths")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log filter (error, warn, info, debug, trace, or an EnvFilter directive)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document or every document under a directory
    Validate {
        /// File or directory to validate
        #[arg(default_value = "data/paths")]
        target: PathBuf,

        /// Validator configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of worker threads
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert every YAML document into a single JSON file
    Export {
        /// Directory holding the YAML documents
        #[arg(short, long, default_value = "data/paths")]
        input: PathBuf,

        /// JSON file to write; metadata.json is written beside it
        #[arg(short, long, default_value = "paths.json")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let outcome = match cli.command {
        Command::Validate {
            target,
            config,
            jobs,
            json,
        } => run_validate(target, config, jobs, json),
        Command::Export { input, output } => run_export(input, output),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_validate(
    target: PathBuf,
    config: Option<PathBuf>,
    jobs: Option<usize>,
    json: bool,
) -> Result<ExitCode> {
    let mut config = match config {
        Some(path) => ValidatorConfig::from_file(&path)?,
        None => ValidatorConfig::default(),
    };
    if jobs.is_some() {
        config.jobs = jobs;
    }

    let report = batch::validate_target(&target, &config)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode report")?
        );
    } else {
        print_report(&report);
    }

    Ok(ExitCode::from(report.exit_code()))
}

fn print_report(report: &BatchReport) {
    if report.total == 0 {
        println!("No documents found.");
        return;
    }
    println!("Validating {} file(s)...\n", report.total);
    for doc in &report.documents {
        if doc.passed {
            println!("✓ {}", doc.path.display());
        } else {
            println!("✗ {}", doc.path.display());
            for e in &doc.errors {
                println!("  - {}", e);
            }
            println!();
        }
    }
    println!("\n{}", "=".repeat(70));
    println!(
        "Results: {} passed, {} failed out of {} total",
        report.passed, report.failed, report.total
    );
    println!("{}", "=".repeat(70));
    if report.is_success() {
        println!("\n✓ All files passed validation!");
    }
}

fn run_export(input: PathBuf, output: PathBuf) -> Result<ExitCode> {
    let summary = export(&input, &output)
        .with_context(|| format!("failed to export documents from {}", input.display()))?;

    for (path, reason) in &summary.skipped {
        println!("  ✗ Error processing {}: {}", path.display(), reason);
    }
    println!(
        "✓ Converted {} path(s) to JSON",
        summary.metadata.total_paths
    );
    println!("  Output: {}", summary.output.display());
    println!("  Metadata: {}", summary.metadata_path.display());
    println!("  Services: {}", summary.metadata.services.len());
    println!("  Categories: {}", summary.metadata.categories.len());
    Ok(ExitCode::SUCCESS)
}
