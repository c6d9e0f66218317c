/// CLI front-end: scan a C# file for generic exception throws, optionally
/// drive the AI fix pipeline and write the result back.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use exception_advisor::analysis::matcher;
use exception_advisor::pipeline::{FixOutcome, FixPipeline, Notifier};
use exception_advisor::{Document, SettingsStore};

#[derive(Parser)]
#[command(
    name = "exception-advisor",
    about = "Find generic exception throws in C# code and suggest specific types via Ollama"
)]
struct Args {
    /// C# source file to analyze
    file: PathBuf,

    /// Apply AI-suggested rewrites and save the file
    #[arg(long)]
    fix: bool,

    /// Only check whether the inference endpoint is reachable
    #[arg(long)]
    check: bool,
}

/// Prints notifications to the terminal instead of the log.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let store = SettingsStore::new();

    if args.check {
        let pipeline = FixPipeline::new(store)?;
        if pipeline.check_available().await {
            println!("Ollama endpoint is available");
        } else {
            println!("Ollama endpoint is not reachable");
        }
        return Ok(());
    }

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;
    let doc = Document::parse(source)
        .with_context(|| format!("Cannot parse {}", args.file.display()))?;

    let diagnostics = doc.with_read(|view| matcher::analyze(view));
    for diag in &diagnostics {
        let descriptor = diag.kind.descriptor();
        println!(
            "{}:{}:{}: {:?}: {}",
            args.file.display(),
            diag.line + 1,
            diag.column + 1,
            descriptor.severity,
            descriptor.message
        );
    }
    if diagnostics.is_empty() {
        println!("No generic exception throws found");
        return Ok(());
    }

    if !args.fix {
        return Ok(());
    }

    let pipeline = FixPipeline::with_notifier(store, Arc::new(ConsoleNotifier))?;
    let mut applied = 0usize;

    // Each applied edit invalidates outstanding sites, so re-analyze after
    // every round. The round cap keeps a model that answers with the generic
    // type again from looping forever.
    let mut rounds = diagnostics.len();
    while rounds > 0 {
        rounds -= 1;
        let Some(site) = doc.with_read(|view| matcher::candidates(view).next()) else {
            break;
        };
        match pipeline.run(&doc, site).await? {
            FixOutcome::Applied { suggestion } => {
                applied += 1;
                println!("Applied suggestion: {suggestion}");
            }
            FixOutcome::StaleSite => continue,
            FixOutcome::Disabled | FixOutcome::NoSuggestion => break,
        }
    }

    if applied > 0 {
        std::fs::write(&args.file, doc.source())
            .with_context(|| format!("Cannot write {}", args.file.display()))?;
        println!("Updated {} ({applied} fix(es) applied)", args.file.display());
    }
    Ok(())
}
