//! roverpdf - Assemble PDFs and images into a single bookmarked PDF.

mod cli;
mod output;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, OverwriteMode};
use crate::output::OutputFormatter;
use roverpdf::{Assembly, AssemblyResult, BookmarkRecord, CollectingSink, Diagnostic, RoverError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(exit_code(&err));
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let default_directive = if cli.quiet || cli.json {
        "roverpdf=error"
    } else if cli.verbose {
        "roverpdf=debug"
    } else {
        "roverpdf=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<RoverError>()
        .map_or(1, RoverError::exit_code)
}

/// Machine readable result printed with `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    output: String,
    dry_run: bool,
    page_count: usize,
    bookmarks: &'a [BookmarkRecord],
    skipped: &'a [Diagnostic],
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.validate()?;

    let config = cli.to_config()?;
    let inputs = cli.collect_inputs().await?;
    tracing::debug!(inputs = inputs.len(), "Collected inputs");

    // stdout carries the PDF itself, so status lines must stay off it
    let formatter = if cli.json || cli.writes_to_stdout() {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::new(cli.quiet, cli.verbose)
    };

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", roverpdf::NAME, roverpdf::VERSION));
        formatter.blank_line();
    }

    let sink = Arc::new(CollectingSink::new());
    let mut assembly = Assembly::new(config)?.with_sink(sink.clone());

    for input in &inputs {
        let mime = input.resolved_mime();
        let title = input.resolved_bookmark(cli.bookmarks);
        formatter.debug(&format!("Adding {} ({mime})", input.path.display()));

        // Refusals are already in the sink and reported below.
        let _ = assembly.add_file(&input.path, &mime, title);
    }

    if assembly.count() == 0 {
        formatter.diagnostics(&sink.diagnostics());
        bail!("No documents to assemble");
    }

    formatter.info(&format!("Assembling {} document(s)...", assembly.count()));

    let result = if cli.dry_run {
        dry_run(&assembly).await?
    } else if cli.writes_to_stdout() {
        let mut stdout = tokio::io::stdout();
        assembly.save_to_writer(&mut stdout, true).await?
    } else {
        handle_output_overwrite(&cli.output, cli.overwrite_mode(), &formatter)?;
        assembly.save_to_path(&cli.output).await?
    };

    let skipped = sink.diagnostics();

    if cli.json {
        let report = Report {
            output: cli.output.display().to_string(),
            dry_run: cli.dry_run,
            page_count: result.page_count,
            bookmarks: &result.bookmarks,
            skipped: &skipped,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    formatter.diagnostics(&skipped);
    formatter.bookmarks(&result.bookmarks);
    formatter.blank_line();

    if cli.dry_run {
        formatter.success(&format!(
            "Dry run completed: {} pages from {} of {} input(s)",
            result.page_count,
            assembly.count() - skipped.iter().filter(|d| d.entry.is_some()).count(),
            inputs.len()
        ));
        formatter.info(&format!("  Output would be: {}", cli.output.display()));
    } else {
        formatter.success(&format!(
            "Created {} ({} pages)",
            cli.output.display(),
            result.page_count
        ));
    }

    if formatter.is_verbose() {
        let config = assembly.config();
        formatter.detail("Inputs", &inputs.len().to_string());
        formatter.detail("Skipped", &skipped.len().to_string());
        formatter.detail("Bookmarks", &result.bookmarks.len().to_string());
        formatter.detail(
            "Page numbers",
            if config.include_page_numbers { "Yes" } else { "No" },
        );
        formatter.detail("Compression", &format!("{:?}", config.compression));
        if !config.metadata.is_empty() {
            formatter.detail("Metadata", "Set");
        }
    }

    Ok(())
}

/// Assemble in memory only.
async fn dry_run(assembly: &Assembly) -> anyhow::Result<AssemblyResult> {
    Ok(assembly
        .assemble()
        .await?
        .map(|assembled| assembled.into_parts().1)
        .unwrap_or_default())
}

/// Decide whether an existing output file may be replaced.
fn handle_output_overwrite(
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    if !output.exists() {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => {
            bail!("Output file already exists: {}", output.display())
        }
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                bail!("Output file already exists: {}", output.display());
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .context("Failed to read confirmation")?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => bail!("Cancelled"),
            }
        }
    }
}
