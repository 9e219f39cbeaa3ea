//! pdfmeld - merge ordered PDF inputs into a single document.

use clap::Parser;
use std::process;

use pdfmeld::cli::Cli;
use pdfmeld::engine::LopdfEngine;
use pdfmeld::fs_util::SystemFileUtilities;
use pdfmeld::merger::Merger;
use pdfmeld::resolver::GlobResolver;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> pdfmeld::Result<()> {
    let file_utils = if cli.no_open {
        SystemFileUtilities::headless()
    } else {
        SystemFileUtilities::new()
    };

    let merger = Merger::new(
        GlobResolver::new(),
        file_utils,
        LopdfEngine::new(),
        cli.output.clone(),
    )?;

    if !cli.quiet && !cli.json {
        println!("Merging {} input(s)...", cli.inputs.len());
    }

    let report = merger.merge(&cli.inputs)?;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{report:?}"),
        }
    } else if cli.quiet {
        println!("{}", report.output_path.display());
    } else {
        println!(
            "✓ Merged {} document(s) into {} pages",
            report.sources_merged, report.total_pages
        );
        println!("  Output: {}", report.output_path.display());
    }

    Ok(())
}
