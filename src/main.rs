//! PDF Annotator - Entry point

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, OutputFormat, Plan};
use pdf_annotator::{Editor, Error, ErrorKind, RunOutcome};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_annotator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "Command arguments");

    let plan = match cli.into_plan() {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            return ExitCode::from(2);
        }
    };

    match run(plan) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<Error>() {
            Some(e) => {
                tracing::debug!("{:#}", err);
                eprintln!("Error: {}", e.user_message());
                if e.kind() == ErrorKind::Validation {
                    ExitCode::from(2)
                } else {
                    ExitCode::from(1)
                }
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::from(1)
            }
        },
    }
}

fn run(plan: Plan) -> anyhow::Result<()> {
    let editor = Editor::new(plan.config)?;
    let outcomes = editor.edit_terms(&plan.request, &plan.terms, &plan.colors)?;

    match plan.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&outcomes).context("Failed to render summary")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            for outcome in &outcomes {
                print_outcome(outcome);
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    match &outcome.search_str {
        Some(term) => println!(
            "{}: {} match(es) of '{}' in {} file(s)",
            outcome.action,
            outcome.total,
            term,
            outcome.files.len()
        ),
        None => println!(
            "{}: {} annotation(s) removed from {} file(s)",
            outcome.action,
            outcome.total,
            outcome.files.len()
        ),
    }

    for file in &outcome.files {
        match &file.output {
            Some(output) if *output != file.file => {
                println!("  {} -> {} ({})", file.file, output, file.count)
            }
            _ => println!("  {} ({})", file.file, file.count),
        }
        for hit in &file.hits {
            println!("    p.{}: {}", hit.page, hit.excerpt);
        }
    }

    if let Some(report) = &outcome.report {
        println!("  report: {}", report);
    }
}
