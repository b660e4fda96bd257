mod report;

use anyhow::{Context, Result};
use clap::Parser;
use openapi_parser::Document;
use report::Format;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate an OpenAPI 3 document
#[derive(Parser, Debug)]
#[command(name = "validate-openapi")]
#[command(version)]
#[command(about = "Validate OpenAPI 3 documents and resolve their references", long_about = None)]
struct Args {
    /// Path to the YAML or JSON document to validate
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format for validation errors
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the document with every reference replaced by its target, as JSON
    #[arg(long)]
    resolved: bool,

    /// Print nothing; report through the exit status only
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "validate_openapi=info,openapi_parser=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns whether the document is valid.
fn run(args: Args) -> Result<bool> {
    info!(input = %args.input.display(), "validating");
    let document = Document::open(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let errors = document.errors();
    if args.quiet {
        return Ok(errors.is_empty());
    }

    let input = args.input.display().to_string();
    print!("{}", report::render(args.format, &input, errors));

    if args.resolved {
        let resolved = document
            .resolved_input()
            .map(|value| value.to_json())
            .unwrap_or(serde_json::Value::Null);
        let text = serde_json::to_string_pretty(&resolved).context("Failed to serialize resolved document")?;
        println!("{}", text);
    }

    Ok(errors.is_empty())
}
