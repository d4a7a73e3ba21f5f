//! schemagen CLI - multi-target code generation from table-definition dumps.
//!
//! This tool parses an MDB/Jet schema dump and emits C++ and/or Python
//! source for every table it finds.

use clap::{Parser, Subcommand};
use schemagen::error::Failure;
use schemagen::parser::SchemaParser;
use schemagen::pipeline::Pipeline;
use schemagen::{backend, fs_utils};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "schemagen")]
#[command(version, about = "Multi-target code generation from table-definition dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate target-language source from a schema dump
    Generate {
        /// Path to the schema dump file
        #[arg(short, long)]
        schema: PathBuf,

        /// Output directory; files land under <output>/<backend id>/
        #[arg(short, long, default_value = "generated")]
        output: PathBuf,

        /// Comma-separated backend ids (cpp, python)
        #[arg(short, long, default_value = "cpp,python")]
        backends: String,

        /// Dot-separated package for generated artifacts (e.g. swim.db)
        #[arg(short, long)]
        package: Option<String>,

        /// Abort on the first failure instead of collecting them
        #[arg(long)]
        strict: bool,

        /// Write a JSON run report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Parse a schema dump and report classes and failures without generating
    Validate {
        /// Path to the schema dump file
        #[arg(short, long)]
        schema: PathBuf,
    },
}

/// JSON run report: per-backend file lists plus every recorded failure.
#[derive(Serialize)]
struct Report {
    classes: usize,
    files: Vec<ReportFile>,
    failures: Vec<Failure>,
}

#[derive(Serialize)]
struct ReportFile {
    backend: String,
    path: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { schema, output, backends, package, strict, report } => {
            generate(schema, output, backends, package, strict, report)
        }
        Commands::Validate { schema } => validate(schema),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn split_package(package: Option<String>) -> Vec<String> {
    package
        .map(|p| p.split('.').map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

fn generate(
    schema: PathBuf,
    output: PathBuf,
    backends: String,
    package: Option<String>,
    strict: bool,
    report: Option<PathBuf>,
) -> Result<(), String> {
    let text = std::fs::read_to_string(&schema)
        .map_err(|e| format!("failed to read {}: {}", schema.display(), e))?;

    let mut pipeline = Pipeline::new(SchemaParser::new()).strict(strict);
    for id in backends.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let backend = backend::by_id(id)
            .ok_or_else(|| format!("unknown backend '{}' (available: cpp, python)", id))?;
        pipeline = pipeline.backend(backend);
    }

    let package = split_package(package);
    let mut generation = pipeline
        .run_text(&text, &package)
        .map_err(|failure| failure.to_string())?;

    println!("  ✓ Parsed {} classes from {}", generation.classes.len(), schema.display());

    let mut written = 0usize;
    for (backend_id, files) in &generation.files {
        for file in files {
            let dest = output.join(backend_id).join(&file.path);
            match fs_utils::write_file(&dest, &file.content) {
                Ok(()) => written += 1,
                Err(err) => {
                    if strict {
                        return Err(err.to_string());
                    }
                    generation.failures.push(Failure::new(
                        None,
                        None,
                        Some(backend_id.clone()),
                        &err,
                    ));
                }
            }
        }
    }
    println!("  ✓ Wrote {} files under {}", written, output.display());

    if let Some(report_path) = report {
        let report = Report {
            classes: generation.classes.len(),
            files: generation
                .files
                .iter()
                .flat_map(|(backend_id, files)| {
                    files.iter().map(move |f| ReportFile {
                        backend: backend_id.clone(),
                        path: f.path.clone(),
                    })
                })
                .collect(),
            failures: generation.failures.clone(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize report: {}", e))?;
        fs_utils::write_file(&report_path, json).map_err(|e| e.to_string())?;
        println!("  ✓ Report written to {}", report_path.display());
    }

    if !generation.failures.is_empty() {
        for failure in &generation.failures {
            eprintln!("  ✗ {}", failure);
        }
        return Err(format!("{} failure(s) recorded", generation.failures.len()));
    }

    Ok(())
}

fn validate(schema: PathBuf) -> Result<(), String> {
    let text = std::fs::read_to_string(&schema)
        .map_err(|e| format!("failed to read {}: {}", schema.display(), e))?;

    let parsed = SchemaParser::new().parse(&text, &[]);

    for clss in &parsed.classes {
        let keyed = match clss.key_member() {
            Some(key) => format!("keyed by {}", key.column_name()),
            None => "unkeyed".to_string(),
        };
        println!(
            "  ✓ {} ({} members, {})",
            clss.class_name(),
            clss.members().len(),
            keyed
        );
    }

    if !parsed.failures.is_empty() {
        for failure in &parsed.failures {
            eprintln!("  ✗ {}", failure);
        }
        return Err(format!("{} failure(s) recorded", parsed.failures.len()));
    }

    println!("  ✓ {} classes, no failures", parsed.classes.len());
    Ok(())
}
