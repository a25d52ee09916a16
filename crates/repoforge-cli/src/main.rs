//! Standalone generator binary: reads a JSON entity-description file,
//! runs the pipeline for the enabled backends and writes one generated
//! source unit per (entity, backend) pair.

use clap::{Parser, Subcommand, ValueEnum};
use repoforge_build::{Backend, DocumentBackend, EmitError, RunReport, SqlBackend, generate};
use repoforge_schema::{decl::SchemaDecl, validate::Severity};
use std::{fs, path::PathBuf, process::ExitCode};
use thiserror::Error as ThisError;
use tracing::{error, info, warn};

///
/// Cli
///

#[derive(Parser)]
#[command(name = "repoforge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate repository source units from a schema description.
    Generate {
        /// Path to the JSON entity-description file.
        #[arg(long)]
        schema: PathBuf,

        /// Output directory for generated units.
        #[arg(long, default_value = "generated")]
        out: PathBuf,

        /// Backend to generate for; may be given more than once.
        #[arg(long = "backend", value_enum)]
        backends: Vec<BackendArg>,

        /// Validate and plan only; write nothing.
        #[arg(long)]
        check: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum BackendArg {
    Sql,
    Document,
}

///
/// CliError
///

#[derive(Debug, ThisError)]
enum CliError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed schema description: {0}")]
    Schema(#[from] serde_json::Error),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(fatal) if fatal => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

// Returns whether any fatal diagnostic occurred.
fn run() -> Result<bool, CliError> {
    let Command::Generate {
        schema,
        out,
        backends,
        check,
    } = Cli::parse().command;

    let raw = fs::read_to_string(&schema)?;
    let decl: SchemaDecl = serde_json::from_str(&raw)?;

    let sql = SqlBackend;
    let document = DocumentBackend;
    let enabled: Vec<&dyn Backend> = backend_set(&backends, &sql, &document);

    let report = generate(&decl, &enabled)?;
    report_diagnostics(&report);

    if check {
        info!(units = report.units.len(), "check passed, nothing written");
        return Ok(report.has_fatal());
    }

    fs::create_dir_all(&out)?;
    for unit in &report.units {
        let path = out.join(&unit.file_name);
        fs::write(&path, &unit.source)?;
        info!(entity = %unit.entity, backend = %unit.backend, path = %path.display(), "wrote unit");
    }

    Ok(report.has_fatal())
}

// Enabled backends in registration order; both when none are named.
fn backend_set<'a>(
    args: &[BackendArg],
    sql: &'a SqlBackend,
    document: &'a DocumentBackend,
) -> Vec<&'a dyn Backend> {
    if args.is_empty() {
        return vec![sql, document];
    }

    let mut enabled: Vec<&dyn Backend> = Vec::new();
    for arg in args {
        match arg {
            BackendArg::Sql if !enabled.iter().any(|b| b.id() == "sql") => enabled.push(sql),
            BackendArg::Document if !enabled.iter().any(|b| b.id() == "document") => {
                enabled.push(document);
            }
            _ => {}
        }
    }
    enabled
}

fn report_diagnostics(report: &RunReport) {
    for diag in &report.diagnostics {
        let scope = diag.backend.unwrap_or("all backends");
        match diag.severity {
            Severity::Fatal => {
                error!(entity = %diag.entity, backend = %scope, code = %diag.code, "{}", diag.message);
            }
            Severity::Advisory => {
                warn!(entity = %diag.entity, backend = %scope, code = %diag.code, "{}", diag.message);
            }
        }
    }
}
