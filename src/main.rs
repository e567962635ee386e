//! `vtkwrap`: CLI front end over the wrapping pipeline.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vtk_wrap_introspect::config::{FileConfig, ResolvedConfig};
use vtk_wrap_introspect::driver::{run_job, serialize_job, JobConfig};
use vtk_wrap_introspect::error::Error;
use vtk_wrap_introspect::arena::StringArena;
use vtk_wrap_introspect::hints::{HintFile, NoSuperclasses};

#[derive(Parser)]
#[command(name = "vtkwrap", version, about = "Synthesizes instance-variable descriptions from VTK-style C++ accessor conventions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parses a header and emits its XML class interface description.
    Wrap {
        header: PathBuf,
        #[arg(long)]
        hints: Option<PathBuf>,
        #[arg(long)]
        hierarchy: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        template_args: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parses and classifies a header without emitting XML; prints a
    /// function/variable count summary per class.
    Check { header: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "job failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    match cli.command {
        Command::Wrap { header, hints, hierarchy, template_args, output } => {
            wrap(&header, hints, hierarchy, template_args, output)
        }
        Command::Check { header } => check(&header),
    }
}

fn wrap(
    header: &Path,
    cli_hints: Option<PathBuf>,
    cli_hierarchy: Option<PathBuf>,
    template_args: Vec<String>,
    cli_output: Option<PathBuf>,
) -> Result<(), Error> {
    let file_config = FileConfig::load(Path::new("vtkwrap.toml"))?;
    let resolved = ResolvedConfig::resolve(&file_config, cli_hints, cli_hierarchy, cli_output);

    let arena = StringArena::new();
    let header_text = std::fs::read_to_string(header)?;

    let hint_file = resolved.hints.as_ref().map(|p| HintFile::load(p)).transpose()?;
    let args: Vec<&str> = template_args.iter().map(String::as_str).collect();

    let resolver = NoSuperclasses;
    let mut config = JobConfig::new(&resolver);
    config.hints = hint_file.as_ref();
    config.template_args = &args;

    tracing::debug!(header = %header.display(), "running wrap job");
    let jobs = run_job(&arena, &header_text, &config)?;
    let xml = serialize_job(&jobs)?;
    std::fs::write(&resolved.output, xml)?;
    tracing::info!(output = %resolved.output.display(), classes = jobs.len(), "wrote XML");
    Ok(())
}

fn check(header: &Path) -> Result<(), Error> {
    let arena = StringArena::new();
    let header_text = std::fs::read_to_string(header)?;
    let resolver = NoSuperclasses;
    let config = JobConfig::new(&resolver);

    let jobs = run_job(&arena, &header_text, &config)?;
    for job in &jobs {
        println!(
            "{}: {} functions, {} variables",
            job.class.class_name,
            job.class.functions.len(),
            job.variables.len()
        );
    }
    Ok(())
}
