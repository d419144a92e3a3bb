use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use log::info;

use signalalign_pipeline::engine::LocalEngine;
use signalalign_pipeline::entrypoints::EntryPoints;
use signalalign_pipeline::error::UserInputError;
use signalalign_pipeline::pipeline::{self, PipelineKind, RunRequest};
use signalalign_pipeline::templates::{self, Generated};
use signalalign_pipeline::WorkingDirectory;

/// Run signalAlign pipelines over the samples listed in a manifest
///
/// Start with `generate` (or `generate-readstore`), fill in the config and manifest, then
/// `run` (or `run-readstore`). Rerun with --restart to resume unfinished work.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generates a config file and manifest for your run, do this first
    Generate(GenerateArgs),
    /// Runs the alignment workflow on every sample in the manifest
    Run(RunArgs),
    /// Generates a config file and manifest for making a readstore
    GenerateReadstore(GenerateArgs),
    /// Generates a readstore from tarballs of .fast5s
    RunReadstore(RunReadstoreArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Directory to write the config and manifest to
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the (filled in) config file, generated with "generate"
    #[arg(long, default_value = "config-signalAlign.yaml")]
    config: PathBuf,

    /// Path to the (filled in) manifest file, generated with "generate"
    #[arg(long, default_value = "manifest-signalAlign.tsv")]
    manifest: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct RunReadstoreArgs {
    /// Path to the (filled in) config file, generated with "generate-readstore"
    #[arg(long, default_value = "config-signalAlign-readstore.yaml")]
    config: PathBuf,

    /// Path to the (filled in) manifest file, generated with "generate-readstore"
    #[arg(long, default_value = "manifest-signalAlign-readstore.tsv")]
    manifest: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Workflow engine options
#[derive(Args, Debug)]
struct EngineArgs {
    /// Job store holding persisted workflow state
    #[arg(value_name = "JOB_STORE")]
    job_store: PathBuf,

    /// Resume unfinished root jobs in the job store instead of starting new ones
    #[arg(long)]
    restart: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args_os().len() == 1 {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    let cli = Cli::parse();
    match dispatch(cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<UserInputError>() {
            Some(user_error) => {
                eprintln!("{user_error}");
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate(PipelineKind::Alignment, args),
        Command::GenerateReadstore(args) => generate(PipelineKind::Readstore, args),
        Command::Run(args) => run(PipelineKind::Alignment, args.config, args.manifest, args.engine),
        Command::RunReadstore(args) => run(PipelineKind::Readstore, args.config, args.manifest, args.engine),
    }
}

fn generate(kind: PipelineKind, args: GenerateArgs) -> Result<()> {
    let wd = WorkingDirectory { path: args.dir };
    for generated in templates::generate(kind, &wd)? {
        if let Generated::Created(path) = generated {
            println!("Wrote {}, edit it before running \"{}\"", path.display(), kind.run_command());
        }
    }
    Ok(())
}

fn run(kind: PipelineKind, config: PathBuf, manifest: PathBuf, engine_args: EngineArgs) -> Result<()> {
    let request = RunRequest { kind, config, manifest, restart: engine_args.restart };

    #[cfg(unix)]
    let _signals = signalalign_pipeline::shutdown::listen_for_signals(engine_args.job_store.clone(), |interrupt| {
        std::process::exit(i32::from(interrupt.exit_code()))
    })?;
    let engine = LocalEngine::new(engine_args.job_store, engine_args.restart, EntryPoints::default());

    let report = pipeline::run(&request, &engine)?;
    info!("{} finished: {} root job(s) completed in {} session(s)",
        kind.run_command(), report.completed.len(), report.sessions);
    Ok(())
}
