pub(crate) mod error;
pub(crate) mod export;
pub(crate) mod scene;
pub(crate) mod utils;

use anyhow::{Context, Result};
use export::{build_world, policy};
use log::info;
use scene::dump::SceneDump;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

/// Names the output file
const EXPORT_PATH: &str = "EXPORT_PATH";

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "mobius_export")]
struct CliArgs {
    /// Folder holding one `.scene` file per scene
    #[structopt(parse(from_os_str))]
    input: PathBuf,
    /// Policy file, defaults to `export.toml` inside the input folder
    #[structopt(short = "p", long = "policy", parse(from_os_str))]
    policy: Option<PathBuf>,
    /// Output debug info
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

/// Happens during setup, before any scene is read
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Environment variable {0} is not set")]
    MissingExportPath(&'static str),
    #[error("Input folder does not exist: {0}")]
    InputFolderNonExistant(String),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    let output = output_path(std::env::var_os(EXPORT_PATH))?;
    export(&args, &output)
}

/// Output file named by the value of `EXPORT_PATH`
fn output_path(value: Option<OsString>) -> Result<PathBuf, CliError> {
    value
        .map(PathBuf::from)
        .ok_or(CliError::MissingExportPath(EXPORT_PATH))
}

/// Builds the whole world in memory and only then writes `output`
fn export(args: &CliArgs, output: &Path) -> Result<()> {
    if !args.input.is_dir() {
        return Err(CliError::InputFolderNonExistant(args.input.display().to_string()).into());
    }

    let policy = policy::load(args.policy.as_deref(), &args.input)?;
    let scenes = SceneDump::load(&args.input)
        .with_context(|| format!("Could not load scenes from {}", args.input.display()))?;

    let world = build_world(&scenes, &policy)?;
    world
        .write_to_file(output, &policy.text)
        .with_context(|| format!("Could not write world file: {}", output.display()))?;

    info!("Wrote {} chunks to {}", world.chunk.len(), output.display());
    Ok(())
}
