//! dumpfs - filesystem-in-a-file command-line tool

use anyhow::{Context, Result};
use clap::Parser;
use dumpfs::{ArchiveConfig, ArchiveFs, DirectorySink, Layout};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config =
        ArchiveConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(archive) = cli.archive {
        config.archive = archive;
    }
    if let Commands::Init { flat: true } = cli.command {
        config.layout = Layout::Flat;
    }

    let sink = DirectorySink::new(&config.extract_dir, config.extract_prefix.clone());
    let fs = ArchiveFs::new(config)?;

    if !matches!(cli.command, Commands::Init { .. }) {
        // The archive springs into existence on first use
        fs.ensure_initialized()?;
    }
    execute(&fs, cli.command, sink)
}

fn execute(fs: &ArchiveFs, command: Commands, mut sink: DirectorySink) -> Result<()> {
    match command {
        Commands::Init { .. } => {
            fs.initialize()?;
            println!("Filesystem initialized");
        }
        Commands::Write { name } => {
            let entry = fs.write_file(&name)?;
            let directory = entry.path.trim_end_matches('/');
            println!("File written to: {}/{}", directory, entry.name);
        }
        Commands::Read { name } => {
            let target = fs.read_file(&name, &mut sink)?;
            println!("File extracted to: {}", target.display());
        }
        Commands::List { json } => {
            let listing = fs.list_directory()?;
            if json {
                println!("{}", listing.to_json()?);
            } else {
                print!("{}", listing);
            }
        }
        Commands::Mkdir { name } => {
            let path = fs.create_directory(&name)?;
            println!("Directory created: {}", path);
        }
        Commands::Cd { path } => {
            let path = fs.change_directory(&path)?;
            println!("Current directory is now: {}", path);
        }
        Commands::Pwd => {
            println!("Current directory: {}", fs.working_directory()?);
        }
    }

    Ok(())
}
