//! Quay CLI - inspect recipes and plan builds from resolved specs

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::core::{RecipeError, SpecError};
use quay::util::config::{global_config_path, load_config, project_config_path, Config};
use quay::util::diagnostic::{emit, Diagnostic};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = settings();
    let color = !cli.no_color
        && config
            .output
            .color
            .unwrap_or_else(|| std::io::stderr().is_terminal());

    if let Err(e) = run(cli.command, &config, color) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn settings() -> Config {
    let project_root = std::env::current_dir().unwrap_or_default();
    load_config(
        global_config_path().as_deref(),
        &project_config_path(&project_root),
    )
}

fn run(command: Commands, config: &Config, color: bool) -> Result<()> {
    match command {
        Commands::List(args) => commands::list::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Url(args) => commands::url::execute(args),
        Commands::Patches(args) => commands::patches::execute(args),
        Commands::CmakeArgs(args) => commands::cmake_args::execute(args),
        Commands::Plan(args) => commands::plan::execute(args, config),
        Commands::Check(args) => commands::check::execute(args, color),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Render an error, using a structured diagnostic when the cause is one of
/// ours.
fn report(err: &anyhow::Error, color: bool) {
    let diagnostic = if let Some(e) = err.downcast_ref::<RecipeError>() {
        Some(e.to_diagnostic())
    } else {
        err.downcast_ref::<SpecError>().map(SpecError::to_diagnostic)
    };

    match diagnostic {
        Some(diag) => {
            let outer = err.to_string();
            let diag = if outer != diag.message {
                with_outer_context(diag, outer)
            } else {
                diag
            };
            emit(&diag, color);
        }
        None => eprintln!("error: {:#}", err),
    }
}

fn with_outer_context(mut diag: Diagnostic, outer: String) -> Diagnostic {
    diag.context.insert(0, outer);
    diag
}
