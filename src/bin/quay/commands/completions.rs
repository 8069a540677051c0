//! `quay completions` command

use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsArgs};

/// Completions are registered under the installed binary name, not the
/// package name.
const BIN_NAME: &str = "quay";

pub fn execute(args: CompletionsArgs) -> Result<()> {
    tracing::debug!("Generating {} completions for {}", args.shell, BIN_NAME);

    let mut cmd = Cli::command();
    let mut out = io::stdout().lock();
    generate(args.shell, &mut cmd, BIN_NAME, &mut out);
    out.flush()?;
    Ok(())
}
