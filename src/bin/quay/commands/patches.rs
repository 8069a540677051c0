//! `quay patches` command
//!
//! Prints the patch files selected for a version, one per line, in the
//! order they are applied.

use anyhow::Result;

use crate::cli::PatchesArgs;
use quay::recipes::builtin_table;

pub fn execute(args: PatchesArgs) -> Result<()> {
    let table = builtin_table()?;
    let recipe = table.require(&args.recipe)?;

    let patches = recipe.patches_for(&args.version);
    tracing::debug!(
        "{} of {} patches apply to {}@{}",
        patches.len(),
        recipe.patches().len(),
        recipe.name(),
        args.version
    );

    for patch in patches {
        println!("{}", patch.file);
    }

    Ok(())
}
