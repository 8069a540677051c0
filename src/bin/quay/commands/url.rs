//! `quay url` command

use anyhow::Result;

use crate::cli::UrlArgs;
use quay::recipes::builtin_table;

pub fn execute(args: UrlArgs) -> Result<()> {
    let table = builtin_table()?;
    let recipe = table.require(&args.recipe)?;

    let url = recipe.url_for_version(&args.version)?;
    println!("{}", url);

    Ok(())
}
