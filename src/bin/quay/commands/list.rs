//! `quay list` command

use anyhow::Result;
use serde_json::json;

use crate::cli::ListArgs;
use quay::recipes::builtin_table;

pub fn execute(args: ListArgs) -> Result<()> {
    let table = builtin_table()?;

    if args.json {
        let entries: Vec<_> = table
            .iter()
            .map(|recipe| {
                json!({
                    "name": recipe.name(),
                    "version": recipe.preferred_version().map(|v| v.to_string()),
                    "summary": recipe.summary(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = table.names().map(str::len).max().unwrap_or(0);
    for recipe in table.iter() {
        let version = recipe
            .preferred_version()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:width$}  {:<8}  {}",
            recipe.name(),
            version,
            recipe.summary(),
            width = width
        );
    }

    Ok(())
}
