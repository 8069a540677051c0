//! `quay info` command
//!
//! Shows everything a recipe declares: versions, variants, patches and
//! dependencies, with the condition each one applies under.

use anyhow::Result;

use crate::cli::InfoArgs;
use quay::core::{FetchStrategy, Recipe};
use quay::recipes::builtin_table;

pub fn execute(args: InfoArgs) -> Result<()> {
    let table = builtin_table()?;
    let recipe = table.require(&args.recipe)?;

    print!("{}", describe(recipe));

    Ok(())
}

fn describe(recipe: &Recipe) -> String {
    let mut out = format!("{}\n", recipe.name());
    if !recipe.description().is_empty() {
        out.push_str(&format!("  {}\n", recipe.description().trim()));
    }
    out.push('\n');

    if let Some(homepage) = recipe.homepage() {
        out.push_str(&format!("homepage:    {}\n", homepage));
    }
    if let Some(git) = recipe.git() {
        out.push_str(&format!("git:         {}\n", git));
    }
    if !recipe.maintainers().is_empty() {
        out.push_str(&format!("maintainers: {}\n", recipe.maintainers().join(", ")));
    }

    let preferred = recipe.preferred_version();
    out.push_str("\nversions:\n");
    for entry in recipe.versions() {
        let marker = if Some(&entry.version) == preferred {
            " (preferred)"
        } else {
            ""
        };
        let fetch = match &entry.fetch {
            FetchStrategy::Archive { sha256 } => format!("sha256={}", sha256),
            FetchStrategy::Git { reference } => format!("git {}", reference),
        };
        out.push_str(&format!("  {:<10} {}{}\n", entry.version.to_string(), fetch, marker));
    }

    if !recipe.variants().is_empty() {
        out.push_str("\nvariants:\n");
        for variant in recipe.variants() {
            out.push_str(&format!(
                "  {:<10} [{}]  {}\n",
                variant.name,
                variant.default_spec(),
                variant.description
            ));
        }
    }

    if !recipe.patches().is_empty() {
        out.push_str("\npatches:\n");
        for patch in recipe.patches() {
            out.push_str(&format!("  {}  when {}\n", patch.file, patch.when));
        }
    }

    if !recipe.dependencies().is_empty() {
        out.push_str("\ndependencies:\n");
        for dep in recipe.dependencies() {
            let types: Vec<String> = dep.types().map(|t| t.to_string()).collect();
            out.push_str(&format!("  {}  ({})", dep.constraint_string(), types.join(", ")));
            if !dep.condition().is_always() {
                out.push_str(&format!("  when {}", dep.condition()));
            }
            out.push('\n');
        }
    }

    if let Some(floor) = recipe.cxx_floor() {
        out.push_str(&format!(
            "\nc++ standard: {} is raised to {}\n",
            floor.tolerated, floor.required
        ));
    }

    out
}
