//! `quay check` command
//!
//! Without `--spec`, validates recipe declarations. With `--spec`, checks a
//! resolved spec against the declarations of its root recipe.

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use quay::core::{RecipeError, ResolvedSpec};
use quay::ops::conformance::check_spec;
use quay::recipes::builtin_table;
use quay::util::diagnostic::{emit, suggestions, Diagnostic};

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let table = builtin_table()?;

    let Some(spec_path) = args.spec else {
        let recipes = match &args.recipe {
            Some(name) => vec![table.require(name)?],
            None => table.iter().collect(),
        };
        for recipe in recipes {
            recipe.validate()?;
            println!("ok  {} ({} versions)", recipe.name(), recipe.versions().len());
        }
        return Ok(());
    };

    let spec = ResolvedSpec::load(&spec_path)?;
    let name = args.recipe.as_deref().unwrap_or(spec.root_name());
    let recipe = table.require(name)?;
    if spec.root_name() != recipe.name() {
        return Err(RecipeError::SpecMismatch {
            recipe: recipe.name().to_string(),
            root: spec.root_name().to_string(),
        }
        .into());
    }

    let issues = check_spec(recipe, &spec)?;
    if issues.is_empty() {
        println!(
            "ok  {}@{} conforms to its recipe",
            spec.root_name(),
            spec.root().version
        );
        return Ok(());
    }

    for issue in &issues {
        emit(
            &Diagnostic::warning(issue.to_string()).with_location(&spec_path),
            color,
        );
    }

    tracing::debug!("{:#?}", issues);

    bail!(
        "{} issue(s) found in {}\n{}",
        issues.len(),
        spec_path.display(),
        suggestions::CHECK_FAILED
    )
}
