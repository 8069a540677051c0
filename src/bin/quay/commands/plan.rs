//! `quay plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use quay::core::ResolvedSpec;
use quay::ops::plan::{BuildPlan, PlanOptions};
use quay::recipes::builtin_table;
use quay::util::config::{Config, OutputFormat};

pub fn execute(args: PlanArgs, config: &Config) -> Result<()> {
    let spec = ResolvedSpec::load(&args.spec)?;
    let table = builtin_table()?;

    let mut options = PlanOptions::from_config(config);
    if args.mirror.is_some() {
        options.mirror = args.mirror;
    }

    let plan = BuildPlan::for_spec(&table, &spec, &options)?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        args.format
            .or(config.output.format)
            .unwrap_or(OutputFormat::Text)
    };

    match format {
        OutputFormat::Json => println!("{}", plan.to_json()?),
        OutputFormat::Text => print!("{}", plan.render()),
    }

    Ok(())
}
