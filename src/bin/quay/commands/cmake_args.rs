//! `quay cmake-args` command

use anyhow::Result;

use crate::cli::CmakeArgsArgs;
use quay::core::ResolvedSpec;
use quay::recipes::builtin_table;

pub fn execute(args: CmakeArgsArgs) -> Result<()> {
    let spec = ResolvedSpec::load(&args.spec)?;

    let table = builtin_table()?;
    let recipe = table.require(spec.root_name())?;

    for define in recipe.cmake_args(&spec)? {
        println!("{}", define.to_flag());
    }

    Ok(())
}
