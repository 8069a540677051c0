//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use quay::util::config::OutputFormat;
use quay::RecipeVersion;

/// Quay - declarative recipes for source-built native packages
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in recipes
    List(ListArgs),

    /// Show everything a recipe declares
    Info(InfoArgs),

    /// Print the archive URL of a release
    Url(UrlArgs),

    /// Print the patches applied to a version
    Patches(PatchesArgs),

    /// Print the CMake arguments for a resolved spec
    CmakeArgs(CmakeArgsArgs),

    /// Show the build plan for a resolved spec
    Plan(PlanArgs),

    /// Validate recipes, or check a resolved spec against its recipe
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Recipe name
    pub recipe: String,
}

#[derive(Args)]
pub struct UrlArgs {
    /// Recipe name
    pub recipe: String,

    /// Release version (e.g. 1.12.1)
    pub version: RecipeVersion,
}

#[derive(Args)]
pub struct PatchesArgs {
    /// Recipe name
    pub recipe: String,

    /// Version (release or branch)
    pub version: RecipeVersion,
}

#[derive(Args)]
pub struct CmakeArgsArgs {
    /// Resolved spec file (TOML, or JSON with a .json extension)
    pub spec: PathBuf,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Resolved spec file (TOML, or JSON with a .json extension)
    pub spec: PathBuf,

    /// Emit the plan as JSON (shorthand for --format json)
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Output format (defaults to [output] format in config, then text)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Archive mirror, overriding [fetch] mirror in config
    #[arg(long, env = "QUAY_MIRROR")]
    pub mirror: Option<url::Url>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Recipe to check (defaults to all, or the spec's root)
    pub recipe: Option<String>,

    /// Check this resolved spec against the recipe
    #[arg(long)]
    pub spec: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
