//! Recipe and resolved-spec error types.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised by a recipe or one of its hooks.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("invalid version token `{token}`")]
    InvalidVersion { token: String },

    #[error("recipe `{recipe}` does not declare version `{version}`")]
    UnknownVersion {
        recipe: String,
        version: String,
        available: Vec<String>,
    },

    #[error("recipe `{recipe}` cannot resolve version `{version}`: {reason}")]
    UnsupportedVersion {
        recipe: String,
        version: String,
        reason: String,
    },

    #[error("invalid url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid sha256 checksum `{value}`")]
    InvalidChecksum { value: String },

    #[error("resolved spec for `{recipe}` has no node for dependency `{dependency}`")]
    MissingDependency { recipe: String, dependency: String },

    #[error("resolved spec is rooted at `{root}`, not at recipe `{recipe}`")]
    SpecMismatch { recipe: String, root: String },

    #[error("variant `{variant}` is not set on `{package}`")]
    MissingVariant { package: String, variant: String },

    #[error("invalid recipe `{recipe}`: {reason}")]
    InvalidRecipe { recipe: String, reason: String },

    #[error("recipe `{name}` is already registered")]
    DuplicateRecipe { name: String },

    #[error("unknown recipe `{name}`")]
    UnknownRecipe {
        name: String,
        suggestions: Vec<String>,
    },
}

/// Error raised while building or querying a resolved spec.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("root node `{root}` is missing from the resolved spec")]
    MissingRoot { root: String },

    #[error("node `{from}` depends on `{to}`, which is not in the resolved spec")]
    DanglingEdge { from: String, to: String },

    #[error("cycle detected in resolved spec")]
    Cycle { packages: Vec<String> },

    #[error("install prefix for `{package}` is not absolute: {prefix}")]
    RelativePrefix { package: String, prefix: String },

    #[error("package `{name}` appears more than once in the resolved spec")]
    DuplicateNode { name: String },

    #[error("node keyed as `{key}` is named `{name}`")]
    NameMismatch { key: String, name: String },

    #[error("no node named `{name}` in the resolved spec")]
    UnknownNode { name: String },
}

impl RecipeError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RecipeError::UnknownVersion {
                recipe, available, ..
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !available.is_empty() {
                    diag = diag.with_context(format!(
                        "declared versions: {}",
                        available.join(", ")
                    ));
                }
                diag.with_suggestion(format!("Run `quay info {}` to list its versions", recipe))
            }

            RecipeError::InvalidVersion { .. } => Diagnostic::error(self.to_string())
                .with_context("versions are dotted integers (1.12.1) or branch names (master)"),

            RecipeError::MissingDependency { dependency, .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(format!(
                    "Re-run the resolver so that `{}` is part of the spec",
                    dependency
                ))
            }

            RecipeError::MissingVariant { package, variant } => {
                Diagnostic::error(self.to_string()).with_suggestion(format!(
                    "Set `{}` in [nodes.{}.variants]",
                    variant, package
                ))
            }

            RecipeError::UnknownRecipe {
                suggestions: similar,
                ..
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !similar.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", similar.join(", ")));
                }
                diag.with_suggestion(suggestions::UNKNOWN_RECIPE)
            }

            _ => Diagnostic::error(self.to_string()),
        }
    }
}

impl SpecError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SpecError::Cycle { packages } => Diagnostic::error(self.to_string())
                .with_context(format!("cycle: {}", packages.join(" -> ")))
                .with_suggestion("Resolved specs must form a DAG; check the resolver output"),

            SpecError::DanglingEdge { to, .. } => Diagnostic::error(self.to_string())
                .with_suggestion(format!("Add a [nodes.{}] table to the spec", to)),

            _ => Diagnostic::error(self.to_string()),
        }
    }
}
