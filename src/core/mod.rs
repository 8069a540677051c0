//! Core data structures for Quay.
//!
//! This module contains the foundational types used throughout Quay:
//! - Recipe descriptors and the recipe table
//! - Versions, fetch strategies, patches, variants and dependencies
//! - Applicability conditions
//! - Resolved specs handed in by the resolver

pub mod bound;
pub mod condition;
pub mod cxxstd;
pub mod dependency;
pub mod errors;
pub mod patch;
pub mod range;
pub mod recipe;
pub mod source;
pub mod spec;
pub mod table;
pub mod variant;
pub mod version;

pub use bound::BoundSpec;
pub use condition::{Condition, Subject};
pub use cxxstd::CxxFloor;
pub use dependency::{DepType, DependencyDecl};
pub use errors::{RecipeError, SpecError};
pub use patch::{Patch, SelectedPatch};
pub use recipe::{BuildHooks, Recipe, RecipeBuilder};
pub use source::{Checksum, FetchSource, FetchStrategy, GitReference, VersionEntry};
pub use spec::{ResolvedSpec, SpecNode};
pub use table::RecipeTable;
pub use variant::{Variant, VariantValue};
pub use version::RecipeVersion;
