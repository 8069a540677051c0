//! Quay - declarative recipes for source-built native packages
//!
//! This crate provides the recipe descriptors, the built-in recipe table and
//! the operations that turn a resolved spec into fetch sources, patch lists,
//! CMake arguments and build plans.

pub mod builder;
pub mod core;
pub mod ops;
pub mod recipes;
pub mod util;

pub use crate::core::{Recipe, RecipeTable, RecipeVersion, ResolvedSpec};

pub use builder::CMakeDefine;
pub use recipes::builtin_table;
