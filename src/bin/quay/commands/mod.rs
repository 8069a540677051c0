//! Command implementations

pub mod check;
pub mod cmake_args;
pub mod completions;
pub mod info;
pub mod list;
pub mod patches;
pub mod plan;
pub mod url;
