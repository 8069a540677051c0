//! CMake configure support.
//!
//! Recipes describe their configure step as a list of cache entries; this
//! module turns those into command lines.

pub mod cmake;

pub use cmake::{CMakeDefine, CMakeInvocation};
