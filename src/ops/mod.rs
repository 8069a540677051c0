//! High-level operations.
//!
//! This module contains the implementation of Quay commands that work on a
//! recipe and a resolved spec together.

pub mod conformance;
pub mod plan;

pub use conformance::{check_spec, ConformanceIssue};
pub use plan::{BuildPlan, PlanOptions, Stage};
