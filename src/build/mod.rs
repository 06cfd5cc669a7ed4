//! Outline assembly and hierarchy repair.

mod builder;
mod validator;

pub use builder::{confidence_stats, OutlineBuilder};
pub use validator::{HierarchyIssues, HierarchyValidator};
