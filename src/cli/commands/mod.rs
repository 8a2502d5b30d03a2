//! Command implementations

pub mod bom;
pub mod completions;
pub mod graph;
pub mod validate;
