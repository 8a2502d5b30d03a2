//! Core module - resolution, connection building and BOM aggregation

pub mod bom;
pub mod config;
pub mod error;
pub mod graph;
pub mod harness;
pub mod identity;
pub mod loader;
pub mod reference;
pub mod resolver;

pub use bom::{Bom, BomEntry, BomLine};
pub use config::{BuildOptions, Config};
pub use error::{HarnessError, Result};
pub use harness::{FinalizedHarness, Harness};
pub use identity::{BomHash, BomKey, ComponentKind, PartNumberInfo};
pub use reference::{Endpoint, Reference};
