//! wirekit: wiring harness toolkit
//!
//! Resolves declarative harness descriptions (connectors, cables, connections
//! and mates) into a connection graph and a deduplicated bill of materials.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
