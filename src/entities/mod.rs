//! Harness entities
//!
//! - [`Connector`] - a housing with ordered pins
//! - [`Cable`] - wires (or a bundle of loose wires) with an optional shield
//! - [`AdditionalComponent`] - extra BOM items, attached or standalone
//! - [`Mate`] - direct pin-to-pin or component-to-component links

pub mod cable;
pub mod component;
pub mod connector;
pub mod mate;

pub use cable::{Cable, CableSpec, Connection, Wire};
pub use component::AdditionalComponent;
pub use connector::{Connector, ConnectorSpec, Pin};
pub use mate::{Arrow, Mate};
