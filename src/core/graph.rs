//! Serializable view of a finalized harness and the render context

use serde::Serialize;

use crate::core::harness::FinalizedHarness;
use crate::entities::cable::{Cable, Connection, Wire};
use crate::entities::mate::Mate;

/// Values a renderer needs that depend on the whole harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    /// Padding around wire color bars: wider when any wire is multicolored
    pub color_padding: usize,
}

impl RenderContext {
    pub fn for_cables(cables: &[Cable]) -> Self {
        let multicolor = cables
            .iter()
            .flat_map(|cable| cable.wires())
            .filter_map(|wire| wire.color.as_deref())
            .any(is_multicolor);
        RenderContext {
            color_padding: if multicolor { 3 } else { 1 },
        }
    }
}

/// More than one two-letter color code, e.g. "GNYE"
fn is_multicolor(color: &str) -> bool {
    color.len() > 2
        && color.len() % 2 == 0
        && color.chars().all(|c| c.is_ascii_uppercase())
}

#[derive(Debug, Serialize)]
pub struct PinView<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'a str>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectorView<'a> {
    pub designator: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'a str>,
    pub pins: Vec<PinView<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub loops: Vec<(&'a str, &'a str)>,
}

#[derive(Debug, Serialize)]
pub struct CableView<'a> {
    pub designator: &'a str,
    pub bundle: bool,
    pub length: f64,
    pub length_unit: &'a str,
    pub wires: &'a [Wire],
    pub connections: &'a [Connection],
}

/// The resolved connection graph
#[derive(Debug, Serialize)]
pub struct ConnectionGraph<'a> {
    pub connectors: Vec<ConnectorView<'a>>,
    pub cables: Vec<CableView<'a>>,
    pub mates: &'a [Mate],
    pub render: RenderContext,
}

impl<'a> ConnectionGraph<'a> {
    pub fn new(harness: &'a FinalizedHarness) -> Self {
        let connectors = harness
            .connectors()
            .iter()
            .map(|connector| {
                let pins = connector.pins();
                ConnectorView {
                    designator: &connector.designator,
                    style: connector.style.as_deref(),
                    pins: pins
                        .iter()
                        .map(|pin| PinView {
                            id: &pin.id,
                            label: pin.label.as_deref(),
                            color: pin.color.as_deref(),
                            active: connector.is_pin_active(&pin.id),
                        })
                        .collect(),
                    loops: connector
                        .loops
                        .iter()
                        .map(|(a, b)| (pins[*a].id.as_str(), pins[*b].id.as_str()))
                        .collect(),
                }
            })
            .collect();

        let cables = harness
            .cables()
            .iter()
            .map(|cable| CableView {
                designator: &cable.designator,
                bundle: cable.is_bundle(),
                length: cable.length,
                length_unit: &cable.length_unit,
                wires: cable.wires(),
                connections: cable.connections(),
            })
            .collect();

        ConnectionGraph {
            connectors,
            cables,
            mates: harness.mates(),
            render: harness.render_context(),
        }
    }
}
