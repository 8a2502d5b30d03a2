//! Connector entity - a housing with an ordered list of pins

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{HarnessError, Result};
use crate::core::identity::{PartNumberInfo, AUTOGENERATED_PREFIX};
use crate::core::reference::{Reference, Symbol};
use crate::core::resolver::{resolve_one, NameTable, SymbolTable};
use crate::entities::component::AdditionalComponent;

/// Style value for single-pin connectors (ferrules, splices, ...)
pub const SIMPLE_STYLE: &str = "simple";

/// Side of a connector a wire or mate attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Quantity multipliers understood by connectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorMultiplier {
    /// Total number of pins
    PinCount,
    /// Number of pins with at least one connection or mate
    Populated,
}

impl std::str::FromStr for ConnectorMultiplier {
    type Err = HarnessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pincount" => Ok(ConnectorMultiplier::PinCount),
            "populated" => Ok(ConnectorMultiplier::Populated),
            _ => Err(HarnessError::InvalidMultiplier {
                multiplier: s.to_string(),
                kind: "connector",
            }),
        }
    }
}

/// Connector declaration as written in a harness document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectorSpec {
    #[serde(rename = "type")]
    pub part_type: Option<String>,
    pub subtype: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub pincount: Option<usize>,
    pub pins: Vec<Symbol>,
    pub pinlabels: Vec<Symbol>,
    pub pincolors: Vec<String>,
    /// Pairs of pins bridged inside the connector
    pub loops: Vec<Vec<Reference>>,
    pub show_name: Option<bool>,
    pub show_pincount: Option<bool>,
    pub hide_disconnected_pins: bool,
    pub additional_components: Vec<AdditionalComponent>,
    pub ignore_in_bom: bool,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub part_numbers: PartNumberInfo,
}

impl ConnectorSpec {
    pub fn with_pincount(pincount: usize) -> Self {
        Self {
            pincount: Some(pincount),
            ..Default::default()
        }
    }
}

/// A single pin of a connector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    /// Zero-based position
    pub index: usize,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Designator of the owning connector
    pub parent: String,
    /// Pin of an autogenerated connector
    #[serde(skip)]
    pub anonymous: bool,
    /// Pin of a simple (single-pin) connector
    #[serde(skip)]
    pub simple: bool,
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            (!self.anonymous).then_some(self.parent.as_str()),
            (!self.anonymous && !self.simple).then_some(self.id.as_str()),
            self.label.as_deref(),
        ];
        let parts: Vec<&str> = parts
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        write!(f, "{}", parts.join(":"))
    }
}

/// A connector with resolved pins and activation state
#[derive(Debug, Clone)]
pub struct Connector {
    pub designator: String,
    pub part_type: Option<String>,
    pub subtype: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    /// Resolved loops as pairs of pin indices
    pub loops: Vec<(usize, usize)>,
    pub show_name: bool,
    pub show_pincount: bool,
    pub hide_disconnected_pins: bool,
    pub additional_components: Vec<AdditionalComponent>,
    pub part_numbers: PartNumberInfo,
    pub ignore_in_bom: bool,
    pub notes: Option<String>,
    pins: Vec<Pin>,
    visible_pins: HashMap<String, bool>,
    ports_left: bool,
    ports_right: bool,
}

impl Connector {
    /// Build a connector from its declaration, validating pins and loops
    pub fn new(designator: impl Into<String>, spec: ConnectorSpec) -> Result<Self> {
        let designator = designator.into();
        let simple = spec.style.as_deref() == Some(SIMPLE_STYLE);
        let autogenerated = designator.starts_with(AUTOGENERATED_PREFIX);

        let mut pincount = spec.pincount.filter(|n| *n > 0);
        if simple {
            if matches!(pincount, Some(n) if n > 1) {
                return Err(HarnessError::structural(format!(
                    "{}: connectors with style set to simple may only have one pin",
                    designator
                )));
            }
            pincount = Some(1);
        }

        let pincount = match pincount {
            Some(n) => n,
            None => {
                let inferred = spec
                    .pins
                    .len()
                    .max(spec.pinlabels.len())
                    .max(spec.pincolors.len());
                if inferred == 0 {
                    return Err(HarnessError::structural(format!(
                        "{}: you need to specify at least one of pincount, pins, pinlabels or pincolors",
                        designator
                    )));
                }
                inferred
            }
        };

        if !spec.pins.is_empty() && spec.pins.len() != pincount {
            return Err(HarnessError::structural(format!(
                "{}: pincount is {} but {} pins are listed",
                designator,
                pincount,
                spec.pins.len()
            )));
        }
        if spec.pinlabels.len() > pincount || spec.pincolors.len() > pincount {
            return Err(HarnessError::structural(format!(
                "{}: more pin labels or colors than pins ({})",
                designator, pincount
            )));
        }

        let ids: Vec<String> = if spec.pins.is_empty() {
            (1..=pincount).map(|n| n.to_string()).collect()
        } else {
            spec.pins.iter().map(|p| p.to_string()).collect()
        };

        let mut seen = std::collections::HashSet::new();
        if !ids.iter().all(|id| seen.insert(id.as_str())) {
            return Err(HarnessError::structural(format!(
                "{}: pins are not unique",
                designator
            )));
        }

        let pins: Vec<Pin> = ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| Pin {
                index,
                id,
                label: spec.pinlabels.get(index).map(|l| l.to_string()),
                color: spec
                    .pincolors
                    .get(index)
                    .filter(|c| !c.is_empty())
                    .cloned(),
                parent: designator.clone(),
                anonymous: autogenerated,
                simple,
            })
            .collect();

        let visible_pins = pins.iter().map(|p| (p.id.clone(), false)).collect();

        let mut connector = Connector {
            designator,
            part_type: spec.part_type,
            subtype: spec.subtype,
            style: spec.style,
            color: spec.color,
            loops: Vec::new(),
            show_name: spec.show_name.unwrap_or(!simple && !autogenerated),
            show_pincount: spec.show_pincount.unwrap_or(!simple),
            hide_disconnected_pins: spec.hide_disconnected_pins,
            additional_components: spec.additional_components,
            part_numbers: spec.part_numbers,
            ignore_in_bom: spec.ignore_in_bom,
            notes: spec.notes,
            pins,
            visible_pins,
            ports_left: false,
            ports_right: false,
        };

        for pair in &spec.loops {
            let [a, b] = pair.as_slice() else {
                return Err(HarnessError::structural(format!(
                    "{}: loops must be between exactly two pins",
                    connector.designator
                )));
            };
            let looped = (resolve_one(&connector, a)?, resolve_one(&connector, b)?);
            connector.loops.push(looped);
        }

        Ok(connector)
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pincount(&self) -> usize {
        self.pins.len()
    }

    pub fn is_simple(&self) -> bool {
        self.style.as_deref() == Some(SIMPLE_STYLE)
    }

    pub fn is_autogenerated(&self) -> bool {
        self.designator.starts_with(AUTOGENERATED_PREFIX)
    }

    /// Activation map: pin id to whether anything attaches to it
    pub fn visible_pins(&self) -> &HashMap<String, bool> {
        &self.visible_pins
    }

    pub fn is_pin_active(&self, id: &str) -> bool {
        self.visible_pins.get(id).copied().unwrap_or(false)
    }

    pub fn should_show_pin(&self, id: &str) -> bool {
        !self.hide_disconnected_pins || self.is_pin_active(id)
    }

    pub fn populated_count(&self) -> usize {
        self.visible_pins.values().filter(|active| **active).count()
    }

    pub fn ports_left(&self) -> bool {
        self.ports_left
    }

    pub fn ports_right(&self) -> bool {
        self.ports_right
    }

    pub(crate) fn activate_pin(&mut self, index: usize, side: Side) {
        if let Some(pin) = self.pins.get(index) {
            self.visible_pins.insert(pin.id.clone(), true);
        }
        match side {
            Side::Left => self.ports_left = true,
            Side::Right => self.ports_right = true,
        }
    }

    /// Multiplier for additional components; only meaningful once the
    /// harness is fully connected
    pub(crate) fn qty_multiplier(&self, name: Option<&str>) -> Result<f64> {
        let multiplier = name
            .filter(|n| !n.is_empty())
            .map(str::parse::<ConnectorMultiplier>)
            .transpose()?;
        Ok(match multiplier {
            None => 1.0,
            Some(ConnectorMultiplier::PinCount) => self.pincount() as f64,
            Some(ConnectorMultiplier::Populated) => self.populated_count() as f64,
        })
    }
}

impl SymbolTable for Connector {
    fn designator(&self) -> &str {
        &self.designator
    }

    fn item_kind(&self) -> &'static str {
        "pin"
    }

    fn ids(&self) -> Vec<&str> {
        self.pins.iter().map(|p| p.id.as_str()).collect()
    }

    fn name_tables(&self) -> Vec<NameTable<'_>> {
        vec![NameTable {
            kind: "label",
            names: self.pins.iter().map(|p| p.label.as_deref()).collect(),
        }]
    }
}
