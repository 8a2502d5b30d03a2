//! Additional components and field types shared by connectors and cables

use serde::{Deserialize, Serialize};

use crate::core::error::{HarnessError, Result};
use crate::core::identity::PartNumberInfo;

/// A field given either once or once per wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T: Clone> OneOrMany<T> {
    /// The single value, if this is not a list
    pub fn as_one(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(_) => None,
        }
    }

    /// Align to `count` entries, repeating a single value
    ///
    /// A list must already have exactly `count` entries.
    pub fn broadcast(&self, count: usize, field: &str) -> Result<Vec<T>> {
        match self {
            OneOrMany::One(value) => Ok(vec![value.clone(); count]),
            OneOrMany::Many(values) if values.len() == count => Ok(values.clone()),
            OneOrMany::Many(values) => Err(HarnessError::structural(format!(
                "{} lists {} entries but the bundle has {} wires; lists of part data must match wirecount",
                field,
                values.len(),
                count
            ))),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// Broadcast an optional field, producing `None` for every wire when absent
pub fn broadcast_optional<T: Clone>(
    field: &Option<OneOrMany<T>>,
    count: usize,
    name: &str,
) -> Result<Vec<Option<T>>> {
    match field {
        None => Ok(vec![None; count]),
        Some(values) => Ok(values.broadcast(count, name)?.into_iter().map(Some).collect()),
    }
}

fn default_qty() -> f64 {
    1.0
}

/// An extra BOM item: standalone, or attached to a connector or cable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalComponent {
    /// Component type (e.g. "Crimp ferrule")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// Base quantity, scaled by the multiplier
    #[serde(default = "default_qty")]
    pub qty: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Name of the multiplier rule (pincount, populated, wirecount, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty_multiplier: Option<String>,

    /// Designators, for items declared in the standalone section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designators: Option<OneOrMany<String>>,

    #[serde(flatten)]
    pub part_numbers: PartNumberInfo,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_in_bom: bool,
}

impl AdditionalComponent {
    pub fn new(part_type: impl Into<String>) -> Self {
        Self {
            part_type: Some(part_type.into()),
            subtype: None,
            qty: 1.0,
            unit: None,
            qty_multiplier: None,
            designators: None,
            part_numbers: PartNumberInfo::default(),
            ignore_in_bom: false,
        }
    }

    pub fn with_multiplier(mut self, multiplier: impl Into<String>) -> Self {
        self.qty_multiplier = Some(multiplier.into());
        self
    }

    pub fn with_qty(mut self, qty: f64) -> Self {
        self.qty = qty;
        self
    }

    /// Designators listed on the item itself
    pub fn designator_list(&self) -> Vec<String> {
        self.designators
            .as_ref()
            .map(|d| d.to_vec())
            .unwrap_or_default()
    }
}
