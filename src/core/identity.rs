//! Component identity - structural content keys used to merge BOM lines
//!
//! Two components share a BOM line when their [`BomHash`] values are equal.
//! The key is derived from a component's own fields only; designators and
//! declaration order never take part.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::core::error::{HarnessError, Result};
use crate::core::reference::optional_text;
use crate::entities::cable::Cable;
use crate::entities::component::{broadcast_optional, AdditionalComponent};
use crate::entities::connector::Connector;

/// Designator prefix for components created implicitly by the harness author
pub const AUTOGENERATED_PREFIX: &str = "AUTOGENERATED_";

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[aA] [^>]*>([^<]*)</[aA]>").expect("link pattern is a valid regex")
});

/// Replace `<a href=...>text</a>` with `text`
pub fn remove_links(text: &str) -> String {
    LINK_PATTERN.replace_all(text, "$1").into_owned()
}

fn clean_field(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(remove_links)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Sourcing information attached to a part
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct PartNumberInfo {
    /// Internal part number
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub pn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub manufacturer: Option<String>,
    /// Manufacturer part number
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub mpn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub supplier: Option<String>,
    /// Supplier part number
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
    pub spn: Option<String>,
}

impl PartNumberInfo {
    /// Copy with links stripped and blank fields dropped
    pub fn cleaned(&self) -> Self {
        Self {
            pn: clean_field(&self.pn),
            manufacturer: clean_field(&self.manufacturer),
            mpn: clean_field(&self.mpn),
            supplier: clean_field(&self.supplier),
            spn: clean_field(&self.spn),
        }
    }
}

/// Structural identity of a BOM line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BomHash {
    pub description: String,
    pub unit: Option<String>,
    pub part_numbers: PartNumberInfo,
}

impl BomHash {
    pub fn new(
        description: impl Into<String>,
        unit: Option<&str>,
        part_numbers: &PartNumberInfo,
    ) -> Self {
        Self {
            description: description.into(),
            unit: unit.filter(|u| !u.is_empty()).map(str::to_string),
            part_numbers: part_numbers.cleaned(),
        }
    }
}

/// Key of a component: one hash, or one per conductor for bundles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BomKey {
    Single(BomHash),
    PerWire(Vec<BomHash>),
}

impl BomKey {
    pub fn hashes(&self) -> Vec<&BomHash> {
        match self {
            BomKey::Single(hash) => vec![hash],
            BomKey::PerWire(hashes) => hashes.iter().collect(),
        }
    }
}

/// Anything that can appear in the BOM
#[derive(Debug, Clone, Copy)]
pub enum ComponentKind<'a> {
    Connector(&'a Connector),
    Cable(&'a Cable),
    Additional(&'a AdditionalComponent),
}

impl ComponentKind<'_> {
    pub fn tag(&self) -> ItemKind {
        match self {
            ComponentKind::Connector(_) => ItemKind::Connector,
            ComponentKind::Cable(_) => ItemKind::Cable,
            ComponentKind::Additional(_) => ItemKind::Additional,
        }
    }
}

/// Textual kind tag, as used by filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Connector,
    Cable,
    Additional,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Connector => "connector",
            ItemKind::Cable => "cable",
            ItemKind::Additional => "additional",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connector" => Ok(ItemKind::Connector),
            "cable" => Ok(ItemKind::Cable),
            "additional" => Ok(ItemKind::Additional),
            _ => Err(HarnessError::structural(format!(
                "unknown type of item `{}`",
                s
            ))),
        }
    }
}

fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn connector_description(connector: &Connector) -> String {
    let pins = connector
        .show_pincount
        .then(|| format!("{} pins", connector.pincount()));
    join_parts([
        Some("Connector"),
        connector.part_type.as_deref(),
        connector.subtype.as_deref(),
        pins.as_deref(),
        connector.color.as_deref(),
    ])
}

pub fn cable_description(cable: &Cable) -> String {
    let mut size = match cable.gauge_text() {
        Some(gauge) => format!("{} x {}", cable.wirecount(), gauge),
        None => format!("{} wires", cable.wirecount()),
    };
    if cable.is_shielded() {
        size.push_str(" shielded");
    }
    join_parts([
        Some("Cable"),
        cable.part_type.as_ref().and_then(|t| t.as_one()).map(String::as_str),
        cable.subtype.as_ref().and_then(|t| t.as_one()).map(String::as_str),
        Some(size.as_str()),
        cable.color.as_deref(),
    ])
}

/// One description per conductor of a bundle, in wire order
pub fn bundle_wire_descriptions(cable: &Cable) -> Result<Vec<String>> {
    let count = cable.wirecount();
    let types = broadcast_optional(&cable.part_type, count, "type")?;
    let subtypes = broadcast_optional(&cable.subtype, count, "subtype")?;
    let gauge = cable.gauge_text();

    Ok(cable
        .conductors()
        .iter()
        .zip(types.iter().zip(subtypes.iter()))
        .map(|(wire, (part_type, subtype))| {
            join_parts([
                Some("Wire"),
                part_type.as_deref(),
                subtype.as_deref(),
                gauge.as_deref(),
                wire.color.as_deref(),
            ])
        })
        .collect())
}

pub fn additional_description(item: &AdditionalComponent) -> String {
    join_parts([item.part_type.as_deref(), item.subtype.as_deref()])
}

/// Compute the BOM key of a component
pub fn bom_hash(kind: ComponentKind<'_>) -> Result<BomKey> {
    match kind {
        ComponentKind::Connector(connector) => Ok(BomKey::Single(BomHash::new(
            connector_description(connector),
            None,
            &connector.part_numbers,
        ))),
        ComponentKind::Cable(cable) if cable.is_bundle() => {
            let descriptions = bundle_wire_descriptions(cable)?;
            let part_numbers = cable.per_wire_part_numbers()?;
            Ok(BomKey::PerWire(
                descriptions
                    .into_iter()
                    .zip(part_numbers.iter())
                    .map(|(description, pn)| {
                        BomHash::new(description, Some(cable.length_unit.as_str()), pn)
                    })
                    .collect(),
            ))
        }
        ComponentKind::Cable(cable) => Ok(BomKey::Single(BomHash::new(
            cable_description(cable),
            Some(cable.length_unit.as_str()),
            &cable.scalar_part_numbers(),
        ))),
        ComponentKind::Additional(item) => Ok(BomKey::Single(BomHash::new(
            additional_description(item),
            item.unit.as_deref(),
            &item.part_numbers,
        ))),
    }
}
