//! BOM aggregation - merge components with equal identity into line items

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::core::error::{HarnessError, Result};
use crate::core::identity::{bom_hash, BomHash, BomKey, ComponentKind, AUTOGENERATED_PREFIX};
use crate::entities::component::AdditionalComponent;

/// One component's share of a BOM line
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub hash: BomHash,
    pub designators: Vec<String>,
    pub qty: f64,
    pub category: String,
}

/// Accumulated quantity and designators for one BOM line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BomEntry {
    pub quantity: f64,
    pub designators: BTreeSet<String>,
    pub category: String,
}

impl BomEntry {
    /// Fold a contribution into this entry
    ///
    /// Quantities add up, designators are unioned (autogenerated ones are
    /// dropped) and the latest category wins.
    pub fn merge(mut self, contribution: Contribution) -> Self {
        self.quantity += contribution.qty;
        self.designators.extend(
            contribution
                .designators
                .into_iter()
                .filter(|d| !d.is_empty() && !d.starts_with(AUTOGENERATED_PREFIX)),
        );
        self.category = contribution.category;
        self
    }
}

/// Bill of materials, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct Bom {
    order: Vec<BomHash>,
    entries: HashMap<BomHash, BomEntry>,
}

impl Bom {
    pub fn from_contributions(contributions: impl IntoIterator<Item = Contribution>) -> Self {
        contributions.into_iter().fold(Bom::default(), Bom::add)
    }

    pub fn from_components(components: &[ComponentKind<'_>]) -> Result<Self> {
        let mut contributions = Vec::new();
        for component in components {
            contributions.extend(component_contributions(*component)?);
        }
        Ok(Self::from_contributions(contributions))
    }

    fn add(mut self, contribution: Contribution) -> Self {
        log::debug!(
            "bom: {} x {} ({})",
            contribution.qty,
            contribution.hash.description,
            contribution.category
        );
        let hash = contribution.hash.clone();
        let entry = match self.entries.remove(&hash) {
            Some(entry) => entry,
            None => {
                self.order.push(hash.clone());
                BomEntry::default()
            }
        };
        self.entries.insert(hash, entry.merge(contribution));
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BomHash, &BomEntry)> {
        self.order
            .iter()
            .filter_map(|hash| self.entries.get(hash).map(|entry| (hash, entry)))
    }

    /// Flattened, numbered lines for output
    pub fn lines(&self) -> Vec<BomLine> {
        self.iter()
            .enumerate()
            .map(|(i, (hash, entry))| {
                let mut designators: Vec<String> = entry.designators.iter().cloned().collect();
                designators.sort_by(|a, b| natord::compare(a, b));
                let pn = &hash.part_numbers;
                BomLine {
                    id: i + 1,
                    quantity: round_quantity(entry.quantity),
                    unit: hash.unit.clone(),
                    designators,
                    description: hash.description.clone(),
                    category: entry.category.clone(),
                    pn: pn.pn.clone(),
                    manufacturer: pn.manufacturer.clone(),
                    mpn: pn.mpn.clone(),
                    supplier: pn.supplier.clone(),
                    spn: pn.spn.clone(),
                }
            })
            .collect()
    }
}

fn round_quantity(quantity: f64) -> f64 {
    (quantity * 1000.0).round() / 1000.0
}

/// A numbered BOM row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomLine {
    pub id: usize,
    pub quantity: f64,
    pub unit: Option<String>,
    pub designators: Vec<String>,
    pub description: String,
    pub category: String,
    pub pn: Option<String>,
    pub manufacturer: Option<String>,
    pub mpn: Option<String>,
    pub supplier: Option<String>,
    pub spn: Option<String>,
}

fn single_hash(item: &AdditionalComponent) -> Result<BomHash> {
    match bom_hash(ComponentKind::Additional(item))? {
        BomKey::Single(hash) => Ok(hash),
        BomKey::PerWire(_) => Err(HarnessError::structural(
            "additional components have a single identity",
        )),
    }
}

fn attached_contributions(
    items: &[AdditionalComponent],
    designator: &str,
    category: &str,
    multiplier: impl Fn(Option<&str>) -> Result<f64>,
) -> Result<Vec<Contribution>> {
    items
        .iter()
        .filter(|item| !item.ignore_in_bom)
        .map(|item| {
            Ok(Contribution {
                hash: single_hash(item)?,
                designators: vec![designator.to_string()],
                qty: item.qty * multiplier(item.qty_multiplier.as_deref())?,
                category: category.to_string(),
            })
        })
        .collect()
}

/// BOM contributions of one component, its attached items included
pub fn component_contributions(kind: ComponentKind<'_>) -> Result<Vec<Contribution>> {
    match kind {
        ComponentKind::Connector(connector) => {
            if connector.ignore_in_bom {
                return Ok(Vec::new());
            }
            let BomKey::Single(hash) = bom_hash(kind)? else {
                return Err(HarnessError::structural("connectors have a single identity"));
            };
            let mut contributions = vec![Contribution {
                hash,
                designators: vec![connector.designator.clone()],
                qty: 1.0,
                category: "connector".to_string(),
            }];
            contributions.extend(attached_contributions(
                &connector.additional_components,
                &connector.designator,
                "connector/additional",
                |m| connector.qty_multiplier(m),
            )?);
            Ok(contributions)
        }
        ComponentKind::Cable(cable) => {
            if cable.ignore_in_bom {
                return Ok(Vec::new());
            }
            let (mut contributions, category) = match bom_hash(kind)? {
                BomKey::PerWire(hashes) => (
                    hashes
                        .into_iter()
                        .map(|hash| Contribution {
                            hash,
                            designators: vec![cable.designator.clone()],
                            qty: cable.length,
                            category: "wire".to_string(),
                        })
                        .collect::<Vec<_>>(),
                    "wire",
                ),
                BomKey::Single(hash) => (
                    vec![Contribution {
                        hash,
                        designators: vec![cable.designator.clone()],
                        qty: cable.length,
                        category: "cable".to_string(),
                    }],
                    "cable",
                ),
            };
            contributions.extend(attached_contributions(
                &cable.additional_components,
                &cable.designator,
                &format!("{}/additional", category),
                |m| cable.qty_multiplier(m),
            )?);
            Ok(contributions)
        }
        ComponentKind::Additional(item) => {
            if item.ignore_in_bom {
                return Ok(Vec::new());
            }
            if let Some(multiplier) = item.qty_multiplier.as_deref().filter(|m| !m.is_empty()) {
                return Err(HarnessError::InvalidMultiplier {
                    multiplier: multiplier.to_string(),
                    kind: "standalone item",
                });
            }
            Ok(vec![Contribution {
                hash: single_hash(item)?,
                designators: item.designator_list(),
                qty: item.qty,
                category: "additional".to_string(),
            }])
        }
    }
}
