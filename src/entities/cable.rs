//! Cable entity - wires, optional shield and the connections made through them
//!
//! A cable with `category: bundle` is a set of loose wires: it may carry
//! per-wire part data and contributes one BOM line per conductor.

use serde::{Deserialize, Serialize};

use crate::core::config::BuildOptions;
use crate::core::error::{HarnessError, Result};
use crate::core::identity::{PartNumberInfo, AUTOGENERATED_PREFIX};
use crate::core::reference::{optional_text_list, Symbol};
use crate::core::resolver::{NameTable, SymbolTable};
use crate::entities::component::{broadcast_optional, AdditionalComponent, OneOrMany};
use crate::entities::connector::Pin;

/// Reserved id of the shield conductor
pub const SHIELD_ID: &str = "s";

/// Category value marking a cable as a bundle
pub const BUNDLE_CATEGORY: &str = "bundle";

/// A length or gauge: a bare number, or "<number> <unit>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl Measure {
    fn split(&self, field: &str, designator: &str) -> Result<(f64, Option<String>)> {
        let text = match self {
            Measure::Number(value) => return Ok((*value, None)),
            Measure::Text(text) => text,
        };
        let invalid = || {
            HarnessError::structural(format!(
                "{}: {} `{}` must be a number, or number and unit separated by a space",
                designator, field, text
            ))
        };
        let mut parts = text.split_whitespace();
        let value = parts
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(invalid)?;
        let unit = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok((value, unit))
    }
}

/// Shield: present or not, optionally with a drain wire color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shield {
    Present(bool),
    Colored(String),
}

impl Default for Shield {
    fn default() -> Self {
        Shield::Present(false)
    }
}

impl Shield {
    pub fn is_present(&self) -> bool {
        !matches!(self, Shield::Present(false))
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            Shield::Colored(color) if !color.is_empty() => Some(color),
            _ => None,
        }
    }
}

/// Part-number fields of a cable; lists are only valid for bundles
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CablePartNumbers {
    #[serde(deserialize_with = "optional_text_list")]
    pub pn: Option<OneOrMany<String>>,
    #[serde(deserialize_with = "optional_text_list")]
    pub manufacturer: Option<OneOrMany<String>>,
    #[serde(deserialize_with = "optional_text_list")]
    pub mpn: Option<OneOrMany<String>>,
    #[serde(deserialize_with = "optional_text_list")]
    pub supplier: Option<OneOrMany<String>>,
    #[serde(deserialize_with = "optional_text_list")]
    pub spn: Option<OneOrMany<String>>,
}

impl CablePartNumbers {
    fn fields(&self) -> [(&'static str, &Option<OneOrMany<String>>); 5] {
        [
            ("pn", &self.pn),
            ("manufacturer", &self.manufacturer),
            ("mpn", &self.mpn),
            ("supplier", &self.supplier),
            ("spn", &self.spn),
        ]
    }
}

/// Cable declaration as written in a harness document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CableSpec {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub part_type: Option<OneOrMany<String>>,
    pub subtype: Option<OneOrMany<String>>,
    pub color: Option<String>,
    pub gauge: Option<Measure>,
    pub gauge_unit: Option<String>,
    pub length: Option<Measure>,
    pub length_unit: Option<String>,
    pub wirecount: Option<usize>,
    pub shield: Shield,
    pub colors: Vec<String>,
    pub wirelabels: Vec<Symbol>,
    pub show_name: Option<bool>,
    pub additional_components: Vec<AdditionalComponent>,
    pub ignore_in_bom: bool,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub part_numbers: CablePartNumbers,
}

impl CableSpec {
    pub fn with_wirecount(wirecount: usize) -> Self {
        Self {
            wirecount: Some(wirecount),
            ..Default::default()
        }
    }
}

/// A conductor of a cable (the shield included)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wire {
    pub index: usize,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Designator of the owning cable
    pub parent: String,
}

impl Wire {
    pub fn is_shield(&self) -> bool {
        self.id == SHIELD_ID
    }
}

/// A wire with its optional end pins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: Option<Pin>,
    pub via: Wire,
    pub to: Option<Pin>,
}

/// Quantity multipliers understood by cables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CableMultiplier {
    /// Number of conductors, shield excluded
    WireCount,
    /// Number of connections recorded on the cable
    Terminations,
    Length,
    /// Length times wire count
    TotalLength,
}

impl std::str::FromStr for CableMultiplier {
    type Err = HarnessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wirecount" => Ok(CableMultiplier::WireCount),
            "terminations" => Ok(CableMultiplier::Terminations),
            "length" => Ok(CableMultiplier::Length),
            "total_length" => Ok(CableMultiplier::TotalLength),
            _ => Err(HarnessError::InvalidMultiplier {
                multiplier: s.to_string(),
                kind: "cable",
            }),
        }
    }
}

/// A cable or bundle with resolved wires and recorded connections
#[derive(Debug, Clone)]
pub struct Cable {
    pub designator: String,
    pub category: Option<String>,
    pub part_type: Option<OneOrMany<String>>,
    pub subtype: Option<OneOrMany<String>>,
    pub color: Option<String>,
    pub gauge: Option<f64>,
    pub gauge_unit: Option<String>,
    pub length: f64,
    pub length_unit: String,
    pub shield: Shield,
    pub show_name: bool,
    pub additional_components: Vec<AdditionalComponent>,
    pub part_numbers: CablePartNumbers,
    pub ignore_in_bom: bool,
    pub notes: Option<String>,
    wires: Vec<Wire>,
    connections: Vec<Connection>,
}

fn normalize_gauge_unit(unit: &str) -> String {
    if unit.eq_ignore_ascii_case("awg") {
        "AWG".to_string()
    } else if unit == "mm2" {
        "mm²".to_string()
    } else {
        unit.to_string()
    }
}

impl Cable {
    /// Build a cable from its declaration, validating wires and part data
    pub fn new(designator: impl Into<String>, spec: CableSpec, options: &BuildOptions) -> Result<Self> {
        let designator = designator.into();
        let bundle = spec.category.as_deref() == Some(BUNDLE_CATEGORY);

        let (length, length_unit) = match &spec.length {
            None => (0.0, None),
            Some(measure) => measure.split("length", &designator)?,
        };
        if length_unit.is_some() && spec.length_unit.is_some() {
            log::warn!(
                "{}: length unit given in length field, ignoring length_unit",
                designator
            );
        }
        let length_unit = length_unit
            .or(spec.length_unit.clone())
            .unwrap_or_else(|| options.length_unit.clone());

        let (gauge, gauge_unit) = match &spec.gauge {
            None => (None, None),
            Some(measure) => {
                let (value, unit) = measure.split("gauge", &designator)?;
                if unit.is_some() && spec.gauge_unit.is_some() {
                    log::warn!(
                        "{}: gauge unit given in gauge field, ignoring gauge_unit",
                        designator
                    );
                }
                let unit = unit
                    .or(spec.gauge_unit.clone())
                    .unwrap_or_else(|| options.gauge_unit.clone());
                (Some(value), Some(normalize_gauge_unit(&unit)))
            }
        };

        let wirecount = match spec.wirecount.filter(|n| *n > 0) {
            Some(n) => n,
            None if !spec.colors.is_empty() => spec.colors.len(),
            None => {
                return Err(HarnessError::structural(format!(
                    "{}: unknown number of wires, specify wirecount or colors",
                    designator
                )))
            }
        };

        let colors: Vec<Option<String>> = if spec.colors.is_empty() {
            vec![None; wirecount]
        } else {
            spec.colors
                .iter()
                .cycle()
                .take(wirecount)
                .map(|c| Some(c.clone()).filter(|c| !c.is_empty()))
                .collect()
        };

        if spec.wirelabels.len() > wirecount {
            return Err(HarnessError::structural(format!(
                "{}: {} wire labels given for {} wires",
                designator,
                spec.wirelabels.len(),
                wirecount
            )));
        }
        if spec.shield.is_present() && spec.wirelabels.iter().any(|l| l.as_str() == SHIELD_ID) {
            return Err(HarnessError::structural(format!(
                "{}: `{}` may not be used as a wire label for a shielded cable",
                designator, SHIELD_ID
            )));
        }

        let list_fields = [("type", &spec.part_type), ("subtype", &spec.subtype)]
            .into_iter()
            .chain(spec.part_numbers.fields());
        for (field, value) in list_fields {
            match value {
                Some(OneOrMany::Many(_)) if !bundle => {
                    return Err(HarnessError::structural(format!(
                        "{}: {} is a list, but lists of part data are only supported for bundles",
                        designator, field
                    )));
                }
                Some(OneOrMany::Many(values)) if values.len() != wirecount => {
                    return Err(HarnessError::structural(format!(
                        "{}: {} lists {} entries but the bundle has {} wires; lists of part data must match wirecount",
                        designator,
                        field,
                        values.len(),
                        wirecount
                    )));
                }
                _ => {}
            }
        }

        let mut wires: Vec<Wire> = colors
            .into_iter()
            .enumerate()
            .map(|(index, color)| Wire {
                index,
                id: (index + 1).to_string(),
                label: spec.wirelabels.get(index).map(|l| l.to_string()),
                color,
                parent: designator.clone(),
            })
            .collect();
        if spec.shield.is_present() {
            wires.push(Wire {
                index: wirecount,
                id: SHIELD_ID.to_string(),
                label: Some("Shield".to_string()),
                color: spec.shield.color().map(str::to_string),
                parent: designator.clone(),
            });
        }

        let autogenerated = designator.starts_with(AUTOGENERATED_PREFIX);
        Ok(Cable {
            show_name: spec.show_name.unwrap_or(!autogenerated),
            designator,
            category: spec.category,
            part_type: spec.part_type,
            subtype: spec.subtype,
            color: spec.color,
            gauge,
            gauge_unit,
            length,
            length_unit,
            shield: spec.shield,
            additional_components: spec.additional_components,
            part_numbers: spec.part_numbers,
            ignore_in_bom: spec.ignore_in_bom,
            notes: spec.notes,
            wires,
            connections: Vec::new(),
        })
    }

    pub fn is_bundle(&self) -> bool {
        self.category.as_deref() == Some(BUNDLE_CATEGORY)
    }

    pub fn is_shielded(&self) -> bool {
        self.shield.is_present()
    }

    /// All wires, shield last
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Wires excluding the shield
    pub fn conductors(&self) -> &[Wire] {
        let count = self.wirecount();
        &self.wires[..count]
    }

    /// Number of conductors, shield excluded
    pub fn wirecount(&self) -> usize {
        self.wires.iter().filter(|w| !w.is_shield()).count()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// "0.25 mm²", when a gauge is set
    pub fn gauge_text(&self) -> Option<String> {
        let gauge = self.gauge?;
        Some(match self.gauge_unit.as_deref() {
            Some(unit) => format!("{} {}", gauge, unit),
            None => gauge.to_string(),
        })
    }

    /// Part numbers of a non-bundle cable
    pub fn scalar_part_numbers(&self) -> PartNumberInfo {
        let one = |field: &Option<OneOrMany<String>>| field.as_ref().and_then(|v| v.as_one()).cloned();
        PartNumberInfo {
            pn: one(&self.part_numbers.pn),
            manufacturer: one(&self.part_numbers.manufacturer),
            mpn: one(&self.part_numbers.mpn),
            supplier: one(&self.part_numbers.supplier),
            spn: one(&self.part_numbers.spn),
        }
    }

    /// Part numbers of each conductor, scalars broadcast to every wire
    pub fn per_wire_part_numbers(&self) -> Result<Vec<PartNumberInfo>> {
        let count = self.wirecount();
        let pns = &self.part_numbers;
        let pn = broadcast_optional(&pns.pn, count, "pn")?;
        let manufacturer = broadcast_optional(&pns.manufacturer, count, "manufacturer")?;
        let mpn = broadcast_optional(&pns.mpn, count, "mpn")?;
        let supplier = broadcast_optional(&pns.supplier, count, "supplier")?;
        let spn = broadcast_optional(&pns.spn, count, "spn")?;

        Ok((0..count)
            .map(|i| PartNumberInfo {
                pn: pn[i].clone(),
                manufacturer: manufacturer[i].clone(),
                mpn: mpn[i].clone(),
                supplier: supplier[i].clone(),
                spn: spn[i].clone(),
            })
            .collect())
    }

    pub(crate) fn connect(&mut self, from: Option<Pin>, wire_index: usize, to: Option<Pin>) {
        if let Some(via) = self.wires.get(wire_index).cloned() {
            self.connections.push(Connection { from, via, to });
        }
    }

    pub(crate) fn qty_multiplier(&self, name: Option<&str>) -> Result<f64> {
        let multiplier = name
            .filter(|n| !n.is_empty())
            .map(str::parse::<CableMultiplier>)
            .transpose()?;
        Ok(match multiplier {
            None => 1.0,
            Some(CableMultiplier::WireCount) => self.wirecount() as f64,
            Some(CableMultiplier::Terminations) => self.connections.len() as f64,
            Some(CableMultiplier::Length) => self.length,
            Some(CableMultiplier::TotalLength) => self.length * self.wirecount() as f64,
        })
    }
}

impl SymbolTable for Cable {
    fn designator(&self) -> &str {
        &self.designator
    }

    fn item_kind(&self) -> &'static str {
        "wire"
    }

    fn ids(&self) -> Vec<&str> {
        self.wires.iter().map(|w| w.id.as_str()).collect()
    }

    fn name_tables(&self) -> Vec<NameTable<'_>> {
        vec![
            NameTable {
                kind: "color",
                names: self.wires.iter().map(|w| w.color.as_deref()).collect(),
            },
            NameTable {
                kind: "label",
                names: self.wires.iter().map(|w| w.label.as_deref()).collect(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::Reference;
    use crate::core::resolver::resolve_one;

    fn build(yaml: &str) -> Result<Cable> {
        let spec: CableSpec = serde_yml::from_str(yaml).unwrap();
        Cable::new("W1", spec, &BuildOptions::default())
    }

    #[test]
    fn test_wirecount_from_colors() {
        let w = build("colors: [BK, RD, BU]").unwrap();
        assert_eq!(w.wirecount(), 3);
        let ids: Vec<&str> = w.wires().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_colors_cycle_to_wirecount() {
        let w = build("wirecount: 5\ncolors: [BK, RD]").unwrap();
        let colors: Vec<_> = w.wires().iter().map(|w| w.color.clone().unwrap()).collect();
        assert_eq!(colors, vec!["BK", "RD", "BK", "RD", "BK"]);
    }

    #[test]
    fn test_unknown_wirecount() {
        let err = build("length: 1").unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
    }

    #[test]
    fn test_shield_wire() {
        let w = build("wirecount: 2\nshield: SN").unwrap();
        assert_eq!(w.wirecount(), 2);
        let shield = &w.wires()[2];
        assert_eq!(shield.id, "s");
        assert_eq!(shield.label.as_deref(), Some("Shield"));
        assert_eq!(shield.color.as_deref(), Some("SN"));
        assert_eq!(resolve_one(&w, &Reference::from("s")).unwrap(), 2);
    }

    #[test]
    fn test_shield_label_reserved() {
        let err = build("wirecount: 2\nshield: true\nwirelabels: [a, s]").unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
        assert!(build("wirecount: 2\nwirelabels: [a, s]").is_ok());
    }

    #[test]
    fn test_length_and_gauge_parsing() {
        let w = build("wirecount: 1\nlength: 0.5 m\ngauge: 24 awg").unwrap();
        assert_eq!(w.length, 0.5);
        assert_eq!(w.length_unit, "m");
        assert_eq!(w.gauge_text().as_deref(), Some("24 AWG"));

        let w = build("wirecount: 1\nlength: 30\nlength_unit: cm\ngauge: 0.5").unwrap();
        assert_eq!(w.length_unit, "cm");
        assert_eq!(w.gauge_text().as_deref(), Some("0.5 mm²"));

        let err = build("wirecount: 1\nlength: long").unwrap_err();
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn test_part_lists_only_for_bundles() {
        let err = build("wirecount: 2\npn: [A, B]").unwrap_err();
        assert!(err.to_string().contains("only supported for bundles"));
    }

    #[test]
    fn test_bundle_list_length_must_match() {
        assert!(build("category: bundle\nwirecount: 3\nmpn: [A, B, C]").is_ok());
        let err = build("category: bundle\nwirecount: 3\nmpn: [A, B]").unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
    }

    #[test]
    fn test_color_and_label_references() {
        let w = build("colors: [BK, RD]\nwirelabels: [GND, VCC]").unwrap();
        assert_eq!(resolve_one(&w, &Reference::from("RD")).unwrap(), 1);
        assert_eq!(resolve_one(&w, &Reference::from("GND")).unwrap(), 0);
    }

    #[test]
    fn test_multipliers() {
        let mut w = build("wirecount: 4\nlength: 2\nshield: true").unwrap();
        w.connect(None, 0, None);
        assert_eq!(w.qty_multiplier(Some("wirecount")).unwrap(), 4.0);
        assert_eq!(w.qty_multiplier(Some("terminations")).unwrap(), 1.0);
        assert_eq!(w.qty_multiplier(Some("length")).unwrap(), 2.0);
        assert_eq!(w.qty_multiplier(Some("total_length")).unwrap(), 8.0);
        let err = w.qty_multiplier(Some("pincount")).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidMultiplier { kind: "cable", .. }));
    }
}
