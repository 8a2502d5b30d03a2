//! Harness document loading
//!
//! A harness document is a YAML mapping with these sections:
//!
//! ```yaml
//! connectors:
//!   X1: {pincount: 4, pinlabels: [GND, VCC, RX, TX]}
//! cables:
//!   W1: {wirecount: 2, length: 0.3, colors: [BK, RD]}
//! connections:
//!   - {from: [X1, [GND, VCC]], via: [W1, [1, 2]], to: [X2, [1, 2]]}
//! mates:
//!   - {from: [X2, 1], to: [X3, 1], arrow: "<->"}
//! additional_bom_items:
//!   - {type: Cable tie, qty: 4}
//! ```

use miette::Diagnostic;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::BuildOptions;
use crate::core::error::{HarnessError, Result};
use crate::core::harness::{FinalizedHarness, Harness};
use crate::core::reference::{Endpoint, Symbol};
use crate::entities::cable::CableSpec;
use crate::entities::component::AdditionalComponent;
use crate::entities::connector::ConnectorSpec;
use crate::yaml::{parse_yaml_str, YamlSyntaxError};

/// Errors from reading a harness document and building it
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    #[diagnostic(code(wirekit::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlSyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Harness(#[from] HarnessError),
}

/// Designator-keyed declarations, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Declarations<T>(Vec<(String, T)>);

impl<T> Default for Declarations<T> {
    fn default() -> Self {
        Declarations(Vec::new())
    }
}

impl<T> Declarations<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(designator, value)| (designator.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> IntoIterator for Declarations<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

struct DeclarationsVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DeclarationsVisitor<T> {
    type Value = Declarations<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping from designators to declarations")
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Declarations::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((designator, value)) = map.next_entry::<Symbol, T>()? {
            items.push((designator.into_string(), value));
        }
        Ok(Declarations(items))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declarations<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DeclarationsVisitor(PhantomData))
    }
}

/// One entry of the `connections` section
///
/// References may be groups; [`ConnectionRequest::expand`] turns a grouped
/// request into one request per wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionRequest {
    #[serde(default)]
    pub from: Option<Endpoint>,
    pub via: Endpoint,
    #[serde(default)]
    pub to: Option<Endpoint>,
}

fn split_endpoint(endpoint: &Endpoint) -> Vec<Endpoint> {
    endpoint
        .reference
        .flatten()
        .into_iter()
        .map(|reference| Endpoint {
            designator: endpoint.designator.clone(),
            reference: reference.clone(),
        })
        .collect()
}

impl ConnectionRequest {
    /// Zip grouped references by position, repeating single ones
    pub fn expand(&self) -> Result<Vec<ConnectionRequest>> {
        let from = self.from.as_ref().map(split_endpoint);
        let via = split_endpoint(&self.via);
        let to = self.to.as_ref().map(split_endpoint);

        let lengths: Vec<usize> = [from.as_ref(), Some(&via), to.as_ref()]
            .into_iter()
            .flatten()
            .map(Vec::len)
            .filter(|n| *n != 1)
            .collect();
        let count = match lengths.as_slice() {
            [] => 1,
            [first, rest @ ..] if rest.iter().all(|n| n == first) => *first,
            _ => {
                return Err(HarnessError::structural(format!(
                    "connection via {} lists groups of different lengths",
                    self.via
                )))
            }
        };
        if count == 0 {
            return Err(HarnessError::structural(format!(
                "connection via {} has an empty group",
                self.via
            )));
        }

        let pick = |items: &[Endpoint], i: usize| -> Endpoint {
            if items.len() == 1 {
                items[0].clone()
            } else {
                items[i].clone()
            }
        };
        Ok((0..count)
            .map(|i| ConnectionRequest {
                from: from.as_deref().map(|items| pick(items, i)),
                via: pick(via.as_slice(), i),
                to: to.as_deref().map(|items| pick(items, i)),
            })
            .collect())
    }
}

/// One end of a mate: a pin, or a whole component
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MateEnd {
    Pin(Endpoint),
    Component(Symbol),
}

fn default_arrow() -> String {
    "<->".to_string()
}

/// One entry of the `mates` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MateRequest {
    pub from: MateEnd,
    pub to: MateEnd,
    #[serde(default = "default_arrow")]
    pub arrow: String,
}

/// A harness document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HarnessDocument {
    pub connectors: Declarations<ConnectorSpec>,
    pub cables: Declarations<CableSpec>,
    pub connections: Vec<ConnectionRequest>,
    pub mates: Vec<MateRequest>,
    pub additional_bom_items: Vec<AdditionalComponent>,
}

impl HarnessDocument {
    pub fn parse(source: &str, filename: &str) -> std::result::Result<Self, LoadError> {
        Ok(parse_yaml_str(source, filename)?)
    }

    /// Build and finalize the harness this document describes
    pub fn build(self, options: BuildOptions) -> Result<FinalizedHarness> {
        let mut harness = Harness::new(options);

        for (designator, spec) in self.connectors {
            harness.add_connector(&designator, spec)?;
        }
        for (designator, spec) in self.cables {
            harness.add_cable(&designator, spec)?;
        }
        for item in self.additional_bom_items {
            harness.add_additional_bom_item(item);
        }

        for request in &self.connections {
            for single in request.expand()? {
                harness.connect(single.from.as_ref(), &single.via, single.to.as_ref())?;
            }
        }

        for mate in &self.mates {
            match (&mate.from, &mate.to) {
                (MateEnd::Pin(from), MateEnd::Pin(to)) => harness.add_mate_pin(from, to, &mate.arrow)?,
                (MateEnd::Component(from), MateEnd::Component(to)) => {
                    harness.add_mate_component(from.as_str(), to.as_str(), &mate.arrow)?
                }
                _ => {
                    return Err(HarnessError::structural(
                        "a mate must join two pins or two components",
                    ))
                }
            }
        }

        Ok(harness.finalize())
    }
}

/// Parse and build a harness from source text
pub fn load_str(
    source: &str,
    filename: &str,
    options: BuildOptions,
) -> std::result::Result<FinalizedHarness, LoadError> {
    let document = HarnessDocument::parse(source, filename)?;
    Ok(document.build(options)?)
}

/// Read, parse and build a harness document
pub fn load_file(path: &Path, options: BuildOptions) -> std::result::Result<FinalizedHarness, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&source, &path.display().to_string(), options)
}

/// Whether a path looks like a harness document
pub fn is_harness_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DOCUMENT: &str = r#"
connectors:
  X2: {pinlabels: [GND, VCC, SIG]}
  X1:
    pincount: 3
    additional_components:
      - {type: Backshell}
cables:
  W1: {colors: [BK, RD, BU], length: 0.5}
connections:
  - {from: [X1, [1, 2, 3]], via: [W1, [BK, RD, BU]], to: [X2, [GND, VCC, SIG]]}
mates:
  - {from: X2, to: X1, arrow: "==>"}
additional_bom_items:
  - {type: Cable tie, qty: 2, designators: [CT1]}
"#;

    #[test]
    fn test_declarations_keep_document_order() {
        let doc = HarnessDocument::parse(DOCUMENT, "doc.yaml").unwrap();
        let names: Vec<&str> = doc.connectors.iter().map(|(d, _)| d).collect();
        assert_eq!(names, vec!["X2", "X1"]);
        assert_eq!(doc.cables.len(), 1);
    }

    #[test]
    fn test_build_document() {
        let harness = load_str(DOCUMENT, "doc.yaml", BuildOptions::default()).unwrap();
        let w1 = harness.cable("W1").unwrap();
        assert_eq!(w1.connections().len(), 3);
        let labels: Vec<_> = w1
            .connections()
            .iter()
            .map(|c| c.to.as_ref().and_then(|p| p.label.clone()).unwrap())
            .collect();
        assert_eq!(labels, vec!["GND", "VCC", "SIG"]);
        assert_eq!(harness.connector("X1").unwrap().populated_count(), 3);
        assert_eq!(harness.mates().len(), 1);

        let lines = harness.bom().unwrap().lines();
        let categories: Vec<_> = lines.iter().map(|l| l.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["connector", "connector/additional", "cable", "additional"]
        );
        assert_eq!(lines[0].quantity, 2.0);
        assert_eq!(lines[0].designators, vec!["X1", "X2"]);
    }

    #[test]
    fn test_expand_broadcasts_singles() {
        let request: ConnectionRequest =
            serde_yml::from_str("{from: [X1, 1], via: [W1, [1, 2]], to: null}").unwrap();
        let expanded = request.expand().unwrap();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[1].from, Some(Endpoint::new("X1", 1u32)));
        assert_eq!(expanded[1].via, Endpoint::new("W1", 2u32));
        assert!(expanded[1].to.is_none());
    }

    #[test]
    fn test_expand_rejects_mismatched_groups() {
        let request: ConnectionRequest =
            serde_yml::from_str("{from: [X1, [1, 2, 3]], via: [W1, [1, 2]]}").unwrap();
        let err = request.expand().unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
    }

    #[test]
    fn test_mixed_mate_is_rejected() {
        let source = "connectors:\n  X1: {pincount: 1}\n  X2: {pincount: 1}\nmates:\n  - {from: [X1, 1], to: X2}\n";
        let err = load_str(source, "m.yaml", BuildOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Harness(HarnessError::StructuralValidation { .. })));
    }

    #[test]
    fn test_yaml_errors_are_reported() {
        let err = load_str("connectors: [", "broken.yaml", BuildOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Yaml(_)));
    }

    #[test]
    fn test_numeric_part_numbers() {
        let source = r#"
connectors:
  X1: {pincount: 2, pn: 12345, mpn: 5566}
cables:
  W1: {wirecount: 2, pn: 777}
  W2: {category: bundle, wirecount: 2, pn: [1, 2]}
additional_bom_items:
  - {type: Label, qty: 1, pn: 42}
"#;
        let harness = load_str(source, "pn.yaml", BuildOptions::default()).unwrap();
        let connector = harness.connector("X1").unwrap();
        assert_eq!(connector.part_numbers.pn.as_deref(), Some("12345"));
        assert_eq!(connector.part_numbers.mpn.as_deref(), Some("5566"));

        let lines = harness.bom().unwrap().lines();
        let pns: Vec<_> = lines.iter().map(|l| l.pn.as_deref()).collect();
        assert_eq!(
            pns,
            vec![Some("12345"), Some("777"), Some("1"), Some("2"), Some("42")]
        );
        assert_eq!(lines[2].category, "wire");
    }

    #[test]
    fn test_load_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("harness.yaml");
        std::fs::write(&path, DOCUMENT).unwrap();
        assert!(is_harness_file(&path));
        assert!(load_file(&path, BuildOptions::default()).is_ok());

        let err = load_file(&tmp.path().join("missing.yaml"), BuildOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
