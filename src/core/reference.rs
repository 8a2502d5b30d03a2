//! Pin and wire references as written in a harness description
//!
//! A YAML scalar (`1`, `GND`, `RD`) becomes [`Reference::ByLabel`] and is
//! resolved against ids, labels and colors. An explicit `{id: ...}` mapping
//! becomes [`Reference::ById`] and only matches ids. A sequence becomes a
//! [`Reference::Group`].

use serde::Deserialize;
use std::fmt;

use crate::entities::component::OneOrMany;

/// A scalar identifier that may be written as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol(s)
    }
}

impl From<u32> for Symbol {
    fn from(n: u32) -> Self {
        Symbol(n.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSymbol {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawSymbol> for Symbol {
    fn from(raw: RawSymbol) -> Self {
        match raw {
            RawSymbol::Int(n) => Symbol(n.to_string()),
            RawSymbol::Float(x) => Symbol(x.to_string()),
            RawSymbol::Text(s) => Symbol(s),
        }
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawSymbol::deserialize(deserializer).map(Symbol::from)
    }
}

/// Deserialize an optional text field that may be written as a number
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Symbol>::deserialize(deserializer).map(|value| value.map(Symbol::into_string))
}

/// Like [`optional_text`], for fields given once or as a list
pub(crate) fn optional_text_list<'de, D>(
    deserializer: D,
) -> Result<Option<OneOrMany<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany<Symbol>>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(symbol) => OneOrMany::One(symbol.into_string()),
            OneOrMany::Many(symbols) => {
                OneOrMany::Many(symbols.into_iter().map(Symbol::into_string).collect())
            }
        }),
    )
}

/// A reference to one or more pins of a connector or wires of a cable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Matches the id list only
    ById(String),
    /// Matches labels and colors, falling back to ids
    ByLabel(String),
    /// Several references, resolved in order
    Group(Vec<Reference>),
}

impl Reference {
    pub fn id(id: impl Into<String>) -> Self {
        Reference::ById(id.into())
    }

    pub fn label(label: impl Into<String>) -> Self {
        Reference::ByLabel(label.into())
    }

    /// Flatten nested groups into single references, keeping order
    pub fn flatten(&self) -> Vec<&Reference> {
        match self {
            Reference::Group(items) => items.iter().flat_map(|r| r.flatten()).collect(),
            single => vec![single],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Reference::Group(_))
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Reference::ByLabel(s.to_string())
    }
}

impl From<u32> for Reference {
    fn from(n: u32) -> Self {
        Reference::ByLabel(n.to_string())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::ById(id) => write!(f, "{}", id),
            Reference::ByLabel(label) => write!(f, "{}", label),
            Reference::Group(items) => {
                let parts: Vec<String> = items.iter().map(|r| r.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Scalar(Symbol),
    Id { id: Symbol },
    Group(Vec<RawReference>),
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        match raw {
            RawReference::Scalar(s) => Reference::ByLabel(s.into_string()),
            RawReference::Id { id } => Reference::ById(id.into_string()),
            RawReference::Group(items) => {
                Reference::Group(items.into_iter().map(Reference::from).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawReference::deserialize(deserializer).map(Reference::from)
    }
}

/// A component designator together with a reference into it
///
/// Written in YAML as a two-element sequence: `[X1, 3]` or `[W1, [1, 2]]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, Reference)")]
pub struct Endpoint {
    pub designator: String,
    pub reference: Reference,
}

impl Endpoint {
    pub fn new(designator: impl Into<String>, reference: impl Into<Reference>) -> Self {
        Self {
            designator: designator.into(),
            reference: reference.into(),
        }
    }
}

impl From<(String, Reference)> for Endpoint {
    fn from((designator, reference): (String, Reference)) -> Self {
        Self {
            designator,
            reference,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.designator, self.reference)
    }
}
