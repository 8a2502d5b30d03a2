//! Symbol resolution - map a pin/wire reference to a position in a component

use crate::core::error::{HarnessError, Result};
use crate::core::reference::Reference;

/// One list of alternative names (labels or colors), aligned with the ids
#[derive(Debug, Clone)]
pub struct NameTable<'a> {
    /// What the names are, used in error messages ("label", "color")
    pub kind: &'static str,
    pub names: Vec<Option<&'a str>>,
}

/// A component whose items can be referenced by id, label or color
pub trait SymbolTable {
    /// Designator of the component, for error messages
    fn designator(&self) -> &str;

    /// Singular noun for the referenced items ("pin", "wire")
    fn item_kind(&self) -> &'static str;

    /// Item ids, in index order
    fn ids(&self) -> Vec<&str>;

    /// Alternative name lists, each aligned with [`SymbolTable::ids`]
    fn name_tables(&self) -> Vec<NameTable<'_>>;
}

/// Resolve a reference to item indices, flattening groups in order
pub fn resolve<T: SymbolTable + ?Sized>(table: &T, reference: &Reference) -> Result<Vec<usize>> {
    match reference {
        Reference::ById(id) => resolve_id(table, id).map(|index| vec![index]),
        Reference::ByLabel(label) => resolve_label(table, label).map(|index| vec![index]),
        Reference::Group(items) => {
            let mut indices = Vec::with_capacity(items.len());
            for item in items {
                indices.extend(resolve(table, item)?);
            }
            Ok(indices)
        }
    }
}

/// Resolve a reference that must name exactly one item
pub fn resolve_one<T: SymbolTable + ?Sized>(table: &T, reference: &Reference) -> Result<usize> {
    let indices = resolve(table, reference)?;
    match indices.as_slice() {
        [index] => Ok(*index),
        _ => Err(HarnessError::structural(format!(
            "{}:{} must reference exactly one {}",
            table.designator(),
            reference,
            table.item_kind()
        ))),
    }
}

fn subject<T: SymbolTable + ?Sized>(table: &T, symbol: &str) -> String {
    format!("{}:{}", table.designator(), symbol)
}

fn resolve_id<T: SymbolTable + ?Sized>(table: &T, id: &str) -> Result<usize> {
    table
        .ids()
        .iter()
        .position(|candidate| *candidate == id)
        .ok_or_else(|| HarnessError::not_found(subject(table, id)))
}

fn resolve_label<T: SymbolTable + ?Sized>(table: &T, symbol: &str) -> Result<usize> {
    let id_hit = table.ids().iter().position(|id| *id == symbol);

    let mut name_hit: Option<(&'static str, usize)> = None;
    for names in table.name_tables() {
        let mut hits = names
            .names
            .iter()
            .enumerate()
            .filter(|(_, name)| matches!(name, Some(n) if !n.is_empty() && *n == symbol))
            .map(|(index, _)| index);

        let Some(index) = hits.next() else {
            continue;
        };
        if hits.next().is_some() {
            return Err(HarnessError::DuplicateReference {
                subject: subject(table, symbol),
                item: table.item_kind(),
            });
        }

        match name_hit {
            Some((previous_kind, previous)) if previous != index => {
                return Err(HarnessError::AmbiguousReference {
                    subject: subject(table, symbol),
                    detail: format!(
                        "defined both in {}s and {}s, for different {}s",
                        previous_kind,
                        names.kind,
                        table.item_kind()
                    ),
                });
            }
            Some(_) => {}
            None => name_hit = Some((names.kind, index)),
        }
    }

    match (id_hit, name_hit) {
        (Some(id_index), Some((kind, index))) if id_index != index => {
            Err(HarnessError::AmbiguousReference {
                subject: subject(table, symbol),
                detail: format!(
                    "defined both as an id and in {}s, for different {}s",
                    kind,
                    table.item_kind()
                ),
            })
        }
        (_, Some((_, index))) => Ok(index),
        (Some(index), None) => Ok(index),
        (None, None) => Err(HarnessError::not_found(subject(table, symbol))),
    }
}
