//! Harness - the two-phase connection builder
//!
//! A [`Harness`] collects components, connections and mates. Calling
//! [`Harness::finalize`] consumes it and yields a [`FinalizedHarness`], the
//! only value that answers multiplier queries and computes the BOM. Both
//! depend on the final set of connections, so they cannot be observed while
//! the harness is still being wired.

use std::collections::HashMap;

use crate::core::bom::Bom;
use crate::core::config::BuildOptions;
use crate::core::error::{HarnessError, Result};
use crate::core::graph::{ConnectionGraph, RenderContext};
use crate::core::identity::ComponentKind;
use crate::core::reference::Endpoint;
use crate::core::resolver::resolve_one;
use crate::entities::cable::{Cable, CableSpec};
use crate::entities::component::AdditionalComponent;
use crate::entities::connector::{Connector, ConnectorSpec, Side};
use crate::entities::mate::{Arrow, ArrowWeight, Mate, MateComponent, MatePin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Connector(usize),
    Cable(usize),
}

/// Components and links of a harness, in declaration order
#[derive(Debug, Default)]
struct Parts {
    connectors: Vec<Connector>,
    cables: Vec<Cable>,
    additional_items: Vec<AdditionalComponent>,
    mates: Vec<Mate>,
    /// Lower-cased designator to position, shared by connectors and cables
    designators: HashMap<String, Slot>,
}

impl Parts {
    fn slot(&self, designator: &str) -> Result<Slot> {
        self.designators
            .get(&designator.to_lowercase())
            .copied()
            .ok_or_else(|| HarnessError::not_found(designator))
    }

    fn connector_index(&self, designator: &str) -> Result<usize> {
        match self.slot(designator)? {
            Slot::Connector(index) => Ok(index),
            Slot::Cable(_) => Err(HarnessError::structural(format!(
                "{} is a cable, expected a connector",
                designator
            ))),
        }
    }

    fn cable_index(&self, designator: &str) -> Result<usize> {
        match self.slot(designator)? {
            Slot::Cable(index) => Ok(index),
            Slot::Connector(_) => Err(HarnessError::structural(format!(
                "{} is a connector, expected a cable",
                designator
            ))),
        }
    }

    /// Resolve a pin endpoint to (connector index, pin index)
    fn resolve_pin(&self, endpoint: &Endpoint) -> Result<(usize, usize)> {
        let connector = self.connector_index(&endpoint.designator)?;
        let pin = resolve_one(&self.connectors[connector], &endpoint.reference)?;
        Ok((connector, pin))
    }

    fn canonical_designator(&self, designator: &str) -> Result<&str> {
        Ok(match self.slot(designator)? {
            Slot::Connector(index) => &self.connectors[index].designator,
            Slot::Cable(index) => &self.cables[index].designator,
        })
    }
}

/// A harness under construction
#[derive(Debug, Default)]
pub struct Harness {
    options: BuildOptions,
    parts: Parts,
}

impl Harness {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            parts: Parts::default(),
        }
    }

    fn reserve_designator(&mut self, designator: &str, slot: Slot) -> Result<()> {
        if designator.trim().is_empty() {
            return Err(HarnessError::structural("designators may not be empty"));
        }
        let key = designator.to_lowercase();
        if self.parts.designators.contains_key(&key) {
            return Err(HarnessError::DuplicateReference {
                subject: designator.to_string(),
                item: "component",
            });
        }
        self.parts.designators.insert(key, slot);
        Ok(())
    }

    pub fn add_connector(&mut self, designator: &str, spec: ConnectorSpec) -> Result<()> {
        let connector = Connector::new(designator, spec)?;
        self.reserve_designator(designator, Slot::Connector(self.parts.connectors.len()))?;
        self.parts.connectors.push(connector);
        Ok(())
    }

    pub fn add_cable(&mut self, designator: &str, spec: CableSpec) -> Result<()> {
        let cable = Cable::new(designator, spec, &self.options)?;
        self.reserve_designator(designator, Slot::Cable(self.parts.cables.len()))?;
        self.parts.cables.push(cable);
        Ok(())
    }

    /// Add a standalone BOM item
    pub fn add_additional_bom_item(&mut self, item: AdditionalComponent) {
        self.parts.additional_items.push(item);
    }

    /// Connect a wire of a cable to optional pins on either side
    ///
    /// Every endpoint must name exactly one pin or wire. All endpoints are
    /// resolved before anything is recorded, so a failed call leaves the
    /// harness unchanged.
    pub fn connect(
        &mut self,
        from: Option<&Endpoint>,
        via: &Endpoint,
        to: Option<&Endpoint>,
    ) -> Result<()> {
        let cable = self.parts.cable_index(&via.designator)?;
        let wire = resolve_one(&self.parts.cables[cable], &via.reference)?;
        let from = from.map(|e| self.parts.resolve_pin(e)).transpose()?;
        let to = to.map(|e| self.parts.resolve_pin(e)).transpose()?;

        let from_pin = from.map(|(c, p)| self.parts.connectors[c].pins()[p].clone());
        let to_pin = to.map(|(c, p)| self.parts.connectors[c].pins()[p].clone());

        log::debug!(
            "connect {} -> {}:{} -> {}",
            from_pin.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            via.designator,
            self.parts.cables[cable].wires()[wire].id,
            to_pin.as_ref().map(|p| p.to_string()).unwrap_or_default()
        );

        if let Some((connector, pin)) = from {
            self.parts.connectors[connector].activate_pin(pin, Side::Right);
        }
        if let Some((connector, pin)) = to {
            self.parts.connectors[connector].activate_pin(pin, Side::Left);
        }
        self.parts.cables[cable].connect(from_pin, wire, to_pin);
        Ok(())
    }

    /// Mate two pins directly
    pub fn add_mate_pin(&mut self, from: &Endpoint, to: &Endpoint, arrow: &str) -> Result<()> {
        let arrow = Arrow::parse(arrow, ArrowWeight::Single)?;
        let (from_connector, from_index) = self.parts.resolve_pin(from)?;
        let (to_connector, to_index) = self.parts.resolve_pin(to)?;

        let from_pin = self.parts.connectors[from_connector].pins()[from_index].clone();
        let to_pin = self.parts.connectors[to_connector].pins()[to_index].clone();
        log::debug!("mate {} {} {}", from_pin, arrow, to_pin);

        self.parts.connectors[from_connector].activate_pin(from_index, Side::Right);
        self.parts.connectors[to_connector].activate_pin(to_index, Side::Left);
        self.parts.mates.push(Mate::Pin(MatePin {
            from: from_pin,
            to: to_pin,
            arrow,
        }));
        Ok(())
    }

    /// Mate two whole components; no pins are activated
    pub fn add_mate_component(&mut self, from: &str, to: &str, arrow: &str) -> Result<()> {
        let arrow = Arrow::parse(arrow, ArrowWeight::Single)?;
        let from = self.parts.canonical_designator(from)?.to_string();
        let to = self.parts.canonical_designator(to)?.to_string();
        log::debug!("mate {} {} {}", from, arrow, to);

        self.parts
            .mates
            .push(Mate::Component(MateComponent { from, to, arrow }));
        Ok(())
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.parts.connectors
    }

    pub fn cables(&self) -> &[Cable] {
        &self.parts.cables
    }

    /// End the build phase
    pub fn finalize(self) -> FinalizedHarness {
        log::debug!(
            "finalized harness: {} connectors, {} cables, {} mates",
            self.parts.connectors.len(),
            self.parts.cables.len(),
            self.parts.mates.len()
        );
        FinalizedHarness { parts: self.parts }
    }
}

/// A fully connected harness
#[derive(Debug)]
pub struct FinalizedHarness {
    parts: Parts,
}

impl FinalizedHarness {
    pub fn connectors(&self) -> &[Connector] {
        &self.parts.connectors
    }

    pub fn cables(&self) -> &[Cable] {
        &self.parts.cables
    }

    pub fn additional_items(&self) -> &[AdditionalComponent] {
        &self.parts.additional_items
    }

    pub fn mates(&self) -> &[Mate] {
        &self.parts.mates
    }

    /// Look up a connector by designator (case-insensitive)
    pub fn connector(&self, designator: &str) -> Result<&Connector> {
        let index = self.parts.connector_index(designator)?;
        Ok(&self.parts.connectors[index])
    }

    /// Look up a cable by designator (case-insensitive)
    pub fn cable(&self, designator: &str) -> Result<&Cable> {
        let index = self.parts.cable_index(designator)?;
        Ok(&self.parts.cables[index])
    }

    pub fn connector_multiplier(&self, designator: &str, multiplier: Option<&str>) -> Result<f64> {
        self.connector(designator)?.qty_multiplier(multiplier)
    }

    pub fn cable_multiplier(&self, designator: &str, multiplier: Option<&str>) -> Result<f64> {
        self.cable(designator)?.qty_multiplier(multiplier)
    }

    /// Every BOM-relevant component: connectors, cables, then standalone items
    pub fn components(&self) -> Vec<ComponentKind<'_>> {
        self.parts
            .connectors
            .iter()
            .map(ComponentKind::Connector)
            .chain(self.parts.cables.iter().map(ComponentKind::Cable))
            .chain(
                self.parts
                    .additional_items
                    .iter()
                    .map(ComponentKind::Additional),
            )
            .collect()
    }

    pub fn bom(&self) -> Result<Bom> {
        Bom::from_components(&self.components())
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext::for_cables(&self.parts.cables)
    }

    pub fn graph(&self) -> ConnectionGraph<'_> {
        ConnectionGraph::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::Reference;
    use crate::entities::mate::ArrowDirection;

    fn two_connectors_and_cable() -> Harness {
        let mut harness = Harness::default();
        harness.add_connector("A", ConnectorSpec::with_pincount(3)).unwrap();
        harness.add_connector("B", ConnectorSpec::with_pincount(3)).unwrap();
        harness.add_cable("W1", CableSpec::with_wirecount(2)).unwrap();
        harness
    }

    fn wire(harness: &mut Harness, pin: u32, wire: u32) {
        harness
            .connect(
                Some(&Endpoint::new("A", pin)),
                &Endpoint::new("W1", wire),
                Some(&Endpoint::new("B", pin)),
            )
            .unwrap();
    }

    #[test]
    fn test_connect_activates_pins_and_counts_terminations() {
        let mut harness = two_connectors_and_cable();
        wire(&mut harness, 1, 1);
        wire(&mut harness, 2, 2);
        let harness = harness.finalize();

        let a = harness.connector("A").unwrap();
        assert!(a.is_pin_active("1"));
        assert!(a.is_pin_active("2"));
        assert!(!a.is_pin_active("3"));
        assert_eq!(a.visible_pins().get("3"), Some(&false));
        assert!(a.ports_right() && !a.ports_left());
        assert!(harness.connector("B").unwrap().ports_left());

        assert_eq!(harness.connector_multiplier("A", Some("populated")).unwrap(), 2.0);
        assert_eq!(harness.cable_multiplier("W1", Some("terminations")).unwrap(), 2.0);
    }

    #[test]
    fn test_duplicate_connections_are_kept_in_order() {
        let mut harness = two_connectors_and_cable();
        wire(&mut harness, 1, 1);
        wire(&mut harness, 1, 1);
        let harness = harness.finalize();
        let w1 = harness.cable("W1").unwrap();
        assert_eq!(w1.connections().len(), 2);
        assert_eq!(w1.connections()[0], w1.connections()[1]);
    }

    #[test]
    fn test_open_ends() {
        let mut harness = two_connectors_and_cable();
        harness
            .connect(Some(&Endpoint::new("A", 3u32)), &Endpoint::new("W1", 2u32), None)
            .unwrap();
        let harness = harness.finalize();
        let connection = &harness.cable("W1").unwrap().connections()[0];
        assert_eq!(connection.from.as_ref().map(|p| p.id.as_str()), Some("3"));
        assert!(connection.to.is_none());
        assert_eq!(connection.via.id, "2");
    }

    #[test]
    fn test_failed_connect_leaves_harness_unchanged() {
        let mut harness = two_connectors_and_cable();
        let err = harness
            .connect(
                Some(&Endpoint::new("A", 1u32)),
                &Endpoint::new("W1", 1u32),
                Some(&Endpoint::new("B", 9u32)),
            )
            .unwrap_err();
        assert!(matches!(err, HarnessError::NotFound { .. }));

        let harness = harness.finalize();
        assert!(!harness.connector("A").unwrap().is_pin_active("1"));
        assert!(harness.cable("W1").unwrap().connections().is_empty());
    }

    #[test]
    fn test_unknown_designator() {
        let mut harness = two_connectors_and_cable();
        let err = harness
            .connect(None, &Endpoint::new("W9", 1u32), None)
            .unwrap_err();
        assert_eq!(err, HarnessError::not_found("W9"));
    }

    #[test]
    fn test_designators_are_case_insensitive_and_shared() {
        let mut harness = two_connectors_and_cable();
        let err = harness.add_cable("a", CableSpec::with_wirecount(1)).unwrap_err();
        assert!(matches!(err, HarnessError::DuplicateReference { .. }));

        harness
            .connect(Some(&Endpoint::new("a", 1u32)), &Endpoint::new("w1", 1u32), None)
            .unwrap();
    }

    #[test]
    fn test_connector_used_as_cable() {
        let mut harness = two_connectors_and_cable();
        let err = harness
            .connect(None, &Endpoint::new("A", 1u32), None)
            .unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
    }

    #[test]
    fn test_group_reference_must_be_expanded() {
        let mut harness = two_connectors_and_cable();
        let group = Endpoint {
            designator: "W1".to_string(),
            reference: Reference::Group(vec![Reference::from(1), Reference::from(2)]),
        };
        let err = harness.connect(None, &group, None).unwrap_err();
        assert!(matches!(err, HarnessError::StructuralValidation { .. }));
    }

    #[test]
    fn test_pin_mate_activates_pins() {
        let mut harness = two_connectors_and_cable();
        harness
            .add_mate_pin(&Endpoint::new("A", 3u32), &Endpoint::new("B", 3u32), "<=>")
            .unwrap();
        let harness = harness.finalize();

        assert!(harness.connector("A").unwrap().is_pin_active("3"));
        assert!(harness.connector("B").unwrap().is_pin_active("3"));
        let Mate::Pin(mate) = &harness.mates()[0] else {
            panic!("expected a pin mate");
        };
        assert_eq!(mate.arrow.direction, ArrowDirection::Both);
        assert_eq!(mate.arrow.weight, ArrowWeight::Single);
    }

    #[test]
    fn test_component_mate() {
        let mut harness = two_connectors_and_cable();
        harness.add_mate_component("a", "B", "==>").unwrap();
        assert!(matches!(
            harness.add_mate_component("A", "X9", "->").unwrap_err(),
            HarnessError::NotFound { .. }
        ));
        assert!(matches!(
            harness.add_mate_component("A", "B", "<~>").unwrap_err(),
            HarnessError::MalformedArrowToken { .. }
        ));

        let harness = harness.finalize();
        assert_eq!(harness.mates().len(), 1);
        let Mate::Component(mate) = &harness.mates()[0] else {
            panic!("expected a component mate");
        };
        assert_eq!(mate.from, "A");
        assert_eq!(mate.arrow.direction, ArrowDirection::Forward);
        assert_eq!(harness.connector("A").unwrap().populated_count(), 0);
    }
}
