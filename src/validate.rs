//! Structural validation of a built atom set against a target definition.
//!
//! Checks run in a fixed order: connectivity, element counts, a defensive
//! valence re-check, and (when the definition carries a reference graph)
//! the color-refinement structure check. Failures are data in the returned
//! [`ValidationResult`], never panics — an invalid player-built molecule is
//! the expected common case.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::components::all_connected;
use crate::definition::MoleculeDefinition;
use crate::element::Element;
use crate::graph::{AtomId, MolGraph};
use crate::refine::{refinement_match, ColorView};

/// One diagnostic from a failed validation. `Display` renders the
/// human-readable message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("atoms are not all connected")]
    Disconnected,
    #[error("expected {expected} × {element}, found {actual}")]
    AtomCountMismatch {
        element: Element,
        actual: u32,
        expected: u32,
    },
    #[error("valence capacity exceeded on a {element} atom")]
    ValenceExceeded { element: Element },
    #[error("connected structure does not match the target molecule")]
    StructureMismatch,
}

/// Outcome of a validation run. `score` and `molecule_name` are populated
/// only on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub score: Option<u32>,
    pub molecule_name: Option<String>,
}

impl ValidationResult {
    fn failure(errors: Vec<ValidationError>) -> ValidationResult {
        ValidationResult {
            is_valid: false,
            errors,
            score: None,
            molecule_name: None,
        }
    }

    fn success(definition: &MoleculeDefinition) -> ValidationResult {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            score: Some(definition.score),
            molecule_name: Some(definition.name.clone()),
        }
    }

    /// Rendered diagnostics, in check order, for direct display.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Validate the built atoms against a definition.
///
/// The graph is only read. Stale handles and duplicates in `atoms` are
/// dropped up front; validation judges the live, deduplicated build set.
pub fn validate(
    graph: &MolGraph,
    atoms: &[AtomId],
    definition: &MoleculeDefinition,
) -> ValidationResult {
    let mut seen = HashSet::new();
    let live: Vec<AtomId> = atoms
        .iter()
        .copied()
        .filter(|&a| graph.contains_atom(a) && seen.insert(a))
        .collect();

    // 1. connectivity: a fragmented build fails before anything else
    if !all_connected(graph, &live) {
        return ValidationResult::failure(vec![ValidationError::Disconnected]);
    }

    let mut errors = Vec::new();

    // 2. element counts; mismatches do not stop the valence check below
    let counts = element_counts(graph, &live);
    for (&element, &expected) in &definition.required_atoms {
        let actual = counts.get(&element).copied().unwrap_or(0);
        if actual != expected {
            errors.push(ValidationError::AtomCountMismatch {
                element,
                actual,
                expected,
            });
        }
    }
    for (&element, &actual) in &counts {
        if !definition.required_atoms.contains_key(&element) {
            errors.push(ValidationError::AtomCountMismatch {
                element,
                actual,
                expected: 0,
            });
        }
    }

    // 3. valence re-check. Bond creation already enforces the capacity
    // invariant; a violation here means corrupted state, and the structure
    // check must not run on it.
    let mut valence_ok = true;
    for &id in &live {
        if let Some(atom) = graph.atom(id) {
            if graph.used_valence(id) > atom.max_bonds() {
                errors.push(ValidationError::ValenceExceeded {
                    element: atom.element(),
                });
                valence_ok = false;
            }
        }
    }
    if !valence_ok || !errors.is_empty() {
        return ValidationResult::failure(errors);
    }

    // 4. structure, only against a supplied reference
    if let Some(reference) = &definition.reference {
        let built = ColorView::from_graph(graph, &live);
        let target = ColorView::from_reference(reference);
        if !refinement_match(&built, &target) {
            return ValidationResult::failure(vec![ValidationError::StructureMismatch]);
        }
    }

    ValidationResult::success(definition)
}

fn element_counts(graph: &MolGraph, atoms: &[AtomId]) -> BTreeMap<Element, u32> {
    let mut counts = BTreeMap::new();
    for &id in atoms {
        if let Some(atom) = graph.atom(id) {
            *counts.entry(atom.element()).or_default() += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::SiteRef;
    use crate::bond::BondOrder;
    use crate::definition::ReferenceGraph;

    fn water_graph() -> (MolGraph, Vec<AtomId>) {
        let mut graph = MolGraph::new();
        let o = graph.add_atom(Element::O);
        let h1 = graph.add_atom(Element::H);
        let h2 = graph.add_atom(Element::H);
        graph
            .create_bond(SiteRef::new(o, 0), SiteRef::new(h1, 0), BondOrder::Single)
            .unwrap();
        graph
            .create_bond(SiteRef::new(o, 1), SiteRef::new(h2, 0), BondOrder::Single)
            .unwrap();
        (graph, vec![o, h1, h2])
    }

    fn water_definition() -> MoleculeDefinition {
        MoleculeDefinition::count_only("Water", 100, [(Element::H, 2), (Element::O, 1)])
    }

    #[test]
    fn count_only_success() {
        let (graph, atoms) = water_graph();
        let result = validate(&graph, &atoms, &water_definition());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.score, Some(100));
        assert_eq!(result.molecule_name.as_deref(), Some("Water"));
    }

    #[test]
    fn disconnected_fails_first() {
        let mut graph = MolGraph::new();
        let o = graph.add_atom(Element::O);
        let h1 = graph.add_atom(Element::H);
        let h2 = graph.add_atom(Element::H);
        graph
            .create_bond(SiteRef::new(o, 0), SiteRef::new(h1, 0), BondOrder::Single)
            .unwrap();

        let result = validate(&graph, &[o, h1, h2], &water_definition());
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ValidationError::Disconnected]);
        assert!(result.error_messages()[0].contains("not all connected"));
        assert_eq!(result.score, None);
    }

    #[test]
    fn count_mismatches_are_itemized() {
        let mut graph = MolGraph::new();
        let o = graph.add_atom(Element::O);
        let h = graph.add_atom(Element::H);
        graph
            .create_bond(SiteRef::new(o, 0), SiteRef::new(h, 0), BondOrder::Single)
            .unwrap();

        let result = validate(&graph, &[o, h], &water_definition());
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![ValidationError::AtomCountMismatch {
                element: Element::H,
                actual: 1,
                expected: 2,
            }]
        );
    }

    #[test]
    fn extra_element_reported_with_zero_expected() {
        let mut graph = MolGraph::new();
        let n1 = graph.add_atom(Element::N);
        let n2 = graph.add_atom(Element::N);
        graph
            .create_bond(SiteRef::new(n1, 0), SiteRef::new(n2, 0), BondOrder::Triple)
            .unwrap();

        let definition =
            MoleculeDefinition::count_only("Molecular oxygen", 150, [(Element::O, 2)]);
        let result = validate(&graph, &[n1, n2], &definition);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![
                ValidationError::AtomCountMismatch {
                    element: Element::O,
                    actual: 0,
                    expected: 2,
                },
                ValidationError::AtomCountMismatch {
                    element: Element::N,
                    actual: 2,
                    expected: 0,
                },
            ]
        );
    }

    #[test]
    fn corrupted_valence_is_caught_defensively() {
        let (mut graph, atoms) = water_graph();
        // corrupt the state behind the manager's back: H cannot carry a
        // triple bond
        let bond = graph.bond_between(atoms[0], atoms[1]).unwrap();
        graph.force_order(bond, BondOrder::Triple);

        let result = validate(&graph, &atoms, &water_definition());
        assert!(!result.is_valid);
        assert!(result
            .errors
            .contains(&ValidationError::ValenceExceeded { element: Element::H }));
        // structure check must not have produced a verdict
        assert!(!result.errors.contains(&ValidationError::StructureMismatch));
    }

    #[test]
    fn structural_match_passes() {
        let (graph, atoms) = water_graph();
        let reference = ReferenceGraph::from_named(&[
            ("O1", &[("H1", BondOrder::Single), ("H2", BondOrder::Single)]),
            ("H1", &[]),
            ("H2", &[]),
        ])
        .unwrap();
        let definition = MoleculeDefinition::structural("Water", 100, reference);

        let result = validate(&graph, &atoms, &definition);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn structural_mismatch_reported() {
        // 4-carbon star against a 4-carbon chain reference: identical
        // element counts, different topology
        let mut graph = MolGraph::new();
        let center = graph.add_atom(Element::C);
        let arms: Vec<AtomId> = (0..3).map(|_| graph.add_atom(Element::C)).collect();
        for (i, &arm) in arms.iter().enumerate() {
            graph
                .create_bond(SiteRef::new(center, i), SiteRef::new(arm, 0), BondOrder::Single)
                .unwrap();
        }
        let mut atoms = vec![center];
        atoms.extend(&arms);

        let chain_reference = ReferenceGraph::from_named(&[
            ("C1", &[("C2", BondOrder::Single)]),
            ("C2", &[("C3", BondOrder::Single)]),
            ("C3", &[("C4", BondOrder::Single)]),
            ("C4", &[]),
        ])
        .unwrap();
        let definition = MoleculeDefinition::structural("Butane skeleton", 200, chain_reference);

        let result = validate(&graph, &atoms, &definition);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ValidationError::StructureMismatch]);
    }

    #[test]
    fn empty_build_set_is_disconnected() {
        let graph = MolGraph::new();
        let result = validate(&graph, &[], &water_definition());
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![ValidationError::Disconnected]);
    }

    #[test]
    fn stale_handles_dropped_before_judging() {
        let (mut graph, mut atoms) = water_graph();
        let ghost = graph.add_atom(Element::N);
        graph.remove_atom(ghost);
        atoms.push(ghost);

        let result = validate(&graph, &atoms, &water_definition());
        assert!(result.is_valid);
    }
}
