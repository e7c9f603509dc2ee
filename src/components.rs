//! Connected-component discovery over a chosen atom subset.
//!
//! Pure read-only queries: callers pass the graph plus the atoms they care
//! about, and traversal is restricted to that subset. Repeated calls on an
//! unchanged graph and input visit atoms in the same order.

use std::collections::{HashSet, VecDeque};

use crate::graph::{AtomId, MolGraph};

/// Partition the given atoms into connected components ("molecules"),
/// breadth-first. Every live input atom lands in exactly one component;
/// isolated atoms form singletons. Edges leading outside the subset are
/// ignored, as are stale handles and duplicate entries.
pub fn connected_components(graph: &MolGraph, atoms: &[AtomId]) -> Vec<Vec<AtomId>> {
    let members: HashSet<AtomId> = atoms
        .iter()
        .copied()
        .filter(|&a| graph.contains_atom(a))
        .collect();

    let mut seen: HashSet<AtomId> = HashSet::with_capacity(members.len());
    let mut components = Vec::new();
    for &start in atoms {
        if !members.contains(&start) || !seen.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in graph.neighbors(current) {
                if members.contains(&neighbor) && seen.insert(neighbor) {
                    component.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }
    components
}

/// True iff the input is non-empty and forms a single connected component.
pub fn all_connected(graph: &MolGraph, atoms: &[AtomId]) -> bool {
    let components = connected_components(graph, atoms);
    components.len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::SiteRef;
    use crate::bond::BondOrder;
    use crate::element::Element;

    fn water() -> (MolGraph, Vec<AtomId>) {
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

    #[test]
    fn single_molecule() {
        let (graph, atoms) = water();
        let components = connected_components(&graph, &atoms);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
        assert!(all_connected(&graph, &atoms));
    }

    #[test]
    fn isolated_atom_is_singleton() {
        let (mut graph, mut atoms) = water();
        let lone = graph.add_atom(Element::He);
        atoms.push(lone);

        let components = connected_components(&graph, &atoms);
        assert_eq!(components.len(), 2);
        assert_eq!(components[1], vec![lone]);
        assert!(!all_connected(&graph, &atoms));
    }

    #[test]
    fn subset_restriction_cuts_paths() {
        let (graph, atoms) = water();
        // drop the oxygen: the two hydrogens are no longer connected
        let hydrogens = [atoms[1], atoms[2]];
        let components = connected_components(&graph, &hydrogens);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn empty_input_is_not_connected() {
        let graph = MolGraph::new();
        assert!(connected_components(&graph, &[]).is_empty());
        assert!(!all_connected(&graph, &[]));
    }

    #[test]
    fn stale_and_duplicate_handles_ignored() {
        let (mut graph, mut atoms) = water();
        let ghost = graph.add_atom(Element::H);
        graph.remove_atom(ghost);
        atoms.push(ghost);
        atoms.push(atoms[0]);

        let components = connected_components(&graph, &atoms);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn repeated_calls_traverse_identically() {
        let (graph, atoms) = water();
        let first = connected_components(&graph, &atoms);
        let second = connected_components(&graph, &atoms);
        assert_eq!(first, second);
    }

    #[test]
    fn single_atom_is_connected() {
        let mut graph = MolGraph::new();
        let c = graph.add_atom(Element::C);
        assert!(all_connected(&graph, &[c]));
    }
}
