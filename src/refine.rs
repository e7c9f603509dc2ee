//! Color refinement between a built molecule graph and a reference graph.
//!
//! This is 1-dimensional Weisfeiler–Leman refinement run jointly over both
//! graphs: nodes start colored by element, then each round recolors every
//! node by its (color, sorted neighbor signature) pair, with signatures
//! numbered canonically across the union of both graphs. The color
//! multisets of the two graphs are compared after every round; any
//! divergence proves non-isomorphism. Bond orders participate as edge
//! labels in the neighbor signatures, which is what separates a double bond
//! from a single bond over otherwise identical topology.
//!
//! Reaching the fixed point without divergence is treated as a match. That
//! is a necessary-not-sufficient condition for true isomorphism: rare
//! regular-graph pairs can agree under refinement while differing in
//! structure. For molecule-scale inputs this is an accepted approximation.

use crate::definition::ReferenceGraph;
use crate::element::Element;
use crate::graph::{AtomId, MolGraph};

/// Immutable labeled-adjacency snapshot consumed by the refinement loop.
///
/// Node order is the order atoms were supplied in; adjacency entries carry
/// the bond-order cost as an edge label.
#[derive(Debug, Clone)]
pub struct ColorView {
    labels: Vec<Element>,
    adj: Vec<Vec<(usize, u8)>>,
}

impl ColorView {
    /// Snapshot the subgraph induced by `atoms`. Stale handles are skipped;
    /// bonds leading outside the subset are ignored.
    pub fn from_graph(graph: &MolGraph, atoms: &[AtomId]) -> ColorView {
        let mut live = Vec::with_capacity(atoms.len());
        let mut labels = Vec::with_capacity(atoms.len());
        for &id in atoms {
            if let Some(atom) = graph.atom(id) {
                live.push(id);
                labels.push(atom.element());
            }
        }
        let index_of: std::collections::HashMap<AtomId, usize> = live
            .iter()
            .enumerate()
            .map(|(i, &a)| (a, i))
            .collect();

        let mut adj = vec![Vec::new(); live.len()];
        for (i, &id) in live.iter().enumerate() {
            for bond_id in graph.bonds_of(id) {
                let Some((a, b)) = graph.bond_endpoints(bond_id) else {
                    continue;
                };
                let other = if a == id { b } else { a };
                if let (Some(&j), Some(bond)) = (index_of.get(&other), graph.bond(bond_id)) {
                    adj[i].push((j, bond.order().cost()));
                }
            }
        }
        ColorView { labels, adj }
    }

    pub fn from_reference(reference: &ReferenceGraph) -> ColorView {
        let labels = reference.atoms().to_vec();
        let mut adj = vec![Vec::new(); labels.len()];
        for bond in reference.bonds() {
            adj[bond.a].push((bond.b, bond.order.cost()));
            adj[bond.b].push((bond.a, bond.order.cost()));
        }
        ColorView { labels, adj }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn signatures(&self, colors: &[usize]) -> Vec<Signature> {
        (0..self.len())
            .map(|i| {
                let mut neighborhood: Vec<(u8, usize)> = self.adj[i]
                    .iter()
                    .map(|&(j, cost)| (cost, colors[j]))
                    .collect();
                neighborhood.sort_unstable();
                (colors[i], neighborhood)
            })
            .collect()
    }
}

type Signature = (usize, Vec<(u8, usize)>);

/// Decide whether the two graphs can be isomorphic under color refinement.
///
/// `false` is a proof of structural difference; `true` means refinement
/// reached its fixed point without telling the graphs apart.
pub fn refinement_match(built: &ColorView, target: &ColorView) -> bool {
    if built.len() != target.len() {
        return false;
    }
    if built.is_empty() {
        return true;
    }

    let (mut colors_a, mut colors_b) = initial_colors(built, target);
    if !same_multiset(&colors_a, &colors_b) {
        return false;
    }
    let mut distinct = count_distinct(&colors_a);

    // each effective round splits at least one color class, so this
    // terminates within node-count rounds
    loop {
        let sigs_a = built.signatures(&colors_a);
        let sigs_b = target.signatures(&colors_b);

        let mut palette: Vec<&Signature> = sigs_a.iter().chain(sigs_b.iter()).collect();
        palette.sort_unstable();
        palette.dedup();
        let recolor = |sigs: &[Signature]| -> Vec<usize> {
            sigs.iter()
                .map(|s| palette.binary_search(&s).unwrap_or(0))
                .collect()
        };
        let next_a = recolor(&sigs_a);
        let next_b = recolor(&sigs_b);

        if !same_multiset(&next_a, &next_b) {
            return false;
        }
        let next_distinct = count_distinct(&next_a);
        if next_distinct <= distinct {
            return true;
        }
        colors_a = next_a;
        colors_b = next_b;
        distinct = next_distinct;
    }
}

fn initial_colors(a: &ColorView, b: &ColorView) -> (Vec<usize>, Vec<usize>) {
    let mut palette: Vec<Element> = a.labels.iter().chain(b.labels.iter()).copied().collect();
    palette.sort_unstable();
    palette.dedup();
    let color = |labels: &[Element]| -> Vec<usize> {
        labels
            .iter()
            .map(|e| palette.binary_search(e).unwrap_or(0))
            .collect()
    };
    (color(&a.labels), color(&b.labels))
}

fn same_multiset(a: &[usize], b: &[usize]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

fn count_distinct(colors: &[usize]) -> usize {
    let mut sorted = colors.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}
