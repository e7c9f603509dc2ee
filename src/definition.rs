//! Target molecule definitions.
//!
//! Definitions are configuration: the level/asset layer produces them (JSON
//! in the test fixtures) and passes them to the validator verbatim. A
//! definition always carries required element counts; the reference graph is
//! optional, and its absence means count-only validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bond::BondOrder;
use crate::element::Element;

/// Why a reference graph was rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("reference bond {a}-{b} is out of range for {atoms} atoms")]
    BondOutOfRange { a: usize, b: usize, atoms: usize },
    #[error("reference bond connects atom {0} to itself")]
    SelfLoop(usize),
    #[error("conflicting reference bonds between atoms {a} and {b}")]
    ConflictingBond { a: usize, b: usize },
    #[error("instance name {0:?} does not name a supported element")]
    UnknownInstance(String),
    #[error("instance name {0:?} declared twice")]
    DuplicateInstance(String),
    #[error("instance {from:?} references undeclared neighbor {to:?}")]
    UnknownNeighbor { from: String, to: String },
}

/// One edge of a reference graph, by atom index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceBond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ReferenceGraphData {
    atoms: Vec<Element>,
    #[serde(default)]
    bonds: Vec<ReferenceBond>,
}

/// Target adjacency with bond orders, used by the structural check.
///
/// Construction rejects self-loops, out-of-range indices, and conflicting
/// duplicate pairs, so a held `ReferenceGraph` is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReferenceGraphData")]
pub struct ReferenceGraph {
    atoms: Vec<Element>,
    bonds: Vec<ReferenceBond>,
}

impl TryFrom<ReferenceGraphData> for ReferenceGraph {
    type Error = DefinitionError;

    fn try_from(data: ReferenceGraphData) -> Result<Self, Self::Error> {
        ReferenceGraph::new(data.atoms, data.bonds)
    }
}

impl ReferenceGraph {
    pub fn new(
        atoms: Vec<Element>,
        bonds: Vec<ReferenceBond>,
    ) -> Result<ReferenceGraph, DefinitionError> {
        let mut seen: BTreeMap<(usize, usize), BondOrder> = BTreeMap::new();
        let mut kept = Vec::with_capacity(bonds.len());
        for bond in bonds {
            if bond.a == bond.b {
                return Err(DefinitionError::SelfLoop(bond.a));
            }
            if bond.a >= atoms.len() || bond.b >= atoms.len() {
                return Err(DefinitionError::BondOutOfRange {
                    a: bond.a,
                    b: bond.b,
                    atoms: atoms.len(),
                });
            }
            let key = (bond.a.min(bond.b), bond.a.max(bond.b));
            match seen.get(&key) {
                None => {
                    seen.insert(key, bond.order);
                    kept.push(bond);
                }
                Some(&order) if order == bond.order => {} // symmetric restatement
                Some(_) => {
                    return Err(DefinitionError::ConflictingBond { a: key.0, b: key.1 });
                }
            }
        }
        Ok(ReferenceGraph { atoms, bonds: kept })
    }

    /// Build from named-instance adjacency, e.g.
    /// `[("O1", [("O2", Double)]), ("O2", [])]`. The element is derived from
    /// each instance name by stripping its trailing index digits. Listing a
    /// bond from both endpoints is allowed as long as the orders agree.
    pub fn from_named(
        entries: &[(&str, &[(&str, BondOrder)])],
    ) -> Result<ReferenceGraph, DefinitionError> {
        let mut atoms = Vec::with_capacity(entries.len());
        let mut index_of: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, &(name, _)) in entries.iter().enumerate() {
            atoms.push(instance_element(name)?);
            if index_of.insert(name, i).is_some() {
                return Err(DefinitionError::DuplicateInstance(name.to_string()));
            }
        }
        let mut bonds = Vec::new();
        for &(name, neighbors) in entries {
            let from = index_of[name];
            for &(neighbor, order) in neighbors {
                let to = *index_of
                    .get(neighbor)
                    .ok_or_else(|| DefinitionError::UnknownNeighbor {
                        from: name.to_string(),
                        to: neighbor.to_string(),
                    })?;
                bonds.push(ReferenceBond { a: from, b: to, order });
            }
        }
        ReferenceGraph::new(atoms, bonds)
    }

    pub fn atoms(&self) -> &[Element] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[ReferenceBond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Element tally of the reference atoms.
    pub fn element_counts(&self) -> BTreeMap<Element, u32> {
        let mut counts = BTreeMap::new();
        for &e in &self.atoms {
            *counts.entry(e).or_default() += 1;
        }
        counts
    }
}

fn instance_element(name: &str) -> Result<Element, DefinitionError> {
    let symbol = name.trim_end_matches(|c: char| c.is_ascii_digit());
    Element::from_symbol(symbol).ok_or_else(|| DefinitionError::UnknownInstance(name.to_string()))
}

/// What the player is asked to build: a display name, a reward score, the
/// exact element counts, and optionally the target structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeDefinition {
    pub name: String,
    #[serde(default)]
    pub score: u32,
    pub required_atoms: BTreeMap<Element, u32>,
    #[serde(default)]
    pub reference: Option<ReferenceGraph>,
}

impl MoleculeDefinition {
    /// Count-only definition: any connected arrangement of the required
    /// atoms passes.
    pub fn count_only(
        name: impl Into<String>,
        score: u32,
        required: impl IntoIterator<Item = (Element, u32)>,
    ) -> MoleculeDefinition {
        MoleculeDefinition {
            name: name.into(),
            score,
            required_atoms: required.into_iter().collect(),
            reference: None,
        }
    }

    /// Structural definition: required counts are derived from the
    /// reference graph's atom list.
    pub fn structural(
        name: impl Into<String>,
        score: u32,
        reference: ReferenceGraph,
    ) -> MoleculeDefinition {
        MoleculeDefinition {
            name: name.into(),
            score,
            required_atoms: reference.element_counts(),
            reference: Some(reference),
        }
    }
}
