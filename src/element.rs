use serde::{Deserialize, Serialize};

use crate::geometry::SiteGeometry;

/// Elements available on the assembly workbench.
///
/// Discriminants are atomic numbers. The set covers the main-group elements
/// a builder can pick up; `max_bonds` is the simplified valence capacity
/// used by the bonding rules, not a full oxidation-state model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Br = 35,
    I = 53,
}

pub const ELEMENTS: [Element; 20] = [
    Element::H,
    Element::He,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Ne,
    Element::Na,
    Element::Mg,
    Element::Al,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Ar,
    Element::K,
    Element::Ca,
    Element::Br,
    Element::I,
];

impl Element {
    pub fn from_symbol(s: &str) -> Option<Element> {
        ELEMENTS.iter().copied().find(|e| e.symbol() == s)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::H => "hydrogen",
            Element::He => "helium",
            Element::B => "boron",
            Element::C => "carbon",
            Element::N => "nitrogen",
            Element::O => "oxygen",
            Element::F => "fluorine",
            Element::Ne => "neon",
            Element::Na => "sodium",
            Element::Mg => "magnesium",
            Element::Al => "aluminium",
            Element::Si => "silicon",
            Element::P => "phosphorus",
            Element::S => "sulfur",
            Element::Cl => "chlorine",
            Element::Ar => "argon",
            Element::K => "potassium",
            Element::Ca => "calcium",
            Element::Br => "bromine",
            Element::I => "iodine",
        }
    }

    /// Valence capacity: the total bond-order sum this element accepts.
    pub fn max_bonds(self) -> u8 {
        match self {
            Element::He | Element::Ne | Element::Ar => 0,
            Element::H
            | Element::F
            | Element::Na
            | Element::Cl
            | Element::K
            | Element::Br
            | Element::I => 1,
            Element::O | Element::Mg | Element::Ca => 2,
            Element::B | Element::N | Element::Al => 3,
            Element::C | Element::Si => 4,
            Element::P => 5,
            Element::S => 6,
        }
    }

    /// Spatial arrangement of this element's bond sites. Site count equals
    /// `max_bonds`, which keeps the geometry and the valence math in step.
    pub fn site_geometry(self) -> SiteGeometry {
        SiteGeometry::for_capacity(self.max_bonds())
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
