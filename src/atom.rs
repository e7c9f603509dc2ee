use crate::element::Element;
use crate::graph::{AtomId, BondId};

/// A discrete attachment point on an atom where exactly one bond may
/// terminate.
///
/// Sites are created with their atom, one per unit of valence capacity,
/// each pointing along a direction from the element's geometry template.
/// A site is occupied iff exactly one live bond consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondSite {
    direction: [f64; 3],
    occupied_by: Option<BondId>,
}

impl BondSite {
    pub(crate) fn new(direction: [f64; 3]) -> Self {
        Self {
            direction,
            occupied_by: None,
        }
    }

    /// Unit vector from the atom's center toward this site.
    pub fn direction(&self) -> [f64; 3] {
        self.direction
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }

    /// The bond consuming this site, if any.
    pub fn occupied_by(&self) -> Option<BondId> {
        self.occupied_by
    }

    pub(crate) fn occupy(&mut self, bond: BondId) {
        self.occupied_by = Some(bond);
    }

    pub(crate) fn release(&mut self) {
        self.occupied_by = None;
    }
}

/// Node weight of the molecule graph.
///
/// An atom carries its element identity and its fixed collection of bond
/// sites. Logical adjacency lives on the graph itself; the atom does not
/// duplicate a neighbor list.
///
/// # Examples
///
/// ```
/// use molbuild::{Element, MolGraph};
///
/// let mut graph = MolGraph::new();
/// let o = graph.add_atom(Element::O);
/// let atom = graph.atom(o).unwrap();
/// assert_eq!(atom.element(), Element::O);
/// assert_eq!(atom.sites().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    element: Element,
    sites: Vec<BondSite>,
}

impl Atom {
    pub(crate) fn new(element: Element) -> Self {
        let sites = element
            .site_geometry()
            .directions()
            .iter()
            .map(|&d| BondSite::new(d))
            .collect();
        Self { element, sites }
    }

    pub fn element(&self) -> Element {
        self.element
    }

    /// Valence capacity of this atom's element.
    pub fn max_bonds(&self) -> u8 {
        self.element.max_bonds()
    }

    pub fn sites(&self) -> &[BondSite] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> Option<&BondSite> {
        self.sites.get(index)
    }

    pub(crate) fn site_mut(&mut self, index: usize) -> Option<&mut BondSite> {
        self.sites.get_mut(index)
    }

    /// Index of the first unoccupied site, if one remains.
    pub fn free_site(&self) -> Option<usize> {
        self.sites.iter().position(|s| !s.is_occupied())
    }
}

/// Addresses one bond site on one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteRef {
    pub atom: AtomId,
    pub site: usize,
}

impl SiteRef {
    pub fn new(atom: AtomId, site: usize) -> Self {
        Self { atom, site }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::stable_graph::EdgeIndex;

    #[test]
    fn sites_follow_geometry() {
        let carbon = Atom::new(Element::C);
        assert_eq!(carbon.sites().len(), 4);
        assert!(carbon.sites().iter().all(|s| !s.is_occupied()));

        let helium = Atom::new(Element::He);
        assert!(helium.sites().is_empty());
        assert_eq!(helium.free_site(), None);
    }

    #[test]
    fn occupy_release() {
        let mut oxygen = Atom::new(Element::O);
        assert_eq!(oxygen.free_site(), Some(0));

        let bond = EdgeIndex::new(7);
        if let Some(s) = oxygen.site_mut(0) {
            s.occupy(bond);
        }
        assert!(oxygen.site(0).is_some_and(|s| s.is_occupied()));
        assert_eq!(oxygen.site(0).and_then(|s| s.occupied_by()), Some(bond));
        assert_eq!(oxygen.free_site(), Some(1));

        if let Some(s) = oxygen.site_mut(0) {
            s.release();
        }
        assert_eq!(oxygen.free_site(), Some(0));
    }

    #[test]
    fn site_out_of_range() {
        let hydrogen = Atom::new(Element::H);
        assert!(hydrogen.site(1).is_none());
    }
}
