use log::warn;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::atom::{Atom, BondSite, SiteRef};
use crate::bond::{Bond, BondOrder};
use crate::element::Element;

/// Stable handle to an atom. Remains valid until the atom is removed.
pub type AtomId = NodeIndex;

/// Stable handle to a bond. Remains valid until the bond is removed.
pub type BondId = EdgeIndex;

/// Why a bond mutation was refused. No variant leaves partial state behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BondError {
    #[error("both bond sites belong to the same atom")]
    SameAtom,
    #[error("no atom for handle {0:?}")]
    UnknownAtom(AtomId),
    #[error("atom {atom:?} has no bond site {site}", atom = .0.atom, site = .0.site)]
    NoSuchSite(SiteRef),
    #[error("bond site {site} on atom {atom:?} is already occupied", atom = .0.atom, site = .0.site)]
    SiteOccupied(SiteRef),
    #[error("a bond between these atoms already exists")]
    DuplicateBond,
    #[error("bond order would exceed valence capacity of atom {0:?}")]
    ValenceExceeded(AtomId),
    #[error("no bond for handle {0:?}")]
    UnknownBond(BondId),
}

/// The molecule graph: atoms as nodes, bonds as edges, owned in one place.
///
/// Backed by a stable-index petgraph arena so atom and bond handles survive
/// unrelated removals. All bond creation and removal goes through this type,
/// which is what upholds the occupancy, no-duplicate-bond, and valence
/// invariants. Validation only ever reads this state.
#[derive(Debug, Clone, Default)]
pub struct MolGraph {
    graph: StableUnGraph<Atom, Bond>,
}

impl MolGraph {
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
        }
    }

    /// Spawn an atom of the given element with its geometry-derived sites,
    /// initially unbonded.
    pub fn add_atom(&mut self, element: Element) -> AtomId {
        self.graph.add_node(Atom::new(element))
    }

    /// Destroy an atom: every incident bond is removed first (releasing the
    /// partner atoms' sites), then the atom itself. Unknown handles are
    /// logged and ignored.
    pub fn remove_atom(&mut self, id: AtomId) {
        if !self.graph.contains_node(id) {
            warn!("remove_atom: stale atom handle {id:?}");
            return;
        }
        let incident: Vec<BondId> = self.bonds_of(id).collect();
        for bond in incident {
            self.remove_bond(bond);
        }
        self.graph.remove_node(id);
    }

    /// Connect two free bond sites with a bond of the given order.
    ///
    /// Preconditions, all checked before any state changes: the sites belong
    /// to two distinct live atoms, both sites exist and are unoccupied, no
    /// bond already connects the pair, and both endpoints stay within their
    /// valence capacity. A failed call mutates nothing.
    pub fn create_bond(
        &mut self,
        a: SiteRef,
        b: SiteRef,
        order: BondOrder,
    ) -> Result<BondId, BondError> {
        if a.atom == b.atom {
            return Err(BondError::SameAtom);
        }
        self.check_site_free(a)?;
        self.check_site_free(b)?;
        if self.graph.find_edge(a.atom, b.atom).is_some() {
            return Err(BondError::DuplicateBond);
        }
        self.check_headroom(a.atom, order.cost())?;
        self.check_headroom(b.atom, order.cost())?;

        let id = self
            .graph
            .add_edge(a.atom, b.atom, Bond::new(order, [a.site, b.site]));
        self.occupy_site(a, id);
        self.occupy_site(b, id);
        Ok(id)
    }

    /// Remove a bond, releasing both endpoints' sites. Each side is
    /// null-checked independently, so the call is safe on stale handles and
    /// mid-way through atom destruction.
    pub fn remove_bond(&mut self, id: BondId) {
        let Some((a, b)) = self.graph.edge_endpoints(id) else {
            warn!("remove_bond: stale bond handle {id:?}");
            return;
        };
        let sites = self.graph.edge_weight(id).map(|bond| bond.sites());
        self.graph.remove_edge(id);
        if let Some([site_a, site_b]) = sites {
            self.release_site(SiteRef::new(a, site_a));
            self.release_site(SiteRef::new(b, site_b));
        }
    }

    /// Canonical valence accounting: the sum of bond-order costs across all
    /// bonds touching the atom. Every other valence check routes through
    /// here.
    pub fn used_valence(&self, id: AtomId) -> u8 {
        self.graph
            .edges(id)
            .map(|e| e.weight().order().cost())
            .sum()
    }

    /// Remaining capacity: `max_bonds - used_valence`, saturating at zero.
    pub fn free_valence(&self, id: AtomId) -> u8 {
        match self.graph.node_weight(id) {
            Some(atom) => atom.max_bonds().saturating_sub(self.used_valence(id)),
            None => 0,
        }
    }

    /// Whether changing a bond to `new` keeps both endpoints within their
    /// valence capacity. Downgrades are always allowed. Stale handles
    /// answer `false`.
    pub fn can_set_order(&self, id: BondId, new: BondOrder) -> bool {
        match self.order_change_blocker(id, new) {
            Ok(blocker) => blocker.is_none(),
            Err(_) => false,
        }
    }

    /// Change a bond's order, guarded by [`can_set_order`](Self::can_set_order).
    pub fn set_order(&mut self, id: BondId, new: BondOrder) -> Result<(), BondError> {
        if let Some(atom) = self.order_change_blocker(id, new)? {
            return Err(BondError::ValenceExceeded(atom));
        }
        if let Some(bond) = self.graph.edge_weight_mut(id) {
            bond.set_order(new);
        }
        Ok(())
    }

    /// Advance a bond through the Single → Double → Triple → Single cycle,
    /// settling on the first order the valence guard admits. Wrapping back
    /// to the current order is a no-op; the resulting order is returned.
    pub fn cycle_order(&mut self, id: BondId) -> Result<BondOrder, BondError> {
        let current = self
            .graph
            .edge_weight(id)
            .ok_or(BondError::UnknownBond(id))?
            .order();
        let mut next = current.successor();
        while next != current && !self.can_set_order(id, next) {
            next = next.successor();
        }
        self.set_order(id, next)?;
        Ok(next)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.graph.node_weight(id)
    }

    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.graph.edge_weight(id)
    }

    pub fn site(&self, site: SiteRef) -> Option<&BondSite> {
        self.atom(site.atom)?.site(site.site)
    }

    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = BondId> + '_ {
        self.graph.edge_indices()
    }

    pub fn neighbors(&self, id: AtomId) -> impl Iterator<Item = AtomId> + '_ {
        self.graph.neighbors(id)
    }

    pub fn bonds_of(&self, id: AtomId) -> impl Iterator<Item = BondId> + '_ {
        self.graph.edges(id).map(|e| e.id())
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, id: BondId) -> Option<(AtomId, AtomId)> {
        self.graph.edge_endpoints(id)
    }

    fn check_site_free(&self, site: SiteRef) -> Result<(), BondError> {
        let atom = self
            .graph
            .node_weight(site.atom)
            .ok_or(BondError::UnknownAtom(site.atom))?;
        let slot = atom.site(site.site).ok_or(BondError::NoSuchSite(site))?;
        if slot.is_occupied() {
            return Err(BondError::SiteOccupied(site));
        }
        Ok(())
    }

    fn check_headroom(&self, id: AtomId, cost: u8) -> Result<(), BondError> {
        let atom = self
            .graph
            .node_weight(id)
            .ok_or(BondError::UnknownAtom(id))?;
        if self.used_valence(id) + cost > atom.max_bonds() {
            return Err(BondError::ValenceExceeded(id));
        }
        Ok(())
    }

    /// Endpoint that would exceed capacity if the bond changed to `new`, or
    /// `None` when the change fits.
    fn order_change_blocker(
        &self,
        id: BondId,
        new: BondOrder,
    ) -> Result<Option<AtomId>, BondError> {
        let bond = self.graph.edge_weight(id).ok_or(BondError::UnknownBond(id))?;
        let (a, b) = self
            .graph
            .edge_endpoints(id)
            .ok_or(BondError::UnknownBond(id))?;
        let delta = i16::from(new.cost()) - i16::from(bond.order().cost());
        if delta <= 0 {
            return Ok(None);
        }
        for atom in [a, b] {
            if i16::from(self.free_valence(atom)) < delta {
                return Ok(Some(atom));
            }
        }
        Ok(None)
    }

    fn occupy_site(&mut self, site: SiteRef, bond: BondId) {
        match self
            .graph
            .node_weight_mut(site.atom)
            .and_then(|a| a.site_mut(site.site))
        {
            Some(slot) => slot.occupy(bond),
            None => warn!("occupy_site: missing site {site:?}"),
        }
    }

    fn release_site(&mut self, site: SiteRef) {
        match self
            .graph
            .node_weight_mut(site.atom)
            .and_then(|a| a.site_mut(site.site))
        {
            Some(slot) => slot.release(),
            None => warn!("release_site: missing site {site:?}"),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_order(&mut self, id: BondId, order: BondOrder) {
        if let Some(bond) = self.graph.edge_weight_mut(id) {
            bond.set_order(order);
        }
    }
}
