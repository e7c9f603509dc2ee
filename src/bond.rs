use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Weight this bond contributes toward each endpoint's valence capacity.
    pub fn cost(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    /// Next order in the caller's cycling gesture:
    /// Single → Double → Triple → Single.
    pub fn successor(self) -> BondOrder {
        match self {
            BondOrder::Single => BondOrder::Double,
            BondOrder::Double => BondOrder::Triple,
            BondOrder::Triple => BondOrder::Single,
        }
    }
}

/// Edge weight of the molecule graph.
///
/// `sites` holds the bond-site index consumed on each endpoint, aligned
/// with the edge's endpoint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    order: BondOrder,
    sites: [usize; 2],
}

impl Bond {
    pub(crate) fn new(order: BondOrder, sites: [usize; 2]) -> Self {
        Self { order, sites }
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub(crate) fn set_order(&mut self, order: BondOrder) {
        self.order = order;
    }

    pub fn sites(&self) -> [usize; 2] {
        self.sites
    }
}
