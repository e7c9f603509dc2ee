pub mod atom;
pub mod bond;
pub mod components;
pub mod definition;
pub mod element;
pub mod geometry;
pub mod graph;
pub mod refine;
pub mod validate;

pub use atom::{Atom, BondSite, SiteRef};
pub use bond::{Bond, BondOrder};
pub use components::{all_connected, connected_components};
pub use definition::{
    DefinitionError, MoleculeDefinition, ReferenceBond, ReferenceGraph,
};
pub use element::{Element, ELEMENTS};
pub use geometry::SiteGeometry;
pub use graph::{AtomId, BondError, BondId, MolGraph};
pub use refine::{refinement_match, ColorView};
pub use validate::{validate, ValidationError, ValidationResult};
