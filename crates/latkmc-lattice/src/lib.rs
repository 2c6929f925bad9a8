//! Lattice bookkeeping for latkmc.
//!
//! Everything here is built once per configuration and then read-only:
//!
//! - [`Supercell`] / [`periodic_index`]: flat indexing of a periodic tiling.
//! - [`SiteFieldMapper`]: per-class scalars broadcast onto every replica.
//! - [`JumpNetworkReducer`]: symmetry-grouped jumps to a
//!   [`CanonicalTransitionTable`] with one energy index per physical bond.
//! - [`SupercellExpander`]: the canonical table tiled into a
//!   [`SupercellTransitionTable`] with consistent energy slots.
//! - [`SoluteNeighborFinder`]: symmetry-grouped neighbor shells of a solute.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod jump_network;
pub mod periodic;
pub mod site_field;
pub mod solute;
pub mod supercell;

pub use jump_network::{CanonicalTransition, CanonicalTransitionTable, JumpNetworkReducer};
pub use periodic::{periodic_index, Supercell};
pub use site_field::SiteFieldMapper;
pub use solute::{SoluteNeighbor, SoluteNeighborFinder, SoluteNeighborList};
pub use supercell::{SupercellExpander, SupercellTransition, SupercellTransitionTable};
