//! Core types and traits for the latkmc kinetic Monte Carlo workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other crate: vector and tensor aliases, the
//! error taxonomy, the read-only crystal collaborator trait, and the raw
//! jump-network input types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod crystal;
pub mod error;
pub mod jump;

pub use crystal::{CrystalData, CrystalLattice, GroupOp};
pub use error::{ConfigError, DomainError, KmcError};
pub use jump::{Jump, JumpNetwork};

/// Cartesian (or fractional) position / displacement vector.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Integer lattice translation, in units of the unit-cell lattice vectors.
pub type Cell = nalgebra::Vector3<i32>;

/// Rank-2 cartesian tensor (diffusivity, lattice matrix).
pub type Tensor3 = nalgebra::Matrix3<f64>;
