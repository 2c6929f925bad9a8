//! Crystal and jump-network fixtures for latkmc development.
//!
//! Three small crystals with hand-built symmetry tables, standing in for
//! the external symmetry tool:
//!
//! - [`simple_cubic`]: one site, full cubic point group.
//! - [`fcc`]: primitive face-centred cubic, one site, full cubic point group.
//! - [`two_site_chain`]: cubic cell with sites at `0` and `x/2`, two
//!   Wyckoff classes, tetragonal point group.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::*;
