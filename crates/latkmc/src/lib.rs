//! latkmc: kinetic Monte Carlo estimation of lattice diffusivity tensors.
//!
//! This is the facade crate that re-exports the public API of the latkmc
//! sub-crates and adds [`pipeline::DiffusionModel`], which runs the whole
//! data flow in a few calls.
//!
//! # Quick start
//!
//! ```rust
//! use latkmc::prelude::*;
//! use latkmc_test_utils::{simple_cubic, simple_cubic_jumps};
//!
//! let crys = simple_cubic(1.0);
//! let model = DiffusionModel::new(&crys, 0, &simple_cubic_jumps(1.0), [2, 2, 2]).unwrap();
//! let params = ThermoParams::uniform(1, 1);
//! let config = SimulationConfig {
//!     trajectories: 100,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let result = model.estimate(&params, None, config).unwrap();
//! assert_eq!(result.estimate.trajectories, 100);
//! assert_eq!(result.estimate.d, result.estimate.d.transpose());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `latkmc-core` | Math aliases, errors, crystal trait, jump networks |
//! | [`lattice`] | `latkmc-lattice` | Periodic indexing, reduction, expansion, solute shells |
//! | [`engine`] | `latkmc-engine` | Thermodynamics, rate tables, simulation, injection |
//! | [`pipeline`] | (this crate) | [`DiffusionModel`](pipeline::DiffusionModel) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors and the crystal collaborator trait (`latkmc-core`).
pub use latkmc_core as types;

/// Lattice bookkeeping (`latkmc-lattice`).
///
/// [`lattice::JumpNetworkReducer`] and [`lattice::SupercellExpander`] build
/// the transition tables; [`lattice::SoluteNeighborFinder`] the solute
/// shells.
pub use latkmc_lattice as lattice;

/// Rate tables and trajectory simulation (`latkmc-engine`).
pub use latkmc_engine as engine;

pub mod pipeline;

/// Common imports for typical latkmc usage.
pub mod prelude {
    // Core
    pub use latkmc_core::{
        Cell, ConfigError, CrystalData, CrystalLattice, DomainError, GroupOp, Jump, JumpNetwork,
        KmcError, Tensor3, Vec3,
    };

    // Lattice
    pub use latkmc_lattice::{
        JumpNetworkReducer, SiteFieldMapper, SoluteNeighborFinder, SupercellExpander,
    };

    // Engine
    pub use latkmc_engine::{
        DiffusivityEstimate, KmcTables, RateMatrixBuilder, RunMetrics, SimulationConfig,
        SimulationResult, SoluteEnergyInjector, SplitMatrix, ThermoParams, TrajectorySimulator,
    };

    // Pipeline
    pub use crate::pipeline::{DiffusionModel, Solute};
}
