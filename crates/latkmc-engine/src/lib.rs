//! Rate tables and trajectory simulation for latkmc.
//!
//! Takes a [`SupercellTransitionTable`](latkmc_lattice::SupercellTransitionTable)
//! to a diffusivity estimate:
//!
//! 1. [`ThermoParams::broadcast`] spreads per-class prefactors and energies
//!    over the supercell ([`SupercellThermo`]).
//! 2. Optionally, [`SoluteEnergyInjector`] adds a solute's interaction
//!    energies ([`EnergyCorrections::apply`]).
//! 3. [`RateMatrixBuilder`] builds normalized [`KmcTables`] and the
//!    detailed-balance bias.
//! 4. [`TrajectorySimulator`] runs seeded trajectories on a worker pool and
//!    reduces them to a [`DiffusivityEstimate`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod estimate;
pub mod injector;
pub mod metrics;
pub mod rates;
pub mod simulator;
pub mod thermo;

pub use config::SimulationConfig;
pub use estimate::{trajectory_tensor, DiffusivityEstimate, TensorAccumulator};
pub use injector::{EnergyCorrections, SoluteEnergyInjector, SplitMatrix};
pub use metrics::RunMetrics;
pub use rates::{KmcTables, RateMatrixBuilder};
pub use simulator::{SimulationResult, Trajectory, TrajectorySimulator};
pub use thermo::{SupercellThermo, ThermoParams};
