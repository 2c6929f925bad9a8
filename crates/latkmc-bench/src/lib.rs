//! Benchmark profiles for latkmc.
//!
//! - [`fcc_profile`]: primitive FCC, one site, twelve nearest-neighbor jumps.
//! - [`chain_profile`]: the two-site tetragonal chain with unequal sites.
//!
//! Each profile holds everything up to (but not including) the KMC tables,
//! so benches can time expansion, table building and trajectories apart.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use latkmc_core::{CrystalLattice, KmcError};
use latkmc_engine::{KmcTables, RateMatrixBuilder, SupercellThermo, ThermoParams};
use latkmc_lattice::{
    CanonicalTransitionTable, JumpNetworkReducer, SiteFieldMapper, SupercellExpander,
    SupercellTransitionTable,
};
use latkmc_test_utils::{fcc, fcc_jumps, two_site_chain, two_site_chain_jumps};

/// A reduced jump network tiled over a supercell, with thermodynamics.
pub struct Profile {
    /// Canonical unit-cell table.
    pub canonical: CanonicalTransitionTable,
    /// The supercell table.
    pub table: SupercellTransitionTable,
    /// Site classes.
    pub sites: SiteFieldMapper,
    /// Broadcast thermodynamics.
    pub thermo: SupercellThermo,
}

impl Profile {
    /// Build the KMC tables.
    pub fn tables(&self) -> Result<KmcTables, KmcError> {
        RateMatrixBuilder::new(&self.table).build(&self.thermo)
    }
}

fn build<C: CrystalLattice>(
    crys: &C,
    canonical: CanonicalTransitionTable,
    params: &ThermoParams,
    n: usize,
) -> Result<Profile, KmcError> {
    let sites = SiteFieldMapper::new(crys.wyckoff(0), crys.basis(0).len())?;
    let table = SupercellExpander::new([n, n, n]).expand(&canonical)?;
    let thermo = params.broadcast(&sites, &canonical, &table)?;
    Ok(Profile {
        canonical,
        table,
        sites,
        thermo,
    })
}

/// FCC in an `n × n × n` supercell with uniform thermodynamics.
pub fn fcc_profile(n: usize) -> Result<Profile, KmcError> {
    let crys = fcc(1.0);
    let canonical = JumpNetworkReducer::new(&crys, 0).reduce(&fcc_jumps(1.0))?;
    build(&crys, canonical, &ThermoParams::uniform(1, 1), n)
}

/// Two-site chain in an `n × n × n` supercell, site B `0.5 kT` above A.
pub fn chain_profile(n: usize) -> Result<Profile, KmcError> {
    let crys = two_site_chain();
    let canonical = JumpNetworkReducer::new(&crys, 0).reduce(&two_site_chain_jumps())?;
    let params = ThermoParams {
        pre: vec![1.0, 1.0],
        ene: vec![0.0, 0.5],
        pre_t: vec![1.0, 1.0, 1.0],
        ene_t: vec![1.0, 1.5, 1.5],
    };
    build(&crys, canonical, &params, n)
}
