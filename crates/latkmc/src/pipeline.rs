//! One-call wiring of the whole data flow.
//!
//! [`DiffusionModel`] reduces a jump network and tiles it over a supercell
//! once; thermodynamics, solutes and simulation settings can then vary per
//! call. Every step it performs is also available on its own from the
//! sub-crates.

use latkmc_core::{Cell, ConfigError, CrystalLattice, JumpNetwork, KmcError};
use latkmc_engine::{
    KmcTables, RateMatrixBuilder, SimulationConfig, SimulationResult, SoluteEnergyInjector,
    SplitMatrix, SupercellThermo, ThermoParams, TrajectorySimulator,
};
use latkmc_lattice::{
    CanonicalTransitionTable, JumpNetworkReducer, SiteFieldMapper, SoluteNeighborFinder,
    SoluteNeighborList, SupercellExpander, SupercellTransitionTable,
};

/// A solute and its interaction energies with the diffusing species.
#[derive(Clone, Debug, PartialEq)]
pub struct Solute {
    /// Chemistry of the solute site.
    pub chem: usize,
    /// Basis site of the solute.
    pub site: usize,
    /// Cell of the solute within the supercell.
    pub cell: Cell,
    /// Neighbor cutoff distance.
    pub cutoff: f64,
    /// Interaction energy per neighbor class, in class discovery order.
    pub energies: Vec<f64>,
    /// Transition-state split; `None` = uniform `1/2`.
    pub split: Option<SplitMatrix>,
}

/// Reduced and expanded jump network for one diffusing chemistry.
#[derive(Debug)]
pub struct DiffusionModel<'a, C: CrystalLattice + ?Sized> {
    crystal: &'a C,
    chem: usize,
    canonical: CanonicalTransitionTable,
    sites: SiteFieldMapper,
    table: SupercellTransitionTable,
}

impl<'a, C: CrystalLattice + ?Sized> DiffusionModel<'a, C> {
    /// Reduce `jumps` of chemistry `chem` and tile them over `dims`.
    ///
    /// Site classes are the Wyckoff orbits of `chem`.
    pub fn new(
        crystal: &'a C,
        chem: usize,
        jumps: &JumpNetwork,
        dims: [usize; 3],
    ) -> Result<Self, ConfigError> {
        let canonical = JumpNetworkReducer::new(crystal, chem).reduce(jumps)?;
        let sites = SiteFieldMapper::new(crystal.wyckoff(chem), crystal.basis(chem).len())?;
        let table = SupercellExpander::new(dims).expand(&canonical)?;
        Ok(Self {
            crystal,
            chem,
            canonical,
            sites,
            table,
        })
    }

    /// The canonical unit-cell table.
    pub fn canonical(&self) -> &CanonicalTransitionTable {
        &self.canonical
    }

    /// The supercell table.
    pub fn table(&self) -> &SupercellTransitionTable {
        &self.table
    }

    /// Site classes.
    pub fn sites(&self) -> &SiteFieldMapper {
        &self.sites
    }

    /// Symmetrized per-class rates for comparison with an analytic solver.
    pub fn symmetric_rates(&self, params: &ThermoParams) -> Result<Vec<f64>, ConfigError> {
        params.validate(self.sites.class_count(), self.canonical.class_count())?;
        params.symmetric_rates(self.canonical.jump_pairs())
    }

    /// `params` broadcast over the supercell.
    pub fn thermo(&self, params: &ThermoParams) -> Result<SupercellThermo, ConfigError> {
        params.broadcast(&self.sites, &self.canonical, &self.table)
    }

    /// Neighbor shell of `solute` among sites of the diffusing chemistry.
    pub fn solute_neighbors(&self, solute: &Solute) -> Result<SoluteNeighborList, ConfigError> {
        SoluteNeighborFinder::new(self.crystal, solute.chem, solute.site, self.chem, solute.cutoff)
            .find()
    }

    /// `params` broadcast and perturbed by `solute`.
    pub fn solute_thermo(
        &self,
        params: &ThermoParams,
        solute: &Solute,
    ) -> Result<SupercellThermo, ConfigError> {
        let neighbors = self.solute_neighbors(solute)?;
        let mut injector = SoluteEnergyInjector::new(&self.table, &self.sites).at_cell(solute.cell);
        if let Some(split) = &solute.split {
            injector = injector.with_split(split.clone())?;
        }
        injector
            .corrections(&neighbors, &solute.energies)?
            .apply(&self.thermo(params)?)
    }

    /// KMC tables, with the solute perturbation if one is given.
    pub fn tables(
        &self,
        params: &ThermoParams,
        solute: Option<&Solute>,
    ) -> Result<KmcTables, KmcError> {
        let thermo = match solute {
            Some(solute) => self.solute_thermo(params, solute)?,
            None => self.thermo(params)?,
        };
        RateMatrixBuilder::new(&self.table).build(&thermo)
    }

    /// Build the tables and run the simulator.
    pub fn estimate(
        &self,
        params: &ThermoParams,
        solute: Option<&Solute>,
        config: SimulationConfig,
    ) -> Result<SimulationResult, KmcError> {
        let tables = self.tables(params, solute)?;
        if !tables.is_balanced(1e-8) {
            tracing::warn!(bias = ?tables.bias().as_slice(), "rate tables break detailed balance");
        }
        TrajectorySimulator::new(&tables, config)?.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latkmc_test_utils::{fcc, fcc_jumps, two_site_chain, two_site_chain_jumps};

    fn config(trajectories: usize) -> SimulationConfig {
        SimulationConfig {
            trajectories,
            seed: Some(21),
            ..Default::default()
        }
    }

    #[test]
    fn fcc_uniform_rates_match_analytic_diffusivity() {
        let crys = fcc(1.0);
        let model = DiffusionModel::new(&crys, 0, &fcc_jumps(1.0), [2, 2, 2]).unwrap();
        let params = ThermoParams::uniform(1, 1);
        assert_eq!(model.symmetric_rates(&params).unwrap(), vec![1.0]);
        // D_xx = 1/2 · Σ rate · dx_x² = 1/2 · 8 · 1/4 = 1.
        let est = model.estimate(&params, None, config(20_000)).unwrap().estimate;
        assert!((est.isotropic() - 1.0).abs() < 0.05, "D = {}", est.isotropic());
    }

    #[test]
    fn null_solute_matches_plain_tables() {
        let crys = two_site_chain();
        let model = DiffusionModel::new(&crys, 0, &two_site_chain_jumps(), [2, 2, 1]).unwrap();
        let params = ThermoParams::uniform(2, 3);
        let shell = model
            .solute_neighbors(&Solute {
                chem: 0,
                site: 0,
                cell: Cell::zeros(),
                cutoff: 1.01,
                energies: vec![],
                split: None,
            })
            .unwrap();
        let solute = Solute {
            chem: 0,
            site: 0,
            cell: Cell::new(1, 0, 0),
            cutoff: 1.01,
            energies: vec![0.0; shell.class_count()],
            split: None,
        };
        assert_eq!(
            model.tables(&params, Some(&solute)).unwrap(),
            model.tables(&params, None).unwrap()
        );
    }

    #[test]
    fn wrong_energy_count_fails_before_simulating() {
        let crys = two_site_chain();
        let model = DiffusionModel::new(&crys, 0, &two_site_chain_jumps(), [1, 1, 1]).unwrap();
        let solute = Solute {
            chem: 0,
            site: 0,
            cell: Cell::zeros(),
            cutoff: 1.01,
            energies: vec![0.1],
            split: None,
        };
        let err = model
            .estimate(&ThermoParams::uniform(2, 3), Some(&solute), config(10))
            .unwrap_err();
        assert!(matches!(err, KmcError::Config(ConfigError::LengthMismatch { .. })));
    }
}
