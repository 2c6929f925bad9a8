//! Solute interaction energies as site and transition-state corrections.
//!
//! Each neighbor occurrence of the solute shifts its site energy by the
//! interaction energy `DE` of its class, and shifts the transition state of
//! every bond leaving that site by `DE · x[type(site)][type(dest)]`, where
//! `x` is the split matrix and types are site classes (linear interpolation
//! of the migration barrier).

use crate::thermo::SupercellThermo;
use latkmc_core::{Cell, ConfigError};
use latkmc_lattice::{SiteFieldMapper, SoluteNeighborList, SupercellTransitionTable};

const SPLIT_TOLERANCE: f64 = 1e-12;

/// Square matrix `x` with `x[i][j] + x[j][i] = 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitMatrix {
    values: Vec<Vec<f64>>,
}

impl SplitMatrix {
    /// Every entry `1/2`.
    pub fn uniform(n: usize) -> Self {
        Self {
            values: vec![vec![0.5; n]; n],
        }
    }

    /// Validate and wrap `values`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LengthMismatch`] for a ragged or non-square matrix;
    /// [`ConfigError::InvalidSplitMatrix`] if a pair is not complementary
    /// (the diagonal must therefore be `1/2`).
    pub fn new(values: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let n = values.len();
        if let Some(row) = values.iter().find(|row| row.len() != n) {
            return Err(ConfigError::LengthMismatch {
                what: "split matrix row",
                expected: n,
                got: row.len(),
            });
        }
        for i in 0..n {
            for j in i..n {
                let sum = values[i][j] + values[j][i];
                if !sum.is_finite() || (sum - 1.0).abs() > SPLIT_TOLERANCE {
                    return Err(ConfigError::InvalidSplitMatrix { i, j, sum });
                }
            }
        }
        Ok(Self { values })
    }

    /// Entry `x[i][j]`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Number of site classes covered.
    pub fn size(&self) -> usize {
        self.values.len()
    }
}

/// Additive corrections to supercell site and slot energies.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyCorrections {
    /// Per supercell site.
    pub site: Vec<f64>,
    /// Per transition slot.
    pub transition: Vec<f64>,
}

impl EnergyCorrections {
    /// All-zero corrections.
    pub fn zeros(sites: usize, slots: usize) -> Self {
        Self {
            site: vec![0.0; sites],
            transition: vec![0.0; slots],
        }
    }

    /// `thermo` with the corrections added to its energies.
    pub fn apply(&self, thermo: &SupercellThermo) -> Result<SupercellThermo, ConfigError> {
        if self.site.len() != thermo.ene.len() {
            return Err(ConfigError::LengthMismatch {
                what: "site corrections",
                expected: thermo.ene.len(),
                got: self.site.len(),
            });
        }
        if self.transition.len() != thermo.ene_t.len() {
            return Err(ConfigError::LengthMismatch {
                what: "transition corrections",
                expected: thermo.ene_t.len(),
                got: self.transition.len(),
            });
        }
        let add = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter().zip(b).map(|(x, y)| x + y).collect()
        };
        Ok(SupercellThermo {
            pre: thermo.pre.clone(),
            ene: add(&thermo.ene, &self.site),
            pre_t: thermo.pre_t.clone(),
            ene_t: add(&thermo.ene_t, &self.transition),
        })
    }
}

/// Places a solute in a supercell and turns its neighbor energies into
/// [`EnergyCorrections`].
#[derive(Clone, Debug)]
pub struct SoluteEnergyInjector<'a> {
    table: &'a SupercellTransitionTable,
    sites: &'a SiteFieldMapper,
    split: SplitMatrix,
    origin: Cell,
}

impl<'a> SoluteEnergyInjector<'a> {
    /// Injector with the solute in cell `(0, 0, 0)` and a uniform split.
    ///
    /// `sites` assigns each unit-cell site its type for split lookups.
    pub fn new(table: &'a SupercellTransitionTable, sites: &'a SiteFieldMapper) -> Self {
        Self {
            table,
            sites,
            split: SplitMatrix::uniform(sites.class_count()),
            origin: Cell::zeros(),
        }
    }

    /// Use `split` instead of the uniform one.
    pub fn with_split(mut self, split: SplitMatrix) -> Result<Self, ConfigError> {
        if split.size() != self.sites.class_count() {
            return Err(ConfigError::LengthMismatch {
                what: "split matrix",
                expected: self.sites.class_count(),
                got: split.size(),
            });
        }
        self.split = split;
        Ok(self)
    }

    /// Put the solute in cell `origin`.
    pub fn at_cell(mut self, origin: Cell) -> Self {
        self.origin = origin;
        self
    }

    /// Corrections for `neighbors`, with `energies[c]` the interaction
    /// energy of class `c`. An empty neighbor list gives zero corrections.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LengthMismatch`] if `energies` does not have one entry
    /// per class or the site mapper does not match the table;
    /// [`ConfigError::SiteOutOfRange`] if a neighbor names an unknown site.
    pub fn corrections(
        &self,
        neighbors: &SoluteNeighborList,
        energies: &[f64],
    ) -> Result<EnergyCorrections, ConfigError> {
        if energies.len() != neighbors.class_count() {
            return Err(ConfigError::LengthMismatch {
                what: "interaction energies",
                expected: neighbors.class_count(),
                got: energies.len(),
            });
        }
        let sc = self.table.supercell();
        if self.sites.sites() != sc.sites_per_cell() {
            return Err(ConfigError::LengthMismatch {
                what: "site classes",
                expected: sc.sites_per_cell(),
                got: self.sites.sites(),
            });
        }

        let mut out = EnergyCorrections::zeros(self.table.site_count(), self.table.slot_count());
        for (class, n) in neighbors.iter() {
            if n.site >= sc.sites_per_cell() {
                return Err(ConfigError::SiteOutOfRange {
                    index: n.site,
                    len: sc.sites_per_cell(),
                });
            }
            let de = energies[class];
            let s = sc.index(&(self.origin + n.cell), n.site);
            out.site[s] += de;
            let from = self.sites.class_of(n.site);
            for tr in self.table.transitions(s) {
                let (_, dest_site) = sc.decompose(tr.dest);
                out.transition[tr.slot] += de * self.split.get(from, self.sites.class_of(dest_site));
            }
        }

        tracing::debug!(
            neighbors = neighbors.len(),
            classes = neighbors.class_count(),
            origin = ?self.origin.as_slice(),
            "solute corrections"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateMatrixBuilder;
    use crate::thermo::ThermoParams;
    use latkmc_lattice::{
        CanonicalTransitionTable, JumpNetworkReducer, SoluteNeighbor, SoluteNeighborFinder,
        SupercellExpander,
    };
    use latkmc_test_utils::{two_site_chain, two_site_chain_jumps};
    use proptest::prelude::*;

    fn chain(dims: [usize; 3]) -> (CanonicalTransitionTable, SupercellTransitionTable, SiteFieldMapper) {
        let crys = two_site_chain();
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        let table = SupercellExpander::new(dims).expand(&canonical).unwrap();
        let sites = SiteFieldMapper::new(&[vec![0], vec![1]], 2).unwrap();
        (canonical, table, sites)
    }

    fn one_neighbor() -> SoluteNeighborList {
        SoluteNeighborList::new(vec![vec![SoluteNeighbor {
            site: 0,
            cell: Cell::new(1, 0, 0),
        }]])
    }

    #[test]
    fn split_must_be_complementary() {
        assert!(SplitMatrix::new(vec![vec![0.5, 0.8], vec![0.2, 0.5]]).is_ok());
        assert!(matches!(
            SplitMatrix::new(vec![vec![0.5, 0.8], vec![0.3, 0.5]]),
            Err(ConfigError::InvalidSplitMatrix { i: 0, j: 1, .. })
        ));
        assert!(matches!(
            SplitMatrix::new(vec![vec![0.4]]),
            Err(ConfigError::InvalidSplitMatrix { i: 0, j: 0, .. })
        ));
        assert!(matches!(
            SplitMatrix::new(vec![vec![0.5, 0.5]]),
            Err(ConfigError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn uniform_split_puts_half_on_each_outgoing_bond() {
        let (_, table, sites) = chain([3, 1, 1]);
        let out = SoluteEnergyInjector::new(&table, &sites)
            .corrections(&one_neighbor(), &[0.3])
            .unwrap();
        let s = table.supercell().index(&Cell::new(1, 0, 0), 0);
        assert_eq!(out.site[s], 0.3);
        assert_eq!(out.site.iter().filter(|&&e| e != 0.0).count(), 1);
        let total: f64 = out.transition.iter().sum();
        assert!((total - 6.0 * 0.15).abs() < 1e-12);
        for (slot, &e) in out.transition.iter().enumerate() {
            if e != 0.0 {
                assert!(table.slots(s).contains(&slot));
            }
        }
    }

    #[test]
    fn split_weights_follow_destination_type() {
        let (_, table, sites) = chain([3, 1, 1]);
        let split = SplitMatrix::new(vec![vec![0.5, 0.8], vec![0.2, 0.5]]).unwrap();
        let out = SoluteEnergyInjector::new(&table, &sites)
            .with_split(split)
            .unwrap()
            .corrections(&one_neighbor(), &[0.3])
            .unwrap();
        // Two A -> B bonds at 0.8, four A -> A bonds at 0.5.
        let total: f64 = out.transition.iter().sum();
        assert!((total - 0.3 * (2.0 * 0.8 + 4.0 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn origin_shifts_the_neighbor() {
        let (_, table, sites) = chain([3, 1, 1]);
        let out = SoluteEnergyInjector::new(&table, &sites)
            .at_cell(Cell::new(1, 0, 0))
            .corrections(&one_neighbor(), &[1.0])
            .unwrap();
        assert_eq!(out.site[table.supercell().index(&Cell::new(2, 0, 0), 0)], 1.0);
    }

    #[test]
    fn empty_neighbor_list_gives_zero_corrections() {
        let (_, table, sites) = chain([2, 1, 1]);
        let out = SoluteEnergyInjector::new(&table, &sites)
            .corrections(&SoluteNeighborList::default(), &[])
            .unwrap();
        assert_eq!(out, EnergyCorrections::zeros(table.site_count(), table.slot_count()));
    }

    #[test]
    fn energy_count_must_match_classes() {
        let (_, table, sites) = chain([2, 1, 1]);
        assert!(matches!(
            SoluteEnergyInjector::new(&table, &sites).corrections(&one_neighbor(), &[1.0, 2.0]),
            Err(ConfigError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn apply_adds_to_energies_only() {
        let (canonical, table, sites) = chain([2, 1, 1]);
        let thermo = ThermoParams::uniform(2, 3)
            .broadcast(&sites, &canonical, &table)
            .unwrap();
        let out = SoluteEnergyInjector::new(&table, &sites)
            .corrections(&one_neighbor(), &[0.5])
            .unwrap();
        let perturbed = out.apply(&thermo).unwrap();
        assert_eq!(perturbed.pre, thermo.pre);
        assert_eq!(perturbed.pre_t, thermo.pre_t);
        assert_eq!(perturbed.ene.iter().sum::<f64>(), 0.5);
    }

    proptest! {
        #[test]
        fn corrections_keep_detailed_balance(
            energies in prop::collection::vec(-1.0f64..1.0, 3),
            x01 in 0.0f64..1.0,
            n0 in 1usize..4,
        ) {
            let (canonical, table, sites) = chain([n0, 2, 1]);
            let crys = two_site_chain();
            let shell = SoluteNeighborFinder::new(&crys, 0, 0, 0, 1.01).find().unwrap();
            prop_assert_eq!(shell.class_count(), 3);
            let split = SplitMatrix::new(vec![vec![0.5, x01], vec![1.0 - x01, 0.5]]).unwrap();
            let out = SoluteEnergyInjector::new(&table, &sites)
                .with_split(split)
                .unwrap()
                .corrections(&shell, &energies)
                .unwrap();
            let params = ThermoParams {
                pre: vec![1.0, 1.5],
                ene: vec![0.0, 0.3],
                pre_t: vec![1.0, 2.0, 0.5],
                ene_t: vec![1.0, 0.8, 1.1],
            };
            let thermo = out.apply(&params.broadcast(&sites, &canonical, &table).unwrap()).unwrap();
            let tables = RateMatrixBuilder::new(&table).build(&thermo).unwrap();
            prop_assert!(tables.is_balanced(1e-8));
        }
    }
}
