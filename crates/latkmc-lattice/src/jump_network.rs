//! Reduction of a symmetry-grouped jump network to a per-site transition
//! table.
//!
//! Each directed jump `i -> j` with cartesian displacement `dx` is
//! decomposed into an integer cell delta
//! `du = L⁻¹·dx − (u_j − u_i)`; a jump whose `du` is not integral within
//! tolerance is a configuration error. Both directions of one physical bond
//! (`i -> j, du` and `j -> i, −du`) share a single transition-energy index,
//! and each index remembers the jump-network class it came from.

use crate::site_field::SiteFieldMapper;
use indexmap::IndexMap;
use latkmc_core::{Cell, ConfigError, CrystalLattice, JumpNetwork, Vec3};
use smallvec::SmallVec;

/// Default tolerance on the integrality of a cell delta.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// One outgoing transition of a unit-cell site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanonicalTransition {
    /// Destination basis site.
    pub dest: usize,
    /// Cell of the destination relative to the origin's cell.
    pub du: Cell,
    /// Cartesian displacement.
    pub dx: Vec3,
    /// Shared transition-energy index of this bond.
    pub energy: usize,
}

/// Canonical per-site transition table plus energy-index provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalTransitionTable {
    sites: Vec<SmallVec<[CanonicalTransition; 8]>>,
    provenance: Vec<usize>,
    jump_pairs: Vec<(usize, usize)>,
}

impl CanonicalTransitionTable {
    /// Number of unit-cell sites.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Outgoing transitions of unit-cell site `site`.
    pub fn transitions(&self, site: usize) -> &[CanonicalTransition] {
        &self.sites[site]
    }

    /// Iterate `(site, transition)` over the whole table.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CanonicalTransition)> {
        self.sites
            .iter()
            .enumerate()
            .flat_map(|(i, ts)| ts.iter().map(move |t| (i, t)))
    }

    /// Number of distinct transition-energy indices.
    pub fn energy_count(&self) -> usize {
        self.provenance.len()
    }

    /// Jump-network class that created each transition-energy index.
    pub fn provenance(&self) -> &[usize] {
        &self.provenance
    }

    /// Number of jump-network classes.
    pub fn class_count(&self) -> usize {
        self.jump_pairs.len()
    }

    /// Wyckoff classes `(origin, dest)` of each jump-network class, taken
    /// from its first jump.
    pub fn jump_pairs(&self) -> &[(usize, usize)] {
        &self.jump_pairs
    }

    /// Largest number of outgoing transitions of any site.
    pub fn max_transitions(&self) -> usize {
        self.sites.iter().map(|ts| ts.len()).max().unwrap_or(0)
    }

    /// Mapper from transition-energy index to jump-network class, for
    /// broadcasting per-class transition-state values.
    pub fn energy_mapper(&self) -> Result<SiteFieldMapper, ConfigError> {
        SiteFieldMapper::from_assignment(self.provenance.clone(), self.class_count())
    }
}

/// Reduces a [`JumpNetwork`] for one chemistry of a crystal.
///
/// ```
/// use latkmc_lattice::JumpNetworkReducer;
/// use latkmc_test_utils::{simple_cubic, simple_cubic_jumps};
///
/// let crys = simple_cubic(1.0);
/// let table = JumpNetworkReducer::new(&crys, 0)
///     .reduce(&simple_cubic_jumps(1.0))
///     .unwrap();
/// assert_eq!(table.transitions(0).len(), 6);
/// // +x/-x, +y/-y, +z/-z pair up.
/// assert_eq!(table.energy_count(), 3);
/// ```
pub struct JumpNetworkReducer<'a, C: CrystalLattice + ?Sized> {
    crystal: &'a C,
    chem: usize,
    tolerance: f64,
}

impl<'a, C: CrystalLattice + ?Sized> JumpNetworkReducer<'a, C> {
    /// Reducer for chemistry `chem` of `crystal`.
    pub fn new(crystal: &'a C, chem: usize) -> Self {
        Self {
            crystal,
            chem,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Override the integrality tolerance (default [`DEFAULT_TOLERANCE`]).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Build the canonical table.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SiteOutOfRange`] for an unknown chemistry or site.
    /// - [`ConfigError::NonIntegerDisplacement`] if a jump is not a lattice
    ///   translation between its endpoints.
    /// - [`ConfigError::InvalidParameter`] for a bad tolerance or an empty
    ///   jump class.
    /// - [`ConfigError::UnclassifiedSite`] if the Wyckoff partition misses
    ///   a site.
    pub fn reduce(&self, network: &JumpNetwork) -> Result<CanonicalTransitionTable, ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be finite and >= 0, got {}", self.tolerance),
            });
        }
        let nchem = self.crystal.chemistry_count();
        if self.chem >= nchem {
            return Err(ConfigError::SiteOutOfRange {
                index: self.chem,
                len: nchem,
            });
        }
        let basis = self.crystal.basis(self.chem);
        let nsites = basis.len();
        let wyckoff = SiteFieldMapper::new(self.crystal.wyckoff(self.chem), nsites)?;
        let inverse = self.crystal.inverse_lattice();

        let mut sites: Vec<SmallVec<[CanonicalTransition; 8]>> = vec![SmallVec::new(); nsites];
        let mut provenance = Vec::new();
        let mut jump_pairs = Vec::with_capacity(network.len());
        // (origin, dest, du) -> energy index, for reverse-bond lookup.
        let mut known: IndexMap<(usize, usize, [i32; 3]), usize> = IndexMap::new();

        for (class, jumps) in network.classes().iter().enumerate() {
            let first = jumps.first().ok_or_else(|| ConfigError::InvalidParameter {
                name: "jump_network",
                reason: format!("class {class} is empty"),
            })?;
            for site in [first.origin, first.dest] {
                if site >= nsites {
                    return Err(ConfigError::SiteOutOfRange {
                        index: site,
                        len: nsites,
                    });
                }
            }
            jump_pairs.push((wyckoff.class_of(first.origin), wyckoff.class_of(first.dest)));

            for jump in jumps {
                let (i, j) = (jump.origin, jump.dest);
                if i >= nsites || j >= nsites {
                    return Err(ConfigError::SiteOutOfRange {
                        index: i.max(j),
                        len: nsites,
                    });
                }
                let frac = inverse * jump.dx - (basis[j] - basis[i]);
                let rounded = frac.map(f64::round);
                let residual = (frac - rounded).amax();
                if residual > self.tolerance {
                    return Err(ConfigError::NonIntegerDisplacement {
                        class,
                        origin: i,
                        dest: j,
                        residual,
                    });
                }
                let du = rounded.map(|x| x as i32);
                let key = (i, j, [du[0], du[1], du[2]]);
                let reverse = (j, i, [-du[0], -du[1], -du[2]]);
                let energy = match known.get(&reverse) {
                    Some(&e) => e,
                    None => {
                        provenance.push(class);
                        provenance.len() - 1
                    }
                };
                known.entry(key).or_insert(energy);
                sites[i].push(CanonicalTransition {
                    dest: j,
                    du,
                    dx: jump.dx,
                    energy,
                });
            }
        }

        tracing::debug!(
            chem = self.chem,
            sites = nsites,
            classes = network.len(),
            energies = provenance.len(),
            "reduced jump network"
        );

        Ok(CanonicalTransitionTable {
            sites,
            provenance,
            jump_pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latkmc_core::Jump;
    use latkmc_test_utils::{
        fcc, fcc_jumps, simple_cubic, simple_cubic_jumps, two_site_chain, two_site_chain_jumps,
    };
    use proptest::prelude::*;

    fn assert_reverse_shares_energy(table: &CanonicalTransitionTable) {
        for (i, t) in table.iter() {
            let back = table
                .transitions(t.dest)
                .iter()
                .find(|r| r.dest == i && r.du == -t.du)
                .expect("every bond has its reverse");
            assert_eq!(back.energy, t.energy);
        }
    }

    #[test]
    fn simple_cubic_pairs_opposite_jumps() {
        let crys = simple_cubic(2.0);
        let table = JumpNetworkReducer::new(&crys, 0)
            .reduce(&simple_cubic_jumps(2.0))
            .unwrap();
        assert_eq!(table.site_count(), 1);
        assert_eq!(table.energy_count(), 3);
        assert_eq!(table.provenance(), &[0, 0, 0]);
        assert_eq!(table.jump_pairs(), &[(0, 0)]);
        for t in table.transitions(0) {
            assert_eq!(t.du.map(f64::from) * 2.0, t.dx);
        }
        assert_reverse_shares_energy(&table);
    }

    #[test]
    fn basis_difference_is_removed_from_cell_delta() {
        let crys = two_site_chain();
        let table = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        let cells: Vec<Cell> = table
            .transitions(0)
            .iter()
            .filter(|t| t.dest == 1)
            .map(|t| t.du)
            .collect();
        assert_eq!(cells, vec![Cell::new(0, 0, 0), Cell::new(-1, 0, 0)]);
        assert_eq!(table.jump_pairs()[0], (0, 1));
        assert_reverse_shares_energy(&table);
    }

    #[test]
    fn new_energy_index_records_its_class() {
        let crys = two_site_chain();
        let table = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        // Class 0: two A<->B bonds; classes 1, 2: two bonds each.
        assert_eq!(table.provenance(), &[0, 0, 1, 1, 2, 2]);
        assert_eq!(table.max_transitions(), 6);
    }

    #[test]
    fn non_lattice_displacement_is_a_config_error() {
        let crys = simple_cubic(1.0);
        let net = JumpNetwork::new(vec![vec![Jump::new(0, 0, Vec3::new(0.5, 0.0, 0.0))]]);
        let err = JumpNetworkReducer::new(&crys, 0).reduce(&net).unwrap_err();
        assert!(matches!(err, ConfigError::NonIntegerDisplacement { class: 0, .. }));
    }

    #[test]
    fn tolerance_absorbs_rounding_noise() {
        let crys = simple_cubic(1.0);
        let net = JumpNetwork::new(vec![vec![
            Jump::new(0, 0, Vec3::new(1.0 + 1e-10, 0.0, 0.0)),
            Jump::new(0, 0, Vec3::new(-1.0, 0.0, 0.0)),
        ]]);
        let table = JumpNetworkReducer::new(&crys, 0).reduce(&net).unwrap();
        assert_eq!(table.energy_count(), 1);
        let err = JumpNetworkReducer::new(&crys, 0)
            .with_tolerance(1e-12)
            .reduce(&net)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonIntegerDisplacement { .. }));
    }

    #[test]
    fn unknown_site_is_rejected() {
        let crys = simple_cubic(1.0);
        let net = JumpNetwork::new(vec![vec![Jump::new(0, 3, Vec3::x())]]);
        let err = JumpNetworkReducer::new(&crys, 0).reduce(&net).unwrap_err();
        assert_eq!(err, ConfigError::SiteOutOfRange { index: 3, len: 1 });
    }

    #[test]
    fn empty_class_is_rejected() {
        let crys = simple_cubic(1.0);
        let net = JumpNetwork::new(vec![vec![]]);
        assert!(matches!(
            JumpNetworkReducer::new(&crys, 0).reduce(&net),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn fcc_has_six_bonds_per_site() {
        let crys = fcc(1.0);
        let table = JumpNetworkReducer::new(&crys, 0).reduce(&fcc_jumps(1.0)).unwrap();
        assert_eq!(table.transitions(0).len(), 12);
        assert_eq!(table.energy_count(), 6);
        assert_reverse_shares_energy(&table);
    }

    fn chain_jumps_shuffled() -> impl Strategy<Value = Vec<Jump>> {
        let jumps: Vec<Jump> = two_site_chain_jumps()
            .classes()
            .iter()
            .flatten()
            .copied()
            .collect();
        Just(jumps).prop_shuffle()
    }

    proptest! {
        #[test]
        fn reverse_bond_shares_energy_whatever_the_order(jumps in chain_jumps_shuffled()) {
            // Every jump in its own class, in any order.
            let crys = two_site_chain();
            let net = JumpNetwork::new(jumps.into_iter().map(|j| vec![j]).collect());
            let table = JumpNetworkReducer::new(&crys, 0).reduce(&net).unwrap();
            prop_assert_eq!(table.energy_count(), 6);
            for (i, t) in table.iter() {
                let back = table
                    .transitions(t.dest)
                    .iter()
                    .find(|r| r.dest == i && r.du == -t.du)
                    .unwrap();
                prop_assert_eq!(back.energy, t.energy);
            }
        }
    }
}
