//! Site and transition-state thermodynamics.
//!
//! Energies are reduced (`E / kT`). Site values are given per Wyckoff class
//! and transition-state values per jump-network class; [`ThermoParams::broadcast`]
//! spreads them over a supercell.

use latkmc_core::ConfigError;
use latkmc_lattice::{CanonicalTransitionTable, SiteFieldMapper, SupercellTransitionTable};

fn check_len(what: &'static str, v: &[f64], expected: usize) -> Result<(), ConfigError> {
    if v.len() != expected {
        return Err(ConfigError::LengthMismatch {
            what,
            expected,
            got: v.len(),
        });
    }
    Ok(())
}

fn check_prefactors(name: &'static str, v: &[f64]) -> Result<(), ConfigError> {
    if let Some(bad) = v.iter().find(|&&x| !(x.is_finite() && x > 0.0)) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("prefactors must be finite and positive, got {bad}"),
        });
    }
    Ok(())
}

fn check_energies(name: &'static str, v: &[f64]) -> Result<(), ConfigError> {
    if let Some(bad) = v.iter().find(|x| !x.is_finite()) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("energies must be finite, got {bad}"),
        });
    }
    Ok(())
}

/// Per-class thermodynamic parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermoParams {
    /// Site prefactor per Wyckoff class.
    pub pre: Vec<f64>,
    /// Site reduced energy per Wyckoff class.
    pub ene: Vec<f64>,
    /// Transition-state prefactor per jump-network class.
    pub pre_t: Vec<f64>,
    /// Transition-state reduced energy per jump-network class.
    pub ene_t: Vec<f64>,
}

impl ThermoParams {
    /// Unit prefactors and zero energies.
    pub fn uniform(site_classes: usize, jump_classes: usize) -> Self {
        Self {
            pre: vec![1.0; site_classes],
            ene: vec![0.0; site_classes],
            pre_t: vec![1.0; jump_classes],
            ene_t: vec![0.0; jump_classes],
        }
    }

    /// Check lengths and values against the class counts.
    pub fn validate(&self, site_classes: usize, jump_classes: usize) -> Result<(), ConfigError> {
        check_len("site prefactors", &self.pre, site_classes)?;
        check_len("site energies", &self.ene, site_classes)?;
        check_len("transition prefactors", &self.pre_t, jump_classes)?;
        check_len("transition energies", &self.ene_t, jump_classes)?;
        check_prefactors("pre", &self.pre)?;
        check_prefactors("pre_t", &self.pre_t)?;
        check_energies("ene", &self.ene)?;
        check_energies("ene_t", &self.ene_t)
    }

    /// Symmetrized rate of each jump-network class,
    /// `preT · exp(½E_w0 + ½E_w1 − ET) / √(pre_w0 · pre_w1)`, where
    /// `(w0, w1)` are the Wyckoff classes of the class's endpoints.
    ///
    /// These are the rates an analytic Green's-function solver consumes;
    /// they are unchanged by swapping the endpoints.
    pub fn symmetric_rates(&self, jump_pairs: &[(usize, usize)]) -> Result<Vec<f64>, ConfigError> {
        self.validate(self.pre.len(), jump_pairs.len())?;
        jump_pairs
            .iter()
            .zip(self.pre_t.iter().zip(&self.ene_t))
            .map(|(&(w0, w1), (&pt, &et))| {
                for w in [w0, w1] {
                    if w >= self.pre.len() {
                        return Err(ConfigError::SiteOutOfRange {
                            index: w,
                            len: self.pre.len(),
                        });
                    }
                }
                Ok(pt * (0.5 * self.ene[w0] + 0.5 * self.ene[w1] - et).exp()
                    / (self.pre[w0] * self.pre[w1]).sqrt())
            })
            .collect()
    }

    /// Largest symmetrized rate; the natural rate unit for comparisons.
    pub fn max_symmetric_rate(&self, jump_pairs: &[(usize, usize)]) -> Result<f64, ConfigError> {
        Ok(self
            .symmetric_rates(jump_pairs)?
            .into_iter()
            .fold(0.0, f64::max))
    }

    /// Spread the per-class values over every site and slot of `table`.
    ///
    /// `sites` maps unit-cell sites to Wyckoff classes; transition classes
    /// come from `canonical`'s energy-index provenance.
    pub fn broadcast(
        &self,
        sites: &SiteFieldMapper,
        canonical: &CanonicalTransitionTable,
        table: &SupercellTransitionTable,
    ) -> Result<SupercellThermo, ConfigError> {
        self.validate(sites.class_count(), canonical.class_count())?;
        let transitions = canonical.energy_mapper()?;
        Ok(SupercellThermo {
            pre: sites.broadcast(&self.pre, table.supercell())?,
            ene: sites.broadcast(&self.ene, table.supercell())?,
            pre_t: transitions.broadcast(&self.pre_t, table.slot_space())?,
            ene_t: transitions.broadcast(&self.ene_t, table.slot_space())?,
        })
    }
}

/// Thermodynamics resolved per supercell site and transition slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SupercellThermo {
    /// Prefactor per site.
    pub pre: Vec<f64>,
    /// Reduced energy per site.
    pub ene: Vec<f64>,
    /// Prefactor per transition slot.
    pub pre_t: Vec<f64>,
    /// Reduced energy per transition slot.
    pub ene_t: Vec<f64>,
}

impl SupercellThermo {
    /// Check the vectors against a supercell table.
    pub fn validate(&self, table: &SupercellTransitionTable) -> Result<(), ConfigError> {
        check_len("site prefactors", &self.pre, table.site_count())?;
        check_len("site energies", &self.ene, table.site_count())?;
        check_len("slot prefactors", &self.pre_t, table.slot_count())?;
        check_len("slot energies", &self.ene_t, table.slot_count())?;
        check_prefactors("pre", &self.pre)?;
        check_prefactors("pre_t", &self.pre_t)?;
        check_energies("ene", &self.ene)?;
        check_energies("ene_t", &self.ene_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latkmc_lattice::{JumpNetworkReducer, SupercellExpander};
    use latkmc_test_utils::{two_site_chain, two_site_chain_jumps};

    #[test]
    fn broadcast_follows_classes_and_provenance() {
        let crys = two_site_chain();
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        let table = SupercellExpander::new([2, 1, 1]).expand(&canonical).unwrap();
        let sites = SiteFieldMapper::new(&[vec![0], vec![1]], 2).unwrap();
        let params = ThermoParams {
            pre: vec![1.0, 2.0],
            ene: vec![0.0, 0.5],
            pre_t: vec![3.0, 4.0, 5.0],
            ene_t: vec![1.0, 1.5, 2.0],
        };
        let thermo = params.broadcast(&sites, &canonical, &table).unwrap();
        assert_eq!(thermo.pre, vec![1.0, 2.0, 1.0, 2.0]);
        assert_eq!(thermo.ene, vec![0.0, 0.5, 0.0, 0.5]);
        // Energy indices per cell: [0, 0, 1, 1, 2, 2] by provenance.
        assert_eq!(thermo.pre_t.len(), 12);
        assert_eq!(&thermo.pre_t[..6], &[3.0, 3.0, 4.0, 4.0, 5.0, 5.0]);
        assert!(thermo.validate(&table).is_ok());
    }

    #[test]
    fn symmetric_rate_is_endpoint_symmetric() {
        let params = ThermoParams {
            pre: vec![2.0, 0.5],
            ene: vec![0.3, -0.7],
            pre_t: vec![1.5],
            ene_t: vec![1.2],
        };
        let forward = params.symmetric_rates(&[(0, 1)]).unwrap();
        let backward = params.symmetric_rates(&[(1, 0)]).unwrap();
        assert!((forward[0] - backward[0]).abs() < 1e-15);
        let expected = 1.5 * (0.5 * 0.3 - 0.5 * 0.7 - 1.2f64).exp() / 1.0;
        assert!((forward[0] - expected).abs() < 1e-14);
        assert_eq!(params.max_symmetric_rate(&[(0, 1)]).unwrap(), forward[0]);
    }

    #[test]
    fn negative_prefactor_is_rejected() {
        let mut params = ThermoParams::uniform(1, 1);
        params.pre_t[0] = -1.0;
        assert!(matches!(
            params.validate(1, 1),
            Err(ConfigError::InvalidParameter { name: "pre_t", .. })
        ));
    }

    #[test]
    fn wrong_class_count_is_rejected() {
        let params = ThermoParams::uniform(2, 1);
        assert!(matches!(
            params.validate(1, 1),
            Err(ConfigError::LengthMismatch { .. })
        ));
    }
}
