//! Normalized KMC tables built from supercell thermodynamics.
//!
//! Rates take the detailed-balance form
//! `rate(i -> slot) = preT[slot] · exp(E[i] − ET[slot]) / pre[i]`,
//! so a bond and its reverse, which share one slot, satisfy
//! `p_i · rate(i -> j) = p_j · rate(j -> i)` with `p ∝ pre · exp(−E)`.

use crate::thermo::SupercellThermo;
use latkmc_core::{ConfigError, DomainError, KmcError, Vec3};
use latkmc_lattice::SupercellTransitionTable;
use std::ops::Range;

/// Index of the first entry of `cdf` strictly greater than `u`, clamped to
/// the last entry so `u` values at or above the final entry stay in range.
fn inverse_cdf(cdf: &[f64], u: f64) -> usize {
    cdf.partition_point(|&c| c <= u).min(cdf.len().saturating_sub(1))
}

/// Read-only tables driving trajectory simulation.
///
/// Transitions use the same compressed-row layout as
/// [`SupercellTransitionTable`]: site `s` owns `offsets[s]..offsets[s + 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct KmcTables {
    site_probabilities: Vec<f64>,
    site_cdf: Vec<f64>,
    escape_times: Vec<f64>,
    offsets: Vec<usize>,
    cdf: Vec<f64>,
    dest: Vec<usize>,
    dx: Vec<Vec3>,
    bias: Vec3,
}

impl KmcTables {
    /// Number of supercell sites.
    pub fn site_count(&self) -> usize {
        self.escape_times.len()
    }

    /// Equilibrium occupation probability of each site; sums to 1.
    pub fn site_probabilities(&self) -> &[f64] {
        &self.site_probabilities
    }

    /// Cumulative site-selection table; final entry is exactly 1.
    pub fn site_cdf(&self) -> &[f64] {
        &self.site_cdf
    }

    /// Mean residence time of each site (reciprocal total escape rate).
    pub fn escape_times(&self) -> &[f64] {
        &self.escape_times
    }

    fn range(&self, site: usize) -> Range<usize> {
        self.offsets[site]..self.offsets[site + 1]
    }

    /// Cumulative transition probabilities of `site`; final entry is
    /// exactly 1.
    pub fn transition_cdf(&self, site: usize) -> &[f64] {
        &self.cdf[self.range(site)]
    }

    /// Destination of every transition, flat.
    pub fn destinations(&self) -> &[usize] {
        &self.dest
    }

    /// Displacement of every transition, flat.
    pub fn displacements(&self) -> &[Vec3] {
        &self.dx
    }

    /// `Σ_i p_i Σ_(i->j) rate · dx`, the net equilibrium drift.
    ///
    /// Zero whenever the rates obey detailed balance.
    pub fn bias(&self) -> Vec3 {
        self.bias
    }

    /// Whether every component of [`bias`](Self::bias) is within `tol` of 0.
    pub fn is_balanced(&self, tol: f64) -> bool {
        self.bias.amax() <= tol
    }

    /// Site selected by uniform variate `u ∈ [0, 1)`.
    pub fn sample_site(&self, u: f64) -> usize {
        inverse_cdf(&self.site_cdf, u)
    }

    /// Flat index of the transition out of `site` selected by `u ∈ [0, 1)`.
    ///
    /// Index [`destinations`](Self::destinations) and
    /// [`displacements`](Self::displacements) with the result.
    pub fn sample_transition(&self, site: usize, u: f64) -> usize {
        let range = self.range(site);
        range.start + inverse_cdf(&self.cdf[range], u)
    }
}

/// Turns a supercell table plus thermodynamics into [`KmcTables`].
#[derive(Clone, Copy, Debug)]
pub struct RateMatrixBuilder<'a> {
    table: &'a SupercellTransitionTable,
}

impl<'a> RateMatrixBuilder<'a> {
    /// Builder over `table`.
    pub fn new(table: &'a SupercellTransitionTable) -> Self {
        Self { table }
    }

    /// Build the tables.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] if `thermo` does not match the table, or a site
    ///   has zero total escape rate.
    /// - [`DomainError::NonFinite`] if a rate or probability overflows.
    pub fn build(&self, thermo: &SupercellThermo) -> Result<KmcTables, KmcError> {
        let table = self.table;
        thermo.validate(table)?;
        let n = table.site_count();

        let min_e = thermo.ene.iter().copied().fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = thermo
            .pre
            .iter()
            .zip(&thermo.ene)
            .map(|(&p, &e)| p * (min_e - e).exp())
            .collect();
        let norm: f64 = weights.iter().sum();
        if !norm.is_finite() || norm <= 0.0 {
            return Err(DomainError::NonFinite {
                what: "site probability normalization",
            }
            .into());
        }
        let site_probabilities: Vec<f64> = weights.iter().map(|w| w / norm).collect();
        let mut site_cdf: Vec<f64> = site_probabilities
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect();
        if let Some(last) = site_cdf.last_mut() {
            *last = 1.0;
        }

        let mut escape_times = Vec::with_capacity(n);
        let mut cdf = Vec::with_capacity(table.transition_count());
        let mut dest = Vec::with_capacity(table.transition_count());
        let mut dx = Vec::with_capacity(table.transition_count());
        let mut bias = Vec3::zeros();

        for site in 0..n {
            let row_start = cdf.len();
            let mut total = 0.0;
            for tr in table.transitions(site) {
                let rate = thermo.pre_t[tr.slot] * (thermo.ene[site] - thermo.ene_t[tr.slot]).exp()
                    / thermo.pre[site];
                if !rate.is_finite() {
                    return Err(DomainError::NonFinite {
                        what: "transition rate",
                    }
                    .into());
                }
                total += rate;
                bias += tr.dx * (site_probabilities[site] * rate);
                cdf.push(total);
                dest.push(tr.dest);
                dx.push(tr.dx);
            }
            if total <= 0.0 {
                return Err(ConfigError::ZeroEscapeRate { site }.into());
            }
            if !total.is_finite() {
                return Err(DomainError::NonFinite {
                    what: "total escape rate",
                }
                .into());
            }
            let escape = total.recip();
            let row = &mut cdf[row_start..];
            for c in row.iter_mut() {
                *c *= escape;
            }
            if let Some(last) = row.last_mut() {
                *last = 1.0;
            }
            escape_times.push(escape);
        }

        tracing::debug!(
            sites = n,
            transitions = dest.len(),
            bias = ?bias.as_slice(),
            "built kmc tables"
        );

        Ok(KmcTables {
            site_probabilities,
            site_cdf,
            escape_times,
            offsets: table.offsets().to_vec(),
            cdf,
            dest,
            dx,
            bias,
        })
    }
}
