//! Replication of the canonical transition table over a periodic supercell.
//!
//! Transitions are stored in compressed-row form: the outgoing transitions
//! of supercell site `s` occupy `offsets[s]..offsets[s + 1]` of the flat
//! destination, displacement, and slot arrays. There is no padding.
//!
//! Transition-energy slots live in their own periodic space (same tiling,
//! one entry per canonical energy index). A bond from cell `t` with cell
//! delta `du` and energy index `e` gets slot
//! `min(slot(t, e), slot(t + du, e))`; the reverse bond, written from cell
//! `t + du` with delta `−du`, computes the same two candidates, so both
//! directions land on one slot whichever is visited first.

use crate::jump_network::CanonicalTransitionTable;
use crate::periodic::Supercell;
use latkmc_core::{ConfigError, Vec3};
use std::ops::Range;

/// One outgoing transition of a supercell site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupercellTransition {
    /// Destination supercell site.
    pub dest: usize,
    /// Cartesian displacement.
    pub dx: Vec3,
    /// Transition-energy slot.
    pub slot: usize,
}

/// Per-site outgoing transitions over the whole supercell.
#[derive(Clone, Debug, PartialEq)]
pub struct SupercellTransitionTable {
    sites: Supercell,
    slots: Supercell,
    offsets: Vec<usize>,
    dest: Vec<usize>,
    dx: Vec<Vec3>,
    slot: Vec<usize>,
}

impl SupercellTransitionTable {
    /// Geometry of the site space.
    pub fn supercell(&self) -> &Supercell {
        &self.sites
    }

    /// Geometry of the transition-slot space.
    pub fn slot_space(&self) -> &Supercell {
        &self.slots
    }

    /// Number of supercell sites.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Number of transition-energy slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total number of directed transitions.
    pub fn transition_count(&self) -> usize {
        self.dest.len()
    }

    /// Row offsets; `offsets()[s]..offsets()[s + 1]` are the transitions of
    /// site `s`.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Index range of the transitions of `site` in the flat arrays.
    pub fn range(&self, site: usize) -> Range<usize> {
        self.offsets[site]..self.offsets[site + 1]
    }

    /// Destinations of `site`'s transitions.
    pub fn destinations(&self, site: usize) -> &[usize] {
        &self.dest[self.range(site)]
    }

    /// Displacements of `site`'s transitions.
    pub fn displacements(&self, site: usize) -> &[Vec3] {
        &self.dx[self.range(site)]
    }

    /// Energy slots of `site`'s transitions.
    pub fn slots(&self, site: usize) -> &[usize] {
        &self.slot[self.range(site)]
    }

    /// Iterate the transitions of `site`.
    pub fn transitions(&self, site: usize) -> impl Iterator<Item = SupercellTransition> + '_ {
        self.range(site).map(move |k| SupercellTransition {
            dest: self.dest[k],
            dx: self.dx[k],
            slot: self.slot[k],
        })
    }

    /// Largest outgoing-transition count of any site.
    pub fn max_transitions(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}

/// Tiles a canonical table over an `N0 × N1 × N2` supercell.
#[derive(Clone, Copy, Debug)]
pub struct SupercellExpander {
    dims: [usize; 3],
}

impl SupercellExpander {
    /// Expander for the given tiling.
    pub fn new(dims: [usize; 3]) -> Self {
        Self { dims }
    }

    /// Expand `canonical` into a supercell table.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptySupercell`] for a zero dimension or a table with
    /// no sites; [`ConfigError::InvalidParameter`] if the table has no
    /// transitions at all.
    pub fn expand(
        &self,
        canonical: &CanonicalTransitionTable,
    ) -> Result<SupercellTransitionTable, ConfigError> {
        let sites = Supercell::new(self.dims, canonical.site_count())?;
        if canonical.energy_count() == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "jump_network",
                reason: "no transitions to expand".into(),
            });
        }
        let slots = sites.with_sites(canonical.energy_count())?;

        let total = sites.cell_count() * canonical.iter().count();
        let mut offsets = Vec::with_capacity(sites.len() + 1);
        let mut dest = Vec::with_capacity(total);
        let mut dx = Vec::with_capacity(total);
        let mut slot = Vec::with_capacity(total);

        offsets.push(0);
        for t in sites.translations() {
            for i in 0..canonical.site_count() {
                for tr in canonical.transitions(i) {
                    let there = t + tr.du;
                    dest.push(sites.index(&there, tr.dest));
                    dx.push(tr.dx);
                    slot.push(slots.index(&t, tr.energy).min(slots.index(&there, tr.energy)));
                }
                offsets.push(dest.len());
            }
        }

        tracing::debug!(
            dims = ?self.dims,
            sites = sites.len(),
            slots = slots.len(),
            transitions = dest.len(),
            "expanded supercell"
        );

        Ok(SupercellTransitionTable {
            sites,
            slots,
            offsets,
            dest,
            dx,
            slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jump_network::JumpNetworkReducer;
    use latkmc_test_utils::{simple_cubic, simple_cubic_jumps, two_site_chain, two_site_chain_jumps};
    use proptest::prelude::*;

    fn chain_table(dims: [usize; 3]) -> SupercellTransitionTable {
        let crys = two_site_chain();
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        SupercellExpander::new(dims).expand(&canonical).unwrap()
    }

    fn assert_reverse_shares_slot(table: &SupercellTransitionTable) {
        for s in 0..table.site_count() {
            for tr in table.transitions(s) {
                let back = table
                    .transitions(tr.dest)
                    .find(|b| b.dest == s && b.slot == tr.slot && b.dx == -tr.dx);
                assert!(back.is_some(), "bond {s}->{} has no matching reverse", tr.dest);
            }
        }
    }

    #[test]
    fn single_cell_maps_every_jump_to_itself() {
        let crys = simple_cubic(1.0);
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&simple_cubic_jumps(1.0))
            .unwrap();
        let table = SupercellExpander::new([1, 1, 1]).expand(&canonical).unwrap();
        assert_eq!(table.site_count(), 1);
        assert_eq!(table.slot_count(), 3);
        assert_eq!(table.destinations(0), &[0; 6]);
        assert_eq!(table.slots(0), &[0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn rows_are_contiguous_and_complete() {
        let table = chain_table([3, 2, 2]);
        assert_eq!(table.site_count(), 24);
        assert_eq!(table.offsets().len(), 25);
        assert_eq!(table.transition_count(), 12 * 12);
        assert_eq!(table.max_transitions(), 6);
        for s in 0..table.site_count() {
            assert_eq!(table.range(s).len(), 6);
        }
    }

    #[test]
    fn destinations_follow_cell_delta() {
        let table = chain_table([4, 1, 1]);
        let sc = *table.supercell();
        let origin = sc.index(&latkmc_core::Cell::new(0, 0, 0), 0);
        let dests = table.destinations(origin);
        // A -> B in the same cell, then A -> B in cell -1 (wraps to 3).
        assert_eq!(dests[0], sc.index(&latkmc_core::Cell::new(0, 0, 0), 1));
        assert_eq!(dests[1], sc.index(&latkmc_core::Cell::new(3, 0, 0), 1));
    }

    #[test]
    fn both_directions_of_a_bond_share_a_slot() {
        assert_reverse_shares_slot(&chain_table([3, 2, 1]));
    }

    #[test]
    fn empty_dimension_is_rejected() {
        let crys = simple_cubic(1.0);
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&simple_cubic_jumps(1.0))
            .unwrap();
        assert_eq!(
            SupercellExpander::new([0, 1, 1]).expand(&canonical),
            Err(ConfigError::EmptySupercell)
        );
    }

    proptest! {
        #[test]
        fn slot_agreement_holds_for_any_tiling(n0 in 1usize..5, n1 in 1usize..4, n2 in 1usize..4) {
            let table = chain_table([n0, n1, n2]);
            for s in 0..table.site_count() {
                for tr in table.transitions(s) {
                    prop_assert!(tr.slot < table.slot_count());
                    let matched = table
                        .transitions(tr.dest)
                        .any(|b| b.dest == s && b.slot == tr.slot && b.dx == -tr.dx);
                    prop_assert!(matched);
                }
            }
        }
    }
}
