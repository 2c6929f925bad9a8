//! Broadcasting per-class scalars onto every supercell replica.

use crate::periodic::Supercell;
use latkmc_core::ConfigError;

/// Maps unit-cell entries to the symmetry class whose value they carry.
///
/// Used both for sites (classes = Wyckoff orbits) and for transition-energy
/// indices (classes = jump-network provenance).
///
/// If classes overlap, the first class listing an entry wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteFieldMapper {
    class_of: Vec<usize>,
    class_count: usize,
}

impl SiteFieldMapper {
    /// Build from explicit class membership lists over `sites` unit-cell
    /// entries.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SiteOutOfRange`] if a class names an entry `>= sites`;
    /// [`ConfigError::UnclassifiedSite`] if an entry has no class.
    pub fn new(classes: &[Vec<usize>], sites: usize) -> Result<Self, ConfigError> {
        let mut class_of: Vec<Option<usize>> = vec![None; sites];
        for (c, members) in classes.iter().enumerate() {
            for &site in members {
                let slot = class_of.get_mut(site).ok_or(ConfigError::SiteOutOfRange {
                    index: site,
                    len: sites,
                })?;
                slot.get_or_insert(c);
            }
        }
        let class_of = class_of
            .into_iter()
            .enumerate()
            .map(|(site, c)| c.ok_or(ConfigError::UnclassifiedSite { site }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            class_of,
            class_count: classes.len(),
        })
    }

    /// Build from a direct entry-to-class table (for example the provenance
    /// of transition-energy indices).
    pub fn from_assignment(class_of: Vec<usize>, class_count: usize) -> Result<Self, ConfigError> {
        if let Some(&bad) = class_of.iter().find(|&&c| c >= class_count) {
            return Err(ConfigError::SiteOutOfRange {
                index: bad,
                len: class_count,
            });
        }
        Ok(Self {
            class_of,
            class_count,
        })
    }

    /// Class of unit-cell entry `site`.
    pub fn class_of(&self, site: usize) -> usize {
        self.class_of[site]
    }

    /// Number of unit-cell entries.
    pub fn sites(&self) -> usize {
        self.class_of.len()
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// Expand `values` (one per class) onto every entry of `supercell`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LengthMismatch`] if `values` does not have one entry
    /// per class, or `supercell` replicates a different number of entries
    /// per cell than this mapper covers.
    pub fn broadcast(&self, values: &[f64], supercell: &Supercell) -> Result<Vec<f64>, ConfigError> {
        if values.len() != self.class_count {
            return Err(ConfigError::LengthMismatch {
                what: "class values",
                expected: self.class_count,
                got: values.len(),
            });
        }
        if supercell.sites_per_cell() != self.class_of.len() {
            return Err(ConfigError::LengthMismatch {
                what: "supercell sites per cell",
                expected: self.class_of.len(),
                got: supercell.sites_per_cell(),
            });
        }
        let cell: Vec<f64> = self.class_of.iter().map(|&c| values[c]).collect();
        // Flat layout is site-fastest, so each cell is one contiguous copy.
        Ok(cell.repeat(supercell.cell_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latkmc_core::Cell;

    #[test]
    fn every_replica_gets_its_class_value() {
        let mapper = SiteFieldMapper::new(&[vec![0, 2], vec![1]], 3).unwrap();
        let sc = Supercell::new([2, 1, 3], 3).unwrap();
        let field = mapper.broadcast(&[10.0, 20.0], &sc).unwrap();
        assert_eq!(field.len(), sc.len());
        for t in sc.translations() {
            assert_eq!(field[sc.index(&t, 0)], 10.0);
            assert_eq!(field[sc.index(&t, 1)], 20.0);
            assert_eq!(field[sc.index(&t, 2)], 10.0);
        }
        assert_eq!(field[sc.index(&Cell::new(-1, 0, 5), 1)], 20.0);
    }

    #[test]
    fn overlapping_classes_keep_first_match() {
        let mapper = SiteFieldMapper::new(&[vec![0, 1], vec![1]], 2).unwrap();
        assert_eq!(mapper.class_of(1), 0);
    }

    #[test]
    fn site_without_class_is_rejected() {
        let err = SiteFieldMapper::new(&[vec![0]], 2).unwrap_err();
        assert_eq!(err, ConfigError::UnclassifiedSite { site: 1 });
    }

    #[test]
    fn wrong_value_count_is_rejected() {
        let mapper = SiteFieldMapper::new(&[vec![0]], 1).unwrap();
        let sc = Supercell::new([1, 1, 1], 1).unwrap();
        assert!(matches!(
            mapper.broadcast(&[1.0, 2.0], &sc),
            Err(ConfigError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn assignment_rejects_unknown_class() {
        let err = SiteFieldMapper::from_assignment(vec![0, 2], 2).unwrap_err();
        assert_eq!(err, ConfigError::SiteOutOfRange { index: 2, len: 2 });
    }
}
