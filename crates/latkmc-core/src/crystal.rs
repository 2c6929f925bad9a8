//! The crystal-structure collaborator.
//!
//! Symmetry discovery (point groups, Wyckoff orbits, space-group operations)
//! is owned by an external tool. latkmc consumes its output read-only
//! through [`CrystalLattice`]. [`CrystalData`] is a plain-data implementation
//! for callers that already hold the tables.
//!
//! # Conventions
//!
//! - `lattice()` holds the lattice vectors as **columns**: a fractional
//!   coordinate `u` sits at cartesian `lattice() * u`.
//! - Basis positions are fractional, one list per chemistry.
//! - Group operations act in fractional coordinates.

use crate::error::ConfigError;
use crate::{Cell, Tensor3, Vec3};
use nalgebra::Matrix3;

/// A space-group operation in lattice coordinates.
///
/// Maps fractional position `u` to `rot * u + trans`, and permutes the basis
/// of each chemistry through `indexmap[chem][site]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupOp {
    /// Integer rotation matrix in lattice coordinates.
    pub rot: Matrix3<i32>,
    /// Fractional translation.
    pub trans: Vec3,
    /// Image of each basis site, per chemistry.
    pub indexmap: Vec<Vec<usize>>,
}

impl GroupOp {
    /// Create an operation from its parts.
    pub fn new(rot: Matrix3<i32>, trans: Vec3, indexmap: Vec<Vec<usize>>) -> Self {
        Self {
            rot,
            trans,
            indexmap,
        }
    }

    /// The identity operation for a crystal with the given site count per
    /// chemistry.
    pub fn identity(sites_per_chem: &[usize]) -> Self {
        Self {
            rot: Matrix3::identity(),
            trans: Vec3::zeros(),
            indexmap: sites_per_chem.iter().map(|&n| (0..n).collect()).collect(),
        }
    }

    /// Rotate a pure lattice translation (no basis, no fractional shift).
    pub fn rotate_cell(&self, cell: &Cell) -> Cell {
        self.rot * cell
    }

    /// Apply the operation to the basis site `site` of chemistry `chem`
    /// sitting in unit cell `cell`, returning the image site and its cell.
    ///
    /// `basis` is the fractional basis of `chem`.
    ///
    /// # Panics
    ///
    /// Panics if `chem` or `site` is outside the operation's index map or
    /// the basis.
    pub fn apply_site(&self, basis: &[Vec3], chem: usize, site: usize, cell: &Cell) -> (usize, Cell) {
        let rot = self.rot.map(f64::from);
        let frac = rot * (cell.map(f64::from) + basis[site]) + self.trans;
        let image = self.indexmap[chem][site];
        let shifted = frac - basis[image];
        (image, shifted.map(|x| x.round() as i32))
    }

    /// Check that `indexmap` is a site map over `basis` (one basis per
    /// chemistry).
    fn check_indexmap(&self, basis: &[Vec<Vec3>]) -> Result<(), ConfigError> {
        if self.indexmap.len() != basis.len() {
            return Err(ConfigError::LengthMismatch {
                what: "indexmap chemistries",
                expected: basis.len(),
                got: self.indexmap.len(),
            });
        }
        for (row, sites) in self.indexmap.iter().zip(basis) {
            if row.len() != sites.len() {
                return Err(ConfigError::LengthMismatch {
                    what: "indexmap sites",
                    expected: sites.len(),
                    got: row.len(),
                });
            }
            if let Some(&image) = row.iter().find(|&&image| image >= sites.len()) {
                return Err(ConfigError::SiteOutOfRange {
                    index: image,
                    len: sites.len(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only view of a crystal, as supplied by the symmetry collaborator.
pub trait CrystalLattice {
    /// Lattice vectors as columns.
    fn lattice(&self) -> &Tensor3;

    /// Inverse of [`lattice()`](CrystalLattice::lattice): cartesian to
    /// fractional.
    fn inverse_lattice(&self) -> &Tensor3;

    /// Number of chemistries.
    fn chemistry_count(&self) -> usize;

    /// Fractional basis positions of chemistry `chem`.
    fn basis(&self, chem: usize) -> &[Vec3];

    /// Wyckoff-orbit partition of the basis of `chem`, as lists of site
    /// indices.
    fn wyckoff(&self, chem: usize) -> &[Vec<usize>];

    /// Operations that leave site `site` of `chem` (in the origin cell)
    /// fixed.
    fn point_group(&self, chem: usize, site: usize) -> &[GroupOp];

    /// Apply `op` to site `site` of `chem` sitting in `cell`.
    fn apply(&self, op: &GroupOp, chem: usize, site: usize, cell: &Cell) -> (usize, Cell) {
        op.apply_site(self.basis(chem), chem, site, cell)
    }

    /// Cartesian position of `site` of `chem` in `cell`.
    fn cartesian(&self, chem: usize, site: usize, cell: &Cell) -> Vec3 {
        self.lattice() * (cell.map(f64::from) + self.basis(chem)[site])
    }
}

/// Plain-data [`CrystalLattice`].
#[derive(Clone, Debug)]
pub struct CrystalData {
    lattice: Tensor3,
    inverse: Tensor3,
    basis: Vec<Vec<Vec3>>,
    wyckoff: Vec<Vec<Vec<usize>>>,
    point_groups: Vec<Vec<Vec<GroupOp>>>,
}

impl CrystalData {
    /// Assemble a crystal from tables produced by a symmetry tool.
    ///
    /// `point_groups[chem][site]` lists the operations fixing that site.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SingularLattice`] if `lattice` is not invertible.
    /// - [`ConfigError::LengthMismatch`] if the per-chemistry tables
    ///   disagree in shape.
    /// - [`ConfigError::SiteOutOfRange`] if a Wyckoff orbit or an operation's
    ///   index map names a site past the end of its basis.
    ///
    /// Every operation's index map must hold one row per chemistry, each as
    /// long as that chemistry's basis.
    pub fn new(
        lattice: Tensor3,
        basis: Vec<Vec<Vec3>>,
        wyckoff: Vec<Vec<Vec<usize>>>,
        point_groups: Vec<Vec<Vec<GroupOp>>>,
    ) -> Result<Self, ConfigError> {
        let inverse = lattice.try_inverse().ok_or(ConfigError::SingularLattice)?;
        if !inverse.iter().all(|x| x.is_finite()) {
            return Err(ConfigError::SingularLattice);
        }
        for (what, len) in [("wyckoff", wyckoff.len()), ("point_groups", point_groups.len())] {
            if len != basis.len() {
                return Err(ConfigError::LengthMismatch {
                    what,
                    expected: basis.len(),
                    got: len,
                });
            }
        }
        for (chem, sites) in basis.iter().enumerate() {
            if point_groups[chem].len() != sites.len() {
                return Err(ConfigError::LengthMismatch {
                    what: "point_groups per site",
                    expected: sites.len(),
                    got: point_groups[chem].len(),
                });
            }
            for &site in wyckoff[chem].iter().flatten() {
                if site >= sites.len() {
                    return Err(ConfigError::SiteOutOfRange {
                        index: site,
                        len: sites.len(),
                    });
                }
            }
        }
        for op in point_groups.iter().flatten().flatten() {
            op.check_indexmap(&basis)?;
        }
        Ok(Self {
            lattice,
            inverse,
            basis,
            wyckoff,
            point_groups,
        })
    }
}

impl CrystalLattice for CrystalData {
    fn lattice(&self) -> &Tensor3 {
        &self.lattice
    }

    fn inverse_lattice(&self) -> &Tensor3 {
        &self.inverse
    }

    fn chemistry_count(&self) -> usize {
        self.basis.len()
    }

    fn basis(&self, chem: usize) -> &[Vec3] {
        &self.basis[chem]
    }

    fn wyckoff(&self, chem: usize) -> &[Vec<usize>] {
        &self.wyckoff[chem]
    }

    fn point_group(&self, chem: usize, site: usize) -> &[GroupOp] {
        &self.point_groups[chem][site]
    }
}
