//! Periodic indexing over an `N0 × N1 × N2` tiling of the unit cell.
//!
//! Flat index layout: `site + Nsites * (w0 + N0 * (w1 + N1 * w2))` with
//! `wi = vi mod Ni` (non-negative). The site index varies fastest, then the
//! first cell axis.

use latkmc_core::{Cell, ConfigError};

/// Non-negative modulo of one cell coordinate.
fn wrap(v: i32, n: usize) -> usize {
    i64::from(v).rem_euclid(n as i64) as usize
}

/// Flat supercell index of basis site `site` in cell `cell`.
///
/// Cell vectors outside `[0, N)` (including negative ones) wrap
/// periodically, so every integer cell vector has an index.
pub fn periodic_index(cell: &Cell, site: usize, dims: [usize; 3], sites: usize) -> usize {
    let w0 = wrap(cell[0], dims[0]);
    let w1 = wrap(cell[1], dims[1]);
    let w2 = wrap(cell[2], dims[2]);
    site + sites * (w0 + dims[0] * (w1 + dims[1] * w2))
}

/// Geometry of a finite periodic supercell.
///
/// `sites` counts whatever is replicated per unit cell: basis sites for the
/// site space, transition-energy indices for the transition-slot space.
///
/// # Examples
///
/// ```
/// use latkmc_core::Cell;
/// use latkmc_lattice::Supercell;
///
/// let sc = Supercell::new([2, 2, 2], 3).unwrap();
/// assert_eq!(sc.len(), 24);
/// // (-1, 0, 0) wraps to (1, 0, 0).
/// assert_eq!(sc.index(&Cell::new(-1, 0, 0), 2), sc.index(&Cell::new(1, 0, 0), 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Supercell {
    dims: [usize; 3],
    sites: usize,
}

impl Supercell {
    /// Create a supercell of `dims` cells with `sites` entries per cell.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptySupercell`] if any dimension or `sites` is zero;
    /// [`ConfigError::InvalidParameter`] if a dimension does not fit an
    /// `i32` cell coordinate or the total count overflows.
    pub fn new(dims: [usize; 3], sites: usize) -> Result<Self, ConfigError> {
        if sites == 0 || dims.iter().any(|&n| n == 0) {
            return Err(ConfigError::EmptySupercell);
        }
        if dims.iter().any(|&n| n > i32::MAX as usize) {
            return Err(ConfigError::InvalidParameter {
                name: "dims",
                reason: format!("{dims:?} exceeds i32 cell range"),
            });
        }
        dims.iter()
            .try_fold(sites, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: "dims",
                reason: format!("{dims:?} x {sites} overflows usize"),
            })?;
        Ok(Self { dims, sites })
    }

    /// The same tiling with a different per-cell count.
    pub fn with_sites(&self, sites: usize) -> Result<Self, ConfigError> {
        Self::new(self.dims, sites)
    }

    /// Cells along each axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Entries per unit cell.
    pub fn sites_per_cell(&self) -> usize {
        self.sites
    }

    /// Number of unit cells, `N0 * N1 * N2`.
    pub fn cell_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Total entries, `N0 * N1 * N2 * sites`.
    pub fn len(&self) -> usize {
        self.cell_count() * self.sites
    }

    /// Always `false`; construction rejects empty supercells.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flat index of `site` in `cell`; see [`periodic_index`].
    pub fn index(&self, cell: &Cell, site: usize) -> usize {
        debug_assert!(site < self.sites, "site {site} >= {}", self.sites);
        periodic_index(cell, site, self.dims, self.sites)
    }

    /// Inverse of [`index`](Self::index): the in-range cell and site of a
    /// flat index.
    pub fn decompose(&self, index: usize) -> (Cell, usize) {
        let site = index % self.sites;
        let mut rest = index / self.sites;
        let w0 = rest % self.dims[0];
        rest /= self.dims[0];
        let w1 = rest % self.dims[1];
        let w2 = rest / self.dims[1];
        (Cell::new(w0 as i32, w1 as i32, w2 as i32), site)
    }

    /// Every in-range cell vector, in flat-index order.
    pub fn translations(&self) -> impl Iterator<Item = Cell> + '_ {
        let [n0, n1, n2] = self.dims;
        (0..n2).flat_map(move |c| {
            (0..n1).flat_map(move |b| (0..n0).map(move |a| Cell::new(a as i32, b as i32, c as i32)))
        })
    }
}
