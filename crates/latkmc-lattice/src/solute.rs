//! Symmetry-grouped neighbor shells around a fixed solute.
//!
//! Candidates are every site of the target chemistry in a block of cell
//! translations wide enough (from the lattice metric) to contain the
//! cutoff sphere. A candidate joins an existing class when some operation
//! of the solute's point group maps that class's representative exactly
//! onto it (same site, same integer cell); otherwise it starts a new class.
//! The class scan is linear, which is fine for cutoff-bounded shells.

use latkmc_core::{Cell, ConfigError, CrystalLattice};

/// Largest per-axis half-width of the cell block scanned for neighbors.
const MAX_SHELL_EXTENT: f64 = 65_536.0;

/// A neighbor site, relative to a solute in the origin cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoluteNeighbor {
    /// Basis site of the target chemistry.
    pub site: usize,
    /// Cell of the neighbor.
    pub cell: Cell,
}

/// Neighbors grouped by symmetry class; the first member of each class is
/// its representative.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoluteNeighborList {
    classes: Vec<Vec<SoluteNeighbor>>,
}

impl SoluteNeighborList {
    /// Wrap pre-grouped classes.
    pub fn new(classes: Vec<Vec<SoluteNeighbor>>) -> Self {
        Self { classes }
    }

    /// The classes, in discovery order.
    pub fn classes(&self) -> &[Vec<SoluteNeighbor>] {
        &self.classes
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Total number of neighbors.
    pub fn len(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// `true` if no site lies within the cutoff.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate `(class, neighbor)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SoluteNeighbor)> {
        self.classes
            .iter()
            .enumerate()
            .flat_map(|(c, members)| members.iter().map(move |n| (c, n)))
    }
}

/// Finds the neighbors of one solute site within a cutoff.
///
/// ```
/// use latkmc_lattice::SoluteNeighborFinder;
/// use latkmc_test_utils::fcc;
///
/// let crys = fcc(1.0);
/// let shell = SoluteNeighborFinder::new(&crys, 0, 0, 0, 0.75).find().unwrap();
/// assert_eq!(shell.class_count(), 1);
/// assert_eq!(shell.len(), 12);
/// ```
pub struct SoluteNeighborFinder<'a, C: CrystalLattice + ?Sized> {
    crystal: &'a C,
    solute_chem: usize,
    solute_site: usize,
    target_chem: usize,
    cutoff: f64,
}

impl<'a, C: CrystalLattice + ?Sized> SoluteNeighborFinder<'a, C> {
    /// Finder for the solute at `solute_site` of `solute_chem` (origin cell),
    /// collecting sites of `target_chem` with `0 < |dx| <= cutoff`.
    pub fn new(
        crystal: &'a C,
        solute_chem: usize,
        solute_site: usize,
        target_chem: usize,
        cutoff: f64,
    ) -> Self {
        Self {
            crystal,
            solute_chem,
            solute_site,
            target_chem,
            cutoff,
        }
    }

    /// Per-axis half-width of the translation block covering the cutoff.
    fn shell_extent(&self) -> Result<[i32; 3], ConfigError> {
        let inverse = self.crystal.inverse_lattice();
        let mut extent = [0; 3];
        for (axis, n) in extent.iter_mut().enumerate() {
            // +1 covers the spread of basis offsets within a cell.
            let cells = (self.cutoff * inverse.row(axis).norm()).ceil() + 1.0;
            if !cells.is_finite() || cells > MAX_SHELL_EXTENT {
                return Err(ConfigError::InvalidParameter {
                    name: "cutoff",
                    reason: format!(
                        "{} spans {cells} cells along axis {axis}, limit is {MAX_SHELL_EXTENT}",
                        self.cutoff
                    ),
                });
            }
            *n = cells as i32;
        }
        Ok(extent)
    }

    /// Enumerate and classify the neighbors.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SiteOutOfRange`] for an unknown chemistry or solute
    /// site; [`ConfigError::InvalidParameter`] for a negative or non-finite
    /// cutoff, or one spanning more than 65536 cells along an axis. An empty
    /// result is not an error.
    pub fn find(&self) -> Result<SoluteNeighborList, ConfigError> {
        let nchem = self.crystal.chemistry_count();
        for chem in [self.solute_chem, self.target_chem] {
            if chem >= nchem {
                return Err(ConfigError::SiteOutOfRange {
                    index: chem,
                    len: nchem,
                });
            }
        }
        let nsolute = self.crystal.basis(self.solute_chem).len();
        if self.solute_site >= nsolute {
            return Err(ConfigError::SiteOutOfRange {
                index: self.solute_site,
                len: nsolute,
            });
        }
        if !(self.cutoff.is_finite() && self.cutoff >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "cutoff",
                reason: format!("must be finite and >= 0, got {}", self.cutoff),
            });
        }

        let origin = self
            .crystal
            .cartesian(self.solute_chem, self.solute_site, &Cell::zeros());
        let cutoff2 = self.cutoff * self.cutoff;
        let [n0, n1, n2] = self.shell_extent()?;
        let ops = self.crystal.point_group(self.solute_chem, self.solute_site);

        let mut classes: Vec<Vec<SoluteNeighbor>> = Vec::new();
        for orbit in self.crystal.wyckoff(self.target_chem) {
            for &site in orbit {
                for a in -n0..=n0 {
                    for b in -n1..=n1 {
                        for c in -n2..=n2 {
                            let cell = Cell::new(a, b, c);
                            let dx = self.crystal.cartesian(self.target_chem, site, &cell) - origin;
                            let d2 = dx.norm_squared();
                            if !(d2 > 0.0 && d2 <= cutoff2) {
                                continue;
                            }
                            let candidate = SoluteNeighbor { site, cell };
                            let matched = classes.iter_mut().find(|members| {
                                let rep = members[0];
                                ops.iter().any(|g| {
                                    self.crystal.apply(g, self.target_chem, rep.site, &rep.cell)
                                        == (site, cell)
                                })
                            });
                            match matched {
                                Some(members) => members.push(candidate),
                                None => classes.push(vec![candidate]),
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(
            solute_chem = self.solute_chem,
            solute_site = self.solute_site,
            target_chem = self.target_chem,
            cutoff = self.cutoff,
            classes = classes.len(),
            neighbors = classes.iter().map(Vec::len).sum::<usize>(),
            "found solute neighbors"
        );

        Ok(SoluteNeighborList { classes })
    }
}
