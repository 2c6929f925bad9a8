//! Raw jump-network input.
//!
//! A jump network is an ordered list of symmetry-equivalence classes; each
//! class is a set of directed jumps `((origin, dest), dx)` with `dx` the
//! cartesian displacement. Class order is significant: it is the index space
//! of the per-class transition-state thermodynamics.

use crate::Vec3;

/// One directed jump between two basis sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jump {
    /// Origin basis site.
    pub origin: usize,
    /// Destination basis site.
    pub dest: usize,
    /// Cartesian displacement from origin to destination.
    pub dx: Vec3,
}

impl Jump {
    /// Create a jump.
    pub fn new(origin: usize, dest: usize, dx: Vec3) -> Self {
        Self { origin, dest, dx }
    }

    /// The same bond traversed backwards.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.dest,
            dest: self.origin,
            dx: -self.dx,
        }
    }
}

/// Symmetry-grouped jump network. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JumpNetwork {
    classes: Vec<Vec<Jump>>,
}

impl JumpNetwork {
    /// Wrap pre-grouped classes.
    pub fn new(classes: Vec<Vec<Jump>>) -> Self {
        Self { classes }
    }

    /// Build from the nested `((origin, dest), dx)` form emitted by the
    /// symmetry collaborator.
    pub fn from_pairs<I, J>(classes: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = ((usize, usize), Vec3)>,
    {
        Self {
            classes: classes
                .into_iter()
                .map(|class| {
                    class
                        .into_iter()
                        .map(|((i, j), dx)| Jump::new(i, j, dx))
                        .collect()
                })
                .collect(),
        }
    }

    /// The classes, in order.
    pub fn classes(&self) -> &[Vec<Jump>] {
        &self.classes
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// `true` if there are no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate `(class index, jump)` over every jump.
    pub fn jumps(&self) -> impl Iterator<Item = (usize, &Jump)> {
        self.classes
            .iter()
            .enumerate()
            .flat_map(|(c, class)| class.iter().map(move |j| (c, j)))
    }
}
