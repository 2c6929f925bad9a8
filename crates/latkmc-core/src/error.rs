//! Error types for the latkmc workspace.
//!
//! Two families, matching where a failure is detected:
//!
//! - [`ConfigError`]: the inputs describe an impossible or inconsistent
//!   system. Raised at construction boundaries (jump-network reduction,
//!   rate-table building, parameter validation) before any trajectory runs.
//! - [`DomainError`]: a numerical result is undefined (no samples, or a
//!   non-finite value).
//!
//! [`KmcError`] wraps both for call sites that cross the boundary.

use std::error::Error;
use std::fmt;

/// Errors detected while validating or reducing simulation inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A jump displacement does not decompose into an integer cell
    /// translation plus the basis difference of its endpoints.
    NonIntegerDisplacement {
        /// Index of the jump-network class containing the jump.
        class: usize,
        /// Origin site of the jump.
        origin: usize,
        /// Destination site of the jump.
        dest: usize,
        /// Largest distance of any component from the nearest integer.
        residual: f64,
    },
    /// A site has no outgoing rate, so its escape time is undefined.
    ZeroEscapeRate {
        /// Supercell index of the site.
        site: usize,
    },
    /// A unit-cell site does not belong to any symmetry class.
    UnclassifiedSite {
        /// Unit-cell index of the site.
        site: usize,
    },
    /// Two inputs that must agree in length do not.
    LengthMismatch {
        /// What was being measured.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// A supercell dimension or the per-cell site count is zero.
    EmptySupercell,
    /// The lattice matrix has no inverse.
    SingularLattice,
    /// A split matrix breaks `x[i][j] + x[j][i] = 1`.
    InvalidSplitMatrix {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// The offending sum `x[i][j] + x[j][i]`.
        sum: f64,
    },
    /// A site or chemistry index is past the end of its table.
    SiteOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },
    /// A scalar parameter is outside its valid range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonIntegerDisplacement {
                class,
                origin,
                dest,
                residual,
            } => write!(
                f,
                "jump {origin}->{dest} in class {class} is not a lattice translation \
                 (residual {residual:e})"
            ),
            Self::ZeroEscapeRate { site } => {
                write!(f, "site {site} has zero total escape rate")
            }
            Self::UnclassifiedSite { site } => {
                write!(f, "site {site} is not a member of any symmetry class")
            }
            Self::LengthMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what}: expected length {expected}, got {got}"),
            Self::EmptySupercell => {
                write!(f, "supercell dimensions and site count must be non-zero")
            }
            Self::SingularLattice => write!(f, "lattice matrix is singular"),
            Self::InvalidSplitMatrix { i, j, sum } => {
                write!(f, "split matrix entries ({i},{j}) and ({j},{i}) sum to {sum}, not 1")
            }
            Self::SiteOutOfRange { index, len } => {
                write!(f, "index {index} out of range (len {len})")
            }
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors from numerical evaluation of a result.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainError {
    /// Statistics were requested over zero trajectories.
    NoTrajectories,
    /// A computed quantity is NaN or infinite.
    NonFinite {
        /// Which quantity.
        what: &'static str,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTrajectories => write!(f, "no trajectories to aggregate"),
            Self::NonFinite { what } => write!(f, "{what} is not finite"),
        }
    }
}

impl Error for DomainError {}

/// Any latkmc failure.
#[derive(Clone, Debug, PartialEq)]
pub enum KmcError {
    /// Invalid inputs.
    Config(ConfigError),
    /// Undefined numerical result.
    Domain(DomainError),
}

impl fmt::Display for KmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Domain(e) => write!(f, "domain: {e}"),
        }
    }
}

impl Error for KmcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Domain(e) => Some(e),
        }
    }
}

impl From<ConfigError> for KmcError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DomainError> for KmcError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_site() {
        let e = ConfigError::ZeroEscapeRate { site: 7 };
        assert_eq!(e.to_string(), "site 7 has zero total escape rate");
    }

    #[test]
    fn kmc_error_exposes_source() {
        let e: KmcError = DomainError::NoTrajectories.into();
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "domain: no trajectories to aggregate");
    }

    #[test]
    fn config_error_converts_into_kmc_error() {
        let e: KmcError = ConfigError::SingularLattice.into();
        assert_eq!(e, KmcError::Config(ConfigError::SingularLattice));
    }
}
