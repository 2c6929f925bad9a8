//! Simulation run configuration.

use latkmc_core::ConfigError;

/// Parameters of one diffusivity estimate.
///
/// Each trajectory runs `steps_per_site * Nsites` jumps, where `Nsites` is
/// the supercell site count, so the per-trajectory length scales with the
/// supercell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Jumps per supercell site in each trajectory (`Nstep`). Default: 4.
    pub steps_per_site: usize,
    /// Number of independent trajectories (`Nrun`). Default: 1000.
    pub trajectories: usize,
    /// Base seed. Trajectory `k` draws from its own stream seeded with
    /// `seed ^ k`. `None` draws a fresh base seed per run.
    pub seed: Option<u64>,
    /// Worker threads. `None` = `available_parallelism`.
    pub worker_count: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_site: 4,
            trajectories: 1000,
            seed: None,
            worker_count: None,
        }
    }
}

impl SimulationConfig {
    /// Check structural invariants.
    ///
    /// A zero trajectory count is accepted here and reported as
    /// [`DomainError::NoTrajectories`](latkmc_core::DomainError::NoTrajectories)
    /// when the run aggregates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_site == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "steps_per_site",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Resolve the actual worker count.
    ///
    /// Explicit values are clamped to `[1, 64]`; auto-detection uses
    /// `available_parallelism` under the same clamp. Never more workers
    /// than trajectories.
    pub fn resolved_worker_count(&self) -> usize {
        let n = match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        };
        n.min(self.trajectories.max(1))
    }
}
