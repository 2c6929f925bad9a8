//! Parallel trajectory simulation.
//!
//! Trajectory indices are handed out over a crossbeam channel to a pool of
//! scoped worker threads. Each trajectory draws from its own `ChaCha8Rng`
//! seeded with `base_seed ^ k`, and results are reduced in trajectory order,
//! so a seeded run gives the same tensor for any worker count.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimulationConfig;
use crate::estimate::{trajectory_tensor, DiffusivityEstimate, TensorAccumulator};
use crate::metrics::RunMetrics;
use crate::rates::KmcTables;
use latkmc_core::{ConfigError, KmcError, Tensor3, Vec3};

/// End state of one trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    /// Total displacement.
    pub displacement: Vec3,
    /// Total elapsed (residence) time.
    pub time: f64,
    /// Jumps executed.
    pub jumps: usize,
}

impl Trajectory {
    /// This trajectory's diffusivity estimator.
    pub fn tensor(&self) -> Tensor3 {
        trajectory_tensor(&self.displacement, self.time)
    }
}

/// Estimate plus how the run went.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Diffusivity tensor and error.
    pub estimate: DiffusivityEstimate,
    /// Timing and counters.
    pub metrics: RunMetrics,
}

/// Runs independent trajectories over read-only [`KmcTables`].
#[derive(Debug)]
pub struct TrajectorySimulator<'a> {
    tables: &'a KmcTables,
    config: SimulationConfig,
    steps: usize,
}

impl<'a> TrajectorySimulator<'a> {
    /// Simulator over `tables`.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error,
    /// [`ConfigError::EmptySupercell`] for tables with no sites, or
    /// [`ConfigError::InvalidParameter`] if the jumps per trajectory
    /// overflow `usize`.
    pub fn new(tables: &'a KmcTables, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if tables.site_count() == 0 {
            return Err(ConfigError::EmptySupercell);
        }
        let steps = config
            .steps_per_site
            .checked_mul(tables.site_count())
            .ok_or_else(|| ConfigError::InvalidParameter {
                name: "steps_per_site",
                reason: format!(
                    "{} steps over {} sites overflows the jump count",
                    config.steps_per_site,
                    tables.site_count()
                ),
            })?;
        Ok(Self {
            tables,
            config,
            steps,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Jumps per trajectory: `steps_per_site · Nsites`.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run trajectory `k` of the stream rooted at `base_seed`.
    pub fn run_trajectory(&self, k: u64, base_seed: u64) -> Trajectory {
        let tables = self.tables;
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed ^ k);
        let mut site = tables.sample_site(rng.random::<f64>());
        let mut displacement = Vec3::zeros();
        let mut time = 0.0;
        for _ in 0..self.steps {
            let t = tables.sample_transition(site, rng.random::<f64>());
            time += tables.escape_times()[site];
            displacement += tables.displacements()[t];
            site = tables.destinations()[t];
        }
        Trajectory {
            displacement,
            time,
            jumps: self.steps,
        }
    }

    /// Run all trajectories and aggregate.
    ///
    /// # Errors
    ///
    /// [`DomainError::NoTrajectories`](latkmc_core::DomainError::NoTrajectories)
    /// if the config asks for zero trajectories, or
    /// [`DomainError::NonFinite`](latkmc_core::DomainError::NonFinite) if
    /// the aggregate is not finite.
    pub fn run(&self) -> Result<SimulationResult, KmcError> {
        let start = Instant::now();
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        let n = self.config.trajectories;
        let workers = self.config.resolved_worker_count();

        let mut results: Vec<Option<Trajectory>> = vec![None; n];
        if n > 0 {
            let (task_tx, task_rx) = crossbeam_channel::bounded::<u64>(workers * 4);
            let (result_tx, result_rx) = crossbeam_channel::unbounded();
            std::thread::scope(|scope| {
                for _ in 0..workers {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || self.worker_loop(task_rx, result_tx, base_seed));
                }
                drop(task_rx);
                drop(result_tx);
                for k in 0..n as u64 {
                    if task_tx.send(k).is_err() {
                        tracing::warn!(sent = k, "all workers exited, stopping dispatch");
                        break;
                    }
                }
                drop(task_tx);
                for (k, trajectory) in result_rx.iter() {
                    results[k] = Some(trajectory);
                }
            });
        }

        let mut acc = TensorAccumulator::new();
        let mut jumps = 0u64;
        let mut simulated = 0.0;
        for trajectory in results.iter().flatten() {
            acc.push(&trajectory.tensor());
            jumps += trajectory.jumps as u64;
            simulated += trajectory.time;
        }
        let estimate = acc.finish()?;

        let metrics = RunMetrics {
            total_us: start.elapsed().as_micros() as u64,
            trajectories: acc.count(),
            jumps,
            workers,
            mean_simulated_time: simulated / acc.count() as f64,
        };
        tracing::info!(
            trajectories = metrics.trajectories,
            jumps = metrics.jumps,
            workers = metrics.workers,
            total_us = metrics.total_us,
            base_seed,
            d_iso = estimate.isotropic(),
            "simulation complete"
        );
        Ok(SimulationResult { estimate, metrics })
    }

    fn worker_loop(
        &self,
        task_rx: Receiver<u64>,
        result_tx: Sender<(usize, Trajectory)>,
        base_seed: u64,
    ) {
        while let Ok(k) = task_rx.recv() {
            let trajectory = self.run_trajectory(k, base_seed);
            if result_tx.send((k as usize, trajectory)).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateMatrixBuilder;
    use crate::thermo::ThermoParams;
    use latkmc_core::DomainError;
    use latkmc_lattice::{JumpNetworkReducer, SiteFieldMapper, SupercellExpander};
    use latkmc_test_utils::{two_site_chain, two_site_chain_jumps};

    fn chain_tables() -> KmcTables {
        let crys = two_site_chain();
        let canonical = JumpNetworkReducer::new(&crys, 0)
            .reduce(&two_site_chain_jumps())
            .unwrap();
        let table = SupercellExpander::new([2, 2, 1]).expand(&canonical).unwrap();
        let sites = SiteFieldMapper::new(&[vec![0], vec![1]], 2).unwrap();
        let params = ThermoParams {
            pre: vec![1.0, 2.0],
            ene: vec![0.0, 0.4],
            pre_t: vec![1.0, 0.5, 0.8],
            ene_t: vec![0.7, 1.0, 1.2],
        };
        let thermo = params.broadcast(&sites, &canonical, &table).unwrap();
        RateMatrixBuilder::new(&table).build(&thermo).unwrap()
    }

    fn config(workers: usize) -> SimulationConfig {
        SimulationConfig {
            steps_per_site: 4,
            trajectories: 200,
            seed: Some(0x5eed),
            worker_count: Some(workers),
        }
    }

    #[test]
    fn trajectory_is_deterministic_for_a_seed() {
        let tables = chain_tables();
        let sim = TrajectorySimulator::new(&tables, config(1)).unwrap();
        assert_eq!(sim.run_trajectory(7, 42), sim.run_trajectory(7, 42));
        assert_ne!(sim.run_trajectory(7, 42), sim.run_trajectory(8, 42));
        assert_eq!(sim.run_trajectory(7, 42).jumps, 4 * 8);
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let tables = chain_tables();
        let one = TrajectorySimulator::new(&tables, config(1)).unwrap().run().unwrap();
        let four = TrajectorySimulator::new(&tables, config(4)).unwrap().run().unwrap();
        assert_eq!(one.estimate, four.estimate);
        assert_eq!(one.metrics.workers, 1);
        assert_eq!(four.metrics.workers, 4);
        assert_eq!(four.metrics.trajectories, 200);
        assert_eq!(four.metrics.jumps, 200 * 32);
    }

    #[test]
    fn tensor_is_symmetric() {
        let tables = chain_tables();
        let d = TrajectorySimulator::new(&tables, config(2))
            .unwrap()
            .run()
            .unwrap()
            .estimate
            .d;
        assert_eq!(d, d.transpose());
    }

    #[test]
    fn zero_trajectories_is_a_domain_error() {
        let tables = chain_tables();
        let cfg = SimulationConfig {
            trajectories: 0,
            ..config(2)
        };
        let err = TrajectorySimulator::new(&tables, cfg).unwrap().run().unwrap_err();
        assert_eq!(err, KmcError::Domain(DomainError::NoTrajectories));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let tables = chain_tables();
        let cfg = SimulationConfig {
            steps_per_site: 0,
            ..config(1)
        };
        assert!(TrajectorySimulator::new(&tables, cfg).is_err());
    }

    #[test]
    fn overflowing_jump_count_is_rejected() {
        let tables = chain_tables();
        let cfg = SimulationConfig {
            steps_per_site: usize::MAX,
            ..config(1)
        };
        let err = TrajectorySimulator::new(&tables, cfg).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "steps_per_site",
                ..
            }
        ));
        let sim = TrajectorySimulator::new(&tables, config(1)).unwrap();
        assert_eq!(sim.steps(), 4 * 8);
    }
}
