//! Per-run metrics for the trajectory simulator.

/// Counters and timing collected over one [`run`](crate::TrajectorySimulator::run).
///
/// Durations are in microseconds of wall-clock time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
    /// Trajectories aggregated into the estimate.
    pub trajectories: usize,
    /// Jumps executed across all trajectories.
    pub jumps: u64,
    /// Worker threads used.
    pub workers: usize,
    /// Mean elapsed simulated time per trajectory.
    pub mean_simulated_time: f64,
}

impl RunMetrics {
    /// Jumps per wall-clock second, or 0 for an instantaneous run.
    pub fn jumps_per_second(&self) -> f64 {
        if self.total_us == 0 {
            0.0
        } else {
            self.jumps as f64 * 1e6 / self.total_us as f64
        }
    }
}
