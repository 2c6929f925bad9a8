//! Aggregation of per-trajectory tensors into `D` and `dD`.

use latkmc_core::{DomainError, Tensor3, Vec3};

/// Per-trajectory diffusivity estimator `R Rᵀ / (2t)`.
pub fn trajectory_tensor(displacement: &Vec3, time: f64) -> Tensor3 {
    displacement * displacement.transpose() / (2.0 * time)
}

/// Diffusivity tensor and its error estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusivityEstimate {
    /// Mean of the per-trajectory tensors.
    pub d: Tensor3,
    /// `sqrt(mean(D_k²)) / Nrun`, element-wise.
    pub dd: Tensor3,
    /// Number of trajectories aggregated.
    pub trajectories: usize,
}

impl DiffusivityEstimate {
    /// One third of the trace of `d`.
    pub fn isotropic(&self) -> f64 {
        self.d.trace() / 3.0
    }
}

/// Running sums of per-trajectory tensors.
///
/// The reduction is a plain sum, so partial accumulators can be merged in
/// any grouping; feeding them in a fixed order gives bit-identical results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TensorAccumulator {
    sum: Tensor3,
    sum_sq: Tensor3,
    count: usize,
}

impl Default for TensorAccumulator {
    fn default() -> Self {
        Self {
            sum: Tensor3::zeros(),
            sum_sq: Tensor3::zeros(),
            count: 0,
        }
    }
}

impl TensorAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trajectory's tensor.
    pub fn push(&mut self, tensor: &Tensor3) {
        self.sum += tensor;
        self.sum_sq += tensor.component_mul(tensor);
        self.count += 1;
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.count += other.count;
    }

    /// Number of tensors pushed.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Final estimate.
    ///
    /// # Errors
    ///
    /// [`DomainError::NoTrajectories`] when empty;
    /// [`DomainError::NonFinite`] if any component is NaN or infinite.
    pub fn finish(&self) -> Result<DiffusivityEstimate, DomainError> {
        if self.count == 0 {
            return Err(DomainError::NoTrajectories);
        }
        let n = self.count as f64;
        let d = self.sum / n;
        let dd = (self.sum_sq / n).map(f64::sqrt) / n;
        if d.iter().chain(dd.iter()).any(|x| !x.is_finite()) {
            return Err(DomainError::NonFinite {
                what: "diffusivity tensor",
            });
        }
        Ok(DiffusivityEstimate {
            d,
            dd,
            trajectories: self.count,
        })
    }
}
