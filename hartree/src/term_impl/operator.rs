use crate::error::HartreeError;
use basis::Kpoint;
use num_complex::Complex64;
use std::sync::Arc;

/// Local potential acting by pointwise multiplication on real-space orbitals
/// at one k-point. All k-points of a term share the same potential buffer.
#[derive(Debug, Clone)]
pub struct RealSpaceMultiplication {
    kpoint: Kpoint,
    potential: Arc<[f64]>,
}

impl RealSpaceMultiplication {
    pub fn new(kpoint: Kpoint, potential: Arc<[f64]>) -> Self {
        RealSpaceMultiplication { kpoint, potential }
    }

    pub fn kpoint(&self) -> &Kpoint {
        &self.kpoint
    }

    pub fn potential(&self) -> &[f64] {
        &self.potential
    }

    /// Compute V(r) ψ(r) on the real-space grid.
    pub fn apply(&self, psi_real: &[Complex64]) -> Result<Vec<Complex64>, HartreeError> {
        if psi_real.len() != self.potential.len() {
            return Err(HartreeError::ShapeMismatch {
                what: "real-space orbital",
                expected: self.potential.len(),
                found: psi_real.len(),
            });
        }
        Ok(psi_real
            .iter()
            .zip(self.potential.iter())
            .map(|(psi, v)| *psi * *v)
            .collect())
    }
}
