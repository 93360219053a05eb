//! Second derivative of the Hartree energy with respect to the density.
//!
//! All three primitives reduce δρ to its total over spin channels, multiply in
//! reciprocal space by a diagonal table and broadcast the resulting δV to
//! every spin channel. The G = 0 component is annihilated throughout, so
//! `apply_kernel_invsqrt` is a pseudo-inverse square root: the mean of δρ
//! cannot be recovered from it.

use super::term::TermHartree;
use crate::error::HartreeError;
use basis::{DensityField, ReciprocalBasis};
use num_complex::Complex64;

/// One real-space field per spin channel.
pub type SpinChannels = Vec<Vec<f64>>;

impl<B: ReciprocalBasis> TermHartree<B> {
    /// δV = G ⋆ δρ_total, the Hartree kernel.
    pub fn apply_kernel(&self, delta_rho: &DensityField) -> Result<SpinChannels, HartreeError> {
        self.apply_diagonal(delta_rho, self.green.coefficients(), "kernel response")
    }

    /// Multiply by √G, the symmetric half of the kernel.
    pub fn apply_kernel_sqrt(&self, delta_rho: &DensityField) -> Result<SpinChannels, HartreeError> {
        let table = self.green.sqrt().ok_or(HartreeError::IndefiniteKernel {
            scaling_factor: self.scaling_factor(),
        })?;
        self.apply_diagonal(delta_rho, table, "kernel square root")
    }

    /// Multiply by √(1/G) on every G ≠ 0; the zero mode maps to 0.
    pub fn apply_kernel_invsqrt(&self, delta_rho: &DensityField) -> Result<SpinChannels, HartreeError> {
        let table = self.green.inverse_sqrt().ok_or(HartreeError::IndefiniteKernel {
            scaling_factor: self.scaling_factor(),
        })?;
        self.apply_diagonal(delta_rho, table, "kernel inverse square root")
    }

    fn apply_diagonal(
        &self,
        delta_rho: &DensityField,
        table: &[f64],
        what: &'static str,
    ) -> Result<SpinChannels, HartreeError> {
        let rho_fourier = self.total_density_fourier(delta_rho)?;
        if rho_fourier.len() != table.len() {
            return Err(HartreeError::ShapeMismatch {
                what,
                expected: table.len(),
                found: rho_fourier.len(),
            });
        }
        let v_fourier: Vec<Complex64> = rho_fourier
            .iter()
            .zip(table)
            .map(|(rho, g)| *rho * *g)
            .collect();
        let delta_v = self.to_real_space(&v_fourier, what)?;
        Ok(vec![delta_v; self.basis.n_spin_components()])
    }
}
