//! Densities on the FFT grid, in either real-space or reciprocal representation.

extern crate nalgebra as na;

use crate::basis::ReciprocalBasis;
use crate::error::BasisError;
use na::Vector3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// A scalar density, possibly resolved into spin channels.
///
/// Either one channel (the total density) or one channel per spin component
/// of the basis. The Hartree energy only sees the sum over channels.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityField {
    Real { channels: Vec<Vec<f64>> },
    Fourier { channels: Vec<Vec<Complex64>> },
}

/// Normalized periodic Gaussian charge, center in fractional coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianCharge {
    pub center: [f64; 3],
    pub charge: f64,
    pub width: f64,
    /// Channel receiving the charge; split evenly over all channels when absent.
    #[serde(default)]
    pub spin: Option<usize>,
}

impl DensityField {
    pub fn from_real(channels: Vec<Vec<f64>>) -> Self {
        DensityField::Real { channels }
    }

    pub fn from_fourier(channels: Vec<Vec<Complex64>>) -> Self {
        DensityField::Fourier { channels }
    }

    pub fn zeros<B: ReciprocalBasis>(basis: &B) -> Self {
        DensityField::Real {
            channels: vec![vec![0.0; basis.n_grid_points()]; basis.n_spin_components()],
        }
    }

    pub fn n_channels(&self) -> usize {
        match self {
            DensityField::Real { channels } => channels.len(),
            DensityField::Fourier { channels } => channels.len(),
        }
    }

    /// Check channel count and per-channel length against `basis`.
    pub fn validate<B: ReciprocalBasis>(&self, basis: &B) -> Result<(), BasisError> {
        let n_spin = basis.n_spin_components();
        let n_channels = self.n_channels();
        if n_channels != 1 && n_channels != n_spin {
            return Err(BasisError::ShapeMismatch {
                what: "density spin channels",
                expected: n_spin,
                found: n_channels,
            });
        }
        let expected = basis.n_grid_points();
        let lengths: Vec<usize> = match self {
            DensityField::Real { channels } => channels.iter().map(Vec::len).collect(),
            DensityField::Fourier { channels } => channels.iter().map(Vec::len).collect(),
        };
        if let Some(&found) = lengths.iter().find(|&&len| len != expected) {
            return Err(BasisError::ShapeMismatch {
                what: "density grid",
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Reciprocal coefficients of the density summed over spin channels.
    pub fn total_fourier<B: ReciprocalBasis>(&self, basis: &B) -> Result<Vec<Complex64>, BasisError> {
        self.validate(basis)?;
        match self {
            DensityField::Real { channels } => basis.r_to_g(&sum_channels(channels, 0.0)),
            DensityField::Fourier { channels } => Ok(sum_channels(channels, Complex64::new(0.0, 0.0))),
        }
    }

    /// Real-space density summed over spin channels.
    ///
    /// Reciprocal channels are transformed back and must describe a real
    /// field: an imaginary part above `√ε · max(1, ‖ρ‖∞)` is an error.
    pub fn total_real<B: ReciprocalBasis>(&self, basis: &B) -> Result<Vec<f64>, BasisError> {
        self.validate(basis)?;
        match self {
            DensityField::Real { channels } => Ok(sum_channels(channels, 0.0)),
            DensityField::Fourier { channels } => {
                let field = basis.g_to_r(&sum_channels(channels, Complex64::new(0.0, 0.0)))?;
                let scale = field.iter().map(|z| z.norm()).fold(0.0, f64::max);
                let residue = max_imaginary(&field);
                let tolerance = f64::EPSILON.sqrt() * scale.max(1.0);
                if residue > tolerance {
                    warn!("density: imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}");
                    return Err(BasisError::NumericalAnomaly {
                        what: "density",
                        residue,
                        tolerance,
                    });
                }
                Ok(field.iter().map(|z| z.re).collect())
            }
        }
    }

    /// Integrated charge ∫ρ over the unit cell, summed over channels.
    pub fn total_charge<B: ReciprocalBasis>(&self, basis: &B) -> Result<f64, BasisError> {
        let fourier = self.total_fourier(basis)?;
        let zero = basis
            .g_vectors()
            .iter()
            .position(|g| *g == Vector3::zeros());
        Ok(zero.map_or(0.0, |idx| fourier[idx].re * basis.unit_cell_volume().sqrt()))
    }

    /// Sum of periodic Gaussian charges, sampled in real space.
    pub fn gaussians<B: ReciprocalBasis>(basis: &B, charges: &[GaussianCharge]) -> Result<Self, BasisError> {
        let n_spin = basis.n_spin_components();
        let sqrt_volume = basis.unit_cell_volume().sqrt();
        let reciprocal = basis.reciprocal_lattice();
        let mut coefficients = vec![vec![Complex64::new(0.0, 0.0); basis.n_grid_points()]; n_spin];

        for gaussian in charges {
            let weights: Vec<f64> = match gaussian.spin {
                Some(channel) if channel >= n_spin => {
                    return Err(BasisError::InvalidSpinChannel { channel, n_spin });
                }
                Some(channel) => (0..n_spin)
                    .map(|s| if s == channel { 1.0 } else { 0.0 })
                    .collect(),
                None => vec![1.0 / n_spin as f64; n_spin],
            };
            let center = Vector3::from(gaussian.center);
            let sigma_sq = gaussian.width * gaussian.width;

            for (idx, g) in basis.g_vectors().iter().enumerate() {
                let g_cart = reciprocal * g.map(|x| x as f64);
                let envelope = gaussian.charge / sqrt_volume * (-0.5 * sigma_sq * g_cart.norm_squared()).exp();
                let phase = -2.0 * PI * g.map(|x| x as f64).dot(&center);
                let value = Complex64::from_polar(envelope, phase);
                for (channel, weight) in coefficients.iter_mut().zip(&weights) {
                    channel[idx] += value * *weight;
                }
            }
        }

        // Keep only the real part: on even grids the unpaired Nyquist modes
        // leave an imaginary residue.
        let mut channels = Vec::with_capacity(n_spin);
        for (spin, c) in coefficients.iter().enumerate() {
            let field = basis.g_to_r(c)?;
            debug!(
                "Gaussian density channel {}: discarding imaginary residue {:.3e}",
                spin,
                max_imaginary(&field)
            );
            channels.push(field.iter().map(|z| z.re).collect::<Vec<f64>>());
        }
        Ok(DensityField::Real { channels })
    }

    /// Real cosine density mode with reciprocal norm |amplitude|, a single channel.
    ///
    /// The coefficient `amplitude / √2` sits at `g` and at its conjugate
    /// partner, `-g` wrapped onto the grid. When `g` is its own partner (Γ or
    /// a pure Nyquist frequency) the full amplitude sits at `g`.
    pub fn plane_wave<B: ReciprocalBasis>(basis: &B, g: Vector3<i32>, amplitude: f64) -> Result<Self, BasisError> {
        let plus = basis
            .g_vectors()
            .iter()
            .position(|x| *x == g)
            .ok_or(BasisError::GVectorOutOfGrid([g.x, g.y, g.z]))?;
        let partner = basis.conjugate_indices()[plus];

        let mut coefficients = vec![Complex64::new(0.0, 0.0); basis.n_grid_points()];
        if partner == plus {
            coefficients[plus] = Complex64::new(amplitude, 0.0);
        } else {
            let half = amplitude / 2f64.sqrt();
            coefficients[plus] = Complex64::new(half, 0.0);
            coefficients[partner] = Complex64::new(half, 0.0);
        }
        Ok(DensityField::Fourier {
            channels: vec![coefficients],
        })
    }
}

fn sum_channels<T: Copy + std::ops::AddAssign>(channels: &[Vec<T>], zero: T) -> Vec<T> {
    let n = channels.first().map_or(0, Vec::len);
    let mut total = vec![zero; n];
    for channel in channels {
        total.iter_mut().zip(channel).for_each(|(t, &x)| *t += x);
    }
    total
}

fn max_imaginary(field: &[Complex64]) -> f64 {
    field.iter().map(|z| z.im.abs()).fold(0.0, f64::max)
}

/// Real-space inner product ⟨a, b⟩ = Σ_r a(r) b(r) dV.
pub fn dot_real(a: &[f64], b: &[f64], volume_element: f64) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>() * volume_element
}
