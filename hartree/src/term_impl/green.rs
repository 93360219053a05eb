//! Reciprocal-space Green's function of the periodic Poisson equation.

use basis::ReciprocalBasis;
use nalgebra::Vector3;
use std::f64::consts::PI;
use tracing::debug;

/// Diagonal multiplier solving ΔV = -4πρ in reciprocal space.
///
/// `coefficients[G] = scaling_factor * 4π / |B·G|²` for G ≠ 0 and exactly 0 at
/// G = 0 (neutralizing background). `inverse` is the elementwise reciprocal
/// with the zero entry kept at 0. Both are fixed at construction.
#[derive(Debug, Clone)]
pub struct GreenCoefficients {
    scaling_factor: f64,
    coefficients: Vec<f64>,
    inverse: Vec<f64>,
    sqrt: Option<Vec<f64>>,
    inverse_sqrt: Option<Vec<f64>>,
    zero_index: Option<usize>,
}

impl GreenCoefficients {
    pub fn build<B: ReciprocalBasis>(basis: &B, scaling_factor: f64) -> Self {
        let reciprocal = basis.reciprocal_lattice();
        let coefficients: Vec<f64> = basis
            .g_vectors()
            .iter()
            .map(|g| {
                if *g == Vector3::zeros() {
                    0.0
                } else {
                    let g_cart = reciprocal * g.map(|x| x as f64);
                    scaling_factor * 4.0 * PI / g_cart.norm_squared()
                }
            })
            .collect();
        let zero_index = basis.g_vectors().iter().position(|g| *g == Vector3::zeros());

        let inverse: Vec<f64> = coefficients
            .iter()
            .map(|&x| if x == 0.0 { 0.0 } else { 1.0 / x })
            .collect();

        let (sqrt, inverse_sqrt) = if scaling_factor >= 0.0 {
            (
                Some(coefficients.iter().map(|x| x.sqrt()).collect()),
                Some(inverse.iter().map(|x| x.sqrt()).collect()),
            )
        } else {
            (None, None)
        };

        debug!(
            "Built Hartree Green's coefficients: {} entries, scaling factor {}, zero vector at {:?}",
            coefficients.len(),
            scaling_factor,
            zero_index
        );

        GreenCoefficients {
            scaling_factor,
            coefficients,
            inverse,
            sqrt,
            inverse_sqrt,
            zero_index,
        }
    }

    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn inverse(&self) -> &[f64] {
        &self.inverse
    }

    /// Elementwise square root; `None` when the scaling factor is negative.
    pub fn sqrt(&self) -> Option<&[f64]> {
        self.sqrt.as_deref()
    }

    /// Elementwise square root of `inverse`; `None` when the scaling factor is negative.
    pub fn inverse_sqrt(&self) -> Option<&[f64]> {
        self.inverse_sqrt.as_deref()
    }

    /// Position of the zero reciprocal vector, if the grid contains it.
    pub fn zero_index(&self) -> Option<usize> {
        self.zero_index
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}
