extern crate nalgebra as na;

use crate::error::BasisError;
use na::{Matrix3, Vector3};
use std::f64::consts::PI;

/// Real-space lattice of a periodic cell together with its reciprocal lattice.
///
/// The columns of `vectors` are the lattice vectors a_1, a_2, a_3 (bohr).
/// The reciprocal lattice satisfies a_i · b_j = 2π δ_ij.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    vectors: Matrix3<f64>,
    reciprocal: Matrix3<f64>,
    volume: f64,
}

impl Lattice {
    pub fn new(vectors: Matrix3<f64>) -> Result<Self, BasisError> {
        let determinant = vectors.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(BasisError::SingularLattice { determinant });
        }
        let inverse = vectors
            .try_inverse()
            .ok_or(BasisError::SingularLattice { determinant })?;

        Ok(Lattice {
            vectors,
            reciprocal: 2.0 * PI * inverse.transpose(),
            volume: determinant.abs(),
        })
    }

    /// Build from row-major input where each row is one lattice vector.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self, BasisError> {
        let columns = Matrix3::from_columns(&[
            Vector3::from(rows[0]),
            Vector3::from(rows[1]),
            Vector3::from(rows[2]),
        ]);
        Self::new(columns)
    }

    /// Simple cubic cell with edge length `a`.
    pub fn cubic(a: f64) -> Result<Self, BasisError> {
        Self::new(Matrix3::from_diagonal_element(a))
    }

    pub fn vectors(&self) -> &Matrix3<f64> {
        &self.vectors
    }

    pub fn reciprocal(&self) -> &Matrix3<f64> {
        &self.reciprocal
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Cartesian reciprocal vector B·G for an integer multi-index G.
    pub fn cartesian_g(&self, g: &Vector3<i32>) -> Vector3<f64> {
        self.reciprocal * g.map(|x| x as f64)
    }

    /// Cartesian position A·x for fractional coordinates x.
    pub fn cartesian_r(&self, fractional: &Vector3<f64>) -> Vector3<f64> {
        self.vectors * fractional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reciprocal_duality() {
        let lattice = Lattice::from_rows([[4.0, 0.0, 0.0], [1.0, 5.0, 0.0], [0.5, 0.3, 6.0]]).unwrap();
        let product = lattice.vectors().transpose() * lattice.reciprocal();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 2.0 * PI } else { 0.0 };
                assert_relative_eq!(product[(i, j)], expected, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(lattice.volume(), 120.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_lattice_is_rejected() {
        let result = Lattice::from_rows([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(matches!(result, Err(BasisError::SingularLattice { .. })));
    }

    #[test]
    fn test_cubic_cartesian_g() {
        let lattice = Lattice::cubic(2.0 * PI).unwrap();
        let g = lattice.cartesian_g(&Vector3::new(1, -2, 3));
        assert_relative_eq!(g.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(g.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(g.z, 3.0, epsilon = 1e-12);
    }
}
