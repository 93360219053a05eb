//! Errors raised by the Hartree term.

use basis::BasisError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HartreeError {
    /// A field does not match the grid of the precomputed coefficient tables.
    /// This is a caller bug and is never recovered from.
    #[error("Shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Imaginary residue beyond tolerance where a real quantity was expected.
    #[error("Numerical anomaly in {what}: imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}")]
    NumericalAnomaly {
        what: &'static str,
        residue: f64,
        tolerance: f64,
    },

    /// Square roots of the kernel only exist when it is positive-semidefinite.
    #[error("Kernel square root requested with negative scaling factor {scaling_factor}")]
    IndefiniteKernel { scaling_factor: f64 },

    #[error("Refusing to materialize a dense kernel over {n_points} grid points (limit {limit})")]
    GridTooLarge { n_points: usize, limit: usize },

    #[error(transparent)]
    Basis(BasisError),
}

impl From<BasisError> for HartreeError {
    fn from(err: BasisError) -> Self {
        match err {
            BasisError::ShapeMismatch {
                what,
                expected,
                found,
            } => HartreeError::ShapeMismatch {
                what,
                expected,
                found,
            },
            BasisError::NumericalAnomaly {
                what,
                residue,
                tolerance,
            } => HartreeError::NumericalAnomaly {
                what,
                residue,
                tolerance,
            },
            other => HartreeError::Basis(other),
        }
    }
}
