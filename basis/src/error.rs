//! Error type shared by the plane-wave basis and its transforms.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BasisError {
    /// The lattice matrix has no inverse, so there is no reciprocal lattice.
    #[error("Lattice vectors are linearly dependent (determinant {determinant:.3e})")]
    SingularLattice { determinant: f64 },

    #[error("Invalid FFT grid size {0:?}: every dimension must be at least 1")]
    InvalidGridSize([usize; 3]),

    #[error("Invalid cutoff: ecut = {ecut}, supersampling = {supersampling} (both must be positive)")]
    InvalidCutoff { ecut: f64, supersampling: f64 },

    /// A field does not live on this basis' grid, or carries the wrong number of spin channels.
    #[error("Shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Spin channel {channel} does not exist in a basis with {n_spin} spin component(s)")]
    InvalidSpinChannel { channel: usize, n_spin: usize },

    /// A field expected to be real carries a non-negligible imaginary part.
    #[error("Numerical anomaly in {what}: imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}")]
    NumericalAnomaly {
        what: &'static str,
        residue: f64,
        tolerance: f64,
    },

    #[error("Reciprocal vector {0:?} is not on the FFT grid")]
    GVectorOutOfGrid([i32; 3]),
}
