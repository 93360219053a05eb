//! Plane-wave basis on a periodic cell: lattice geometry, FFT grid,
//! real/reciprocal transforms and density representations.

pub mod basis;
pub mod density;
pub mod error;
pub mod grid;
pub mod lattice;
pub mod transform;


pub use crate::basis::{Kpoint, PlaneWaveBasis, ReciprocalBasis, SpinPolarization};
pub use crate::density::{dot_real, DensityField, GaussianCharge};
pub use crate::error::BasisError;
pub use crate::grid::{fft_frequency, FftGrid};
pub use crate::lattice::Lattice;
pub use crate::transform::GridTransform;
