//! Hartree term of a plane-wave DFT model
//!
//! The Hartree energy of a periodic density ρ is
//!
//! E_H = ½ ∫∫ ρ(r) ρ(r') / |r - r'| dr dr' = ½ Σ_G 4π |ρ(G)|² / |G|²
//!
//! and its potential V_H solves ΔV_H = -4πρ. In reciprocal space both are a
//! single diagonal multiplication by the Green's coefficients 4π/|G|², with
//! the G = 0 mode dropped (compensating uniform background).
//!
//! # Usage
//!
//! ```ignore
//! let basis = Arc::new(PlaneWaveBasis::new(lattice, grid, &[], SpinPolarization::None));
//! let term = TermHartree::new(Arc::clone(&basis), 1.0);
//! let output = term.evaluate(&density)?;
//! let delta_v = term.apply_kernel(&delta_rho)?;
//! ```

mod green;
mod kernel;
mod operator;
mod term;
#[cfg(test)]
mod tests;

pub use green::GreenCoefficients;
pub use kernel::SpinChannels;
pub use operator::RealSpaceMultiplication;
pub use term::{HartreeOutput, Term, TermHartree, TermOutput};
