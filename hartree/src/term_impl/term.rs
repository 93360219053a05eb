use super::green::GreenCoefficients;
use super::operator::RealSpaceMultiplication;
use crate::error::HartreeError;
use basis::{DensityField, ReciprocalBasis};
use num_complex::Complex64;
use std::sync::Arc;
use tracing::{debug, warn};

/// Energy and per-k-point operators produced by one energy term.
#[derive(Debug, Clone)]
pub struct TermOutput {
    pub energy: f64,
    pub operators: Vec<RealSpaceMultiplication>,
}

/// A contribution to the Kohn-Sham energy functional.
pub trait Term {
    fn name(&self) -> &str;
    fn energy_and_operators(&self, density: &DensityField) -> Result<TermOutput, HartreeError>;
}

/// Result of [`TermHartree::evaluate`].
#[derive(Debug, Clone)]
pub struct HartreeOutput {
    pub energy: f64,
    /// Real-space Hartree potential, shared by every operator.
    pub potential: Arc<[f64]>,
    /// Reciprocal coefficients G(G)·ρ(G) of the potential.
    pub potential_fourier: Vec<Complex64>,
    pub operators: Vec<RealSpaceMultiplication>,
}

/// Hartree (classical electrostatic) term of a plane-wave basis.
///
/// Holds the Green's coefficients for one basis and scaling factor and is
/// a stateless evaluator afterwards: every method takes `&self`.
#[derive(Debug)]
pub struct TermHartree<B: ReciprocalBasis> {
    pub(crate) basis: Arc<B>,
    pub(crate) green: GreenCoefficients,
    pub(crate) conjugates: Vec<usize>,
}

impl<B: ReciprocalBasis> TermHartree<B> {
    pub fn new(basis: Arc<B>, scaling_factor: f64) -> Self {
        let green = GreenCoefficients::build(basis.as_ref(), scaling_factor);
        let conjugates = basis.conjugate_indices();
        TermHartree {
            basis,
            green,
            conjugates,
        }
    }

    pub fn with_unit_scaling(basis: Arc<B>) -> Self {
        Self::new(basis, 1.0)
    }

    pub fn basis(&self) -> &B {
        &self.basis
    }

    pub fn green(&self) -> &GreenCoefficients {
        &self.green
    }

    pub fn scaling_factor(&self) -> f64 {
        self.green.scaling_factor()
    }

    /// Hartree energy ½⟨V, ρ⟩ and the potential as a real-space operator
    /// for every k-point of the basis.
    pub fn evaluate(&self, density: &DensityField) -> Result<HartreeOutput, HartreeError> {
        let rho_fourier = self.total_density_fourier(density)?;
        let potential_fourier: Vec<Complex64> = rho_fourier
            .iter()
            .zip(self.green.coefficients())
            .map(|(rho, g)| *rho * *g)
            .collect();

        let overlap: Complex64 = potential_fourier
            .iter()
            .zip(&rho_fourier)
            .map(|(v, rho)| v.conj() * *rho)
            .sum();
        let energy = check_real_scalar(overlap / 2.0, "Hartree energy")?;

        let potential: Arc<[f64]> = self.to_real_space(&potential_fourier, "Hartree potential")?.into();
        let operators = self
            .basis
            .kpoints()
            .iter()
            .map(|kpoint| RealSpaceMultiplication::new(*kpoint, Arc::clone(&potential)))
            .collect();

        debug!("Hartree energy {:.12} (scaling factor {})", energy, self.scaling_factor());

        Ok(HartreeOutput {
            energy,
            potential,
            potential_fourier,
            operators,
        })
    }

    /// Total density in reciprocal space, rejecting coefficients that do not
    /// describe a real field.
    pub(crate) fn total_density_fourier(&self, density: &DensityField) -> Result<Vec<Complex64>, HartreeError> {
        let rho_fourier = density.total_fourier(self.basis.as_ref())?;
        if rho_fourier.len() != self.green.len() {
            return Err(HartreeError::ShapeMismatch {
                what: "density coefficients",
                expected: self.green.len(),
                found: rho_fourier.len(),
            });
        }
        if let DensityField::Fourier { .. } = density {
            let scale = max_abs(&rho_fourier);
            let defect = rho_fourier
                .iter()
                .enumerate()
                .map(|(idx, rho)| (*rho - rho_fourier[self.conjugates[idx]].conj()).norm() / 2.0)
                .fold(0.0, f64::max);
            check_residue(defect, scale, "density coefficients")?;
        }
        Ok(rho_fourier)
    }

    /// Inverse transform of coefficients that should describe a real field.
    ///
    /// The coefficients are projected on their Hermitian part first: on even
    /// grids an unpaired Nyquist mode breaks the ±G pairing of the multiplier,
    /// and that residue is discarded here rather than treated as an error.
    pub(crate) fn to_real_space(&self, f_fourier: &[Complex64], what: &'static str) -> Result<Vec<f64>, HartreeError> {
        let hermitian: Vec<Complex64> = f_fourier
            .iter()
            .enumerate()
            .map(|(idx, f)| (*f + f_fourier[self.conjugates[idx]].conj()) / 2.0)
            .collect();
        let f_real = self.basis.g_to_r(&hermitian)?;

        let scale = max_abs(&f_real);
        let residue = f_real.iter().map(|z| z.im.abs()).fold(0.0, f64::max);
        check_residue(residue, scale, what)?;
        Ok(f_real.iter().map(|z| z.re).collect())
    }
}

impl<B: ReciprocalBasis> Term for TermHartree<B> {
    fn name(&self) -> &str {
        "Hartree"
    }

    fn energy_and_operators(&self, density: &DensityField) -> Result<TermOutput, HartreeError> {
        let output = self.evaluate(density)?;
        Ok(TermOutput {
            energy: output.energy,
            operators: output.operators,
        })
    }
}

pub(crate) fn imaginary_tolerance(scale: f64) -> f64 {
    f64::EPSILON.sqrt() * scale.max(1.0)
}

fn check_residue(residue: f64, scale: f64, what: &'static str) -> Result<(), HartreeError> {
    let tolerance = imaginary_tolerance(scale);
    if residue > tolerance {
        warn!("{what}: imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}");
        return Err(HartreeError::NumericalAnomaly {
            what,
            residue,
            tolerance,
        });
    }
    Ok(())
}

fn check_real_scalar(value: Complex64, what: &'static str) -> Result<f64, HartreeError> {
    check_residue(value.im.abs(), value.re.abs(), what)?;
    Ok(value.re)
}

fn max_abs(values: &[Complex64]) -> f64 {
    values.iter().map(|z| z.norm()).fold(0.0, f64::max)
}
