use color_eyre::eyre::{Result, WrapErr};
use basis::{DensityField, PlaneWaveBasis, ReciprocalBasis};
use hartree::config::Config;
use hartree::debug::{kernel_spectrum, materialize_kernel, KernelSpectrum};
use hartree::{HartreeOutput, TermHartree};
use std::sync::Arc;
use tracing::info;

pub struct Evaluation {
    pub term: TermHartree<PlaneWaveBasis>,
    pub density: DensityField,
    pub output: HartreeOutput,
    pub total_charge: f64,
}

impl Evaluation {
    pub fn basis(&self) -> &PlaneWaveBasis {
        self.term.basis()
    }

    pub fn n_grid_points(&self) -> usize {
        self.basis().n_grid_points()
    }
}

pub fn run_evaluation(config: &Config) -> Result<Evaluation> {
    let basis = Arc::new(config.build_basis().wrap_err("Failed to build plane-wave basis")?);
    info!(
        "FFT grid {:?} ({} points), cell volume {:.6} bohr^3",
        basis.grid().size(),
        basis.n_grid_points(),
        basis.unit_cell_volume()
    );

    let density = config
        .build_density(&basis)
        .wrap_err("Failed to build density")?;
    let total_charge = density.total_charge(basis.as_ref())?;

    let term = TermHartree::new(Arc::clone(&basis), config.scaling_factor());
    let output = term
        .evaluate(&density)
        .wrap_err("Hartree evaluation failed")?;

    Ok(Evaluation {
        term,
        density,
        output,
        total_charge,
    })
}

/// Dense kernel spectrum, or `None` when the grid exceeds `max_grid_points`.
pub fn run_kernel_check(evaluation: &Evaluation, max_grid_points: usize) -> Result<Option<KernelSpectrum>> {
    if evaluation.n_grid_points() > max_grid_points {
        return Ok(None);
    }
    info!("Materializing dense Hartree kernel for validation");
    let kernel = materialize_kernel(&evaluation.term).wrap_err("Kernel materialization failed")?;
    Ok(Some(kernel_spectrum(&kernel)))
}
