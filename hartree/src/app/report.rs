use super::runner::Evaluation;
use crate::io::print_potential_profile;
use hartree::debug::KernelSpectrum;
use tracing::{info, warn};

pub fn report_evaluation(evaluation: &Evaluation) {
    let output = &evaluation.output;
    let potential = &output.potential;
    let (v_min, v_max) = potential
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let v_mean = potential.iter().sum::<f64>() / potential.len() as f64;

    info!("\nHartree evaluation finished.");
    info!("  Density channels:   {}", evaluation.density.n_channels());
    info!("  Total charge:       {:.10} e", evaluation.total_charge);
    info!("  Scaling factor:     {}", evaluation.term.scaling_factor());
    info!("  Potential range:    [{:+.8}, {:+.8}] Ha", v_min, v_max);
    info!("  Potential mean:     {:+.3e} Ha", v_mean);
    info!("  k-point operators:  {}", output.operators.len());
    for (idx, op) in output.operators.iter().enumerate() {
        let k = op.kpoint();
        info!(
            "    {:>3}: k = [{:+.4}, {:+.4}, {:+.4}] spin {}",
            idx + 1,
            k.coordinate.x,
            k.coordinate.y,
            k.coordinate.z,
            k.spin
        );
    }

    let mut profile = Vec::new();
    if print_potential_profile(&mut profile, potential, evaluation.basis().grid().size()).is_ok() {
        info!("\n{}", String::from_utf8_lossy(&profile));
    }

    info!("\nHartree energy: {:.12} Ha", output.energy);
}

pub fn report_kernel_spectrum(spectrum: &KernelSpectrum) {
    info!("\nDense kernel check ({} x {}):", spectrum.dimension, spectrum.dimension);
    info!("  Max asymmetry:      {:.3e}", spectrum.symmetry_error);
    info!("  Smallest eigenvalue: {:+.6e}", spectrum.min_eigenvalue);
    info!("  Largest eigenvalue:  {:+.6e}", spectrum.max_eigenvalue);
    if spectrum.min_eigenvalue < -1e-8 * spectrum.max_eigenvalue.abs().max(1.0) {
        warn!("Kernel is not positive-semidefinite");
    }
}
