//! Dense-matrix utilities for validating the Hartree kernel on small grids.
//!
//! Nothing here is meant for production evaluation: the matrices are dense
//! in the number of grid points.

extern crate nalgebra as na;

use crate::error::HartreeError;
use crate::term_impl::TermHartree;
use basis::ReciprocalBasis;
use na::{DMatrix, SymmetricEigen};
use num_complex::Complex64;
use rayon::prelude::*;

/// Largest grid for which a dense kernel is built.
pub const MAX_MATERIALIZE_POINTS: usize = 4096;

/// Dense real-space matrix of the Hartree kernel.
///
/// Forms `Re(G2R · diag(G) · R2G)` from the basis transforms applied to unit
/// vectors. With several spin channels the result is a block matrix whose
/// blocks are all copies of the single-channel kernel, since δV depends only
/// on the total δρ.
pub fn materialize_kernel<B>(term: &TermHartree<B>) -> Result<DMatrix<f64>, HartreeError>
where
    B: ReciprocalBasis + Sync,
{
    let basis = term.basis();
    let n = basis.n_grid_points();
    if n > MAX_MATERIALIZE_POINTS {
        return Err(HartreeError::GridTooLarge {
            n_points: n,
            limit: MAX_MATERIALIZE_POINTS,
        });
    }

    let r_to_g_columns = (0..n)
        .into_par_iter()
        .map(|r| {
            let mut unit = vec![0.0; n];
            unit[r] = 1.0;
            basis.r_to_g(&unit)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let g_to_r_columns = (0..n)
        .into_par_iter()
        .map(|g| {
            let mut unit = vec![Complex64::new(0.0, 0.0); n];
            unit[g] = Complex64::new(1.0, 0.0);
            basis.g_to_r(&unit)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let green = term.green().coefficients();
    let r_to_g = DMatrix::<Complex64>::from_fn(n, n, |g, r| r_to_g_columns[r][g] * green[g]);
    let g_to_r = DMatrix::<Complex64>::from_fn(n, n, |r, g| g_to_r_columns[g][r]);
    let kernel = (g_to_r * r_to_g).map(|z| z.re);

    let n_spin = basis.n_spin_components();
    if n_spin == 1 {
        return Ok(kernel);
    }
    let mut blocks = DMatrix::<f64>::zeros(n_spin * n, n_spin * n);
    for s in 0..n_spin {
        for t in 0..n_spin {
            blocks.view_mut((s * n, t * n), (n, n)).copy_from(&kernel);
        }
    }
    Ok(blocks)
}

/// Summary of a dense kernel: how symmetric and how positive it is.
#[derive(Debug, Clone, Copy)]
pub struct KernelSpectrum {
    pub dimension: usize,
    pub symmetry_error: f64,
    pub min_eigenvalue: f64,
    pub max_eigenvalue: f64,
}

pub fn kernel_spectrum(kernel: &DMatrix<f64>) -> KernelSpectrum {
    let symmetry_error = (kernel - kernel.transpose()).amax();
    let symmetric = (kernel + kernel.transpose()) * 0.5;
    let eigen = SymmetricEigen::new(symmetric);
    KernelSpectrum {
        dimension: kernel.nrows(),
        symmetry_error,
        min_eigenvalue: eigen.eigenvalues.min(),
        max_eigenvalue: eigen.eigenvalues.max(),
    }
}
