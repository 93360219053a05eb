//! Discrete Fourier transforms between the real-space grid and reciprocal
//! coefficients.
//!
//! Normalization: `r_to_g` maps f(r) to f̂(G) = (√Ω / N) Σ_r f(r) e^{-iG·r}
//! and `g_to_r` maps back with f(r) = (1/√Ω) Σ_G f̂(G) e^{iG·r}. With this
//! choice Σ_G conj(f̂_G) ĝ_G = ∫_Ω f g dr.

use crate::error::BasisError;
use crate::grid::FftGrid;
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Separable DFT over a 3D grid, one precomputed twiddle table per axis.
#[derive(Debug, Clone)]
pub struct GridTransform {
    grid: FftGrid,
    // twiddles[axis][j * n + k] = exp(-2πi j k / n)
    twiddles: [Vec<Complex64>; 3],
    unit_cell_volume: f64,
}

impl GridTransform {
    pub fn new(grid: FftGrid, unit_cell_volume: f64) -> Self {
        let size = grid.size();
        let twiddles = [
            twiddle_table(size[0]),
            twiddle_table(size[1]),
            twiddle_table(size[2]),
        ];
        GridTransform {
            grid,
            twiddles,
            unit_cell_volume,
        }
    }

    pub fn grid(&self) -> &FftGrid {
        &self.grid
    }

    pub fn r_to_g(&self, f_real: &[f64]) -> Result<Vec<Complex64>, BasisError> {
        self.check_len("real-space field", f_real.len())?;
        let data: Vec<Complex64> = f_real.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        let n = self.grid.len() as f64;
        let scale = self.unit_cell_volume.sqrt() / n;
        let mut out = self.transform(data, Direction::Forward);
        out.iter_mut().for_each(|z| *z *= scale);
        Ok(out)
    }

    pub fn g_to_r(&self, f_fourier: &[Complex64]) -> Result<Vec<Complex64>, BasisError> {
        self.check_len("reciprocal coefficients", f_fourier.len())?;
        let scale = 1.0 / self.unit_cell_volume.sqrt();
        let mut out = self.transform(f_fourier.to_vec(), Direction::Inverse);
        out.iter_mut().for_each(|z| *z *= scale);
        Ok(out)
    }

    fn check_len(&self, what: &'static str, found: usize) -> Result<(), BasisError> {
        let expected = self.grid.len();
        if found != expected {
            return Err(BasisError::ShapeMismatch {
                what,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Unnormalized transform, applied one axis at a time.
    fn transform(&self, mut data: Vec<Complex64>, direction: Direction) -> Vec<Complex64> {
        for axis in 0..3 {
            data = self.transform_axis(&data, axis, direction);
        }
        data
    }

    fn transform_axis(&self, data: &[Complex64], axis: usize, direction: Direction) -> Vec<Complex64> {
        let n = self.grid.size()[axis];
        if n == 1 {
            return data.to_vec();
        }
        let table = &self.twiddles[axis];
        let grid = &self.grid;

        (0..data.len())
            .into_par_iter()
            .map(|idx| {
                let mut index = grid.unflatten(idx);
                let j = index[axis];
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..n {
                    index[axis] = k;
                    let w = table[j * n + k];
                    let w = match direction {
                        Direction::Forward => w,
                        Direction::Inverse => w.conj(),
                    };
                    acc += w * data[grid.flatten(index)];
                }
                acc
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

fn twiddle_table(n: usize) -> Vec<Complex64> {
    let mut table = Vec::with_capacity(n * n);
    for j in 0..n {
        for k in 0..n {
            // reduce j*k mod n first to keep the phase argument small
            let phase = -2.0 * PI * ((j * k) % n) as f64 / n as f64;
            table.push(Complex64::from_polar(1.0, phase));
        }
    }
    table
}
