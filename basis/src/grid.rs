//! Real-space FFT grid and the matching enumeration of reciprocal vectors.
//!
//! Both real-space points and reciprocal vectors share one flat index with
//! the first axis running fastest: `idx = i + n1 * (j + n2 * k)`.

extern crate nalgebra as na;

use crate::error::BasisError;
use crate::lattice::Lattice;
use itertools::iproduct;
use na::Vector3;
use std::f64::consts::PI;

/// Map an FFT index along one axis of length `n` to its signed frequency.
///
/// Produces `0, 1, ..., (n-1)/2, -n/2, ..., -1`.
pub fn fft_frequency(index: usize, n: usize) -> i32 {
    if index <= (n - 1) / 2 {
        index as i32
    } else {
        index as i32 - n as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FftGrid {
    size: [usize; 3],
    g_vectors: Vec<Vector3<i32>>,
}

impl FftGrid {
    pub fn new(size: [usize; 3]) -> Result<Self, BasisError> {
        if size.iter().any(|&n| n == 0) {
            return Err(BasisError::InvalidGridSize(size));
        }
        let [n1, n2, n3] = size;
        let g_vectors = iproduct!(0..n3, 0..n2, 0..n1)
            .map(|(k, j, i)| {
                Vector3::new(
                    fft_frequency(i, n1),
                    fft_frequency(j, n2),
                    fft_frequency(k, n3),
                )
            })
            .collect();
        Ok(FftGrid { size, g_vectors })
    }

    /// Grid large enough to represent densities built from orbitals with
    /// kinetic-energy cutoff `ecut` (Hartree). `supersampling = 2` resolves
    /// products of two orbitals exactly.
    pub fn from_ecut(lattice: &Lattice, ecut: f64, supersampling: f64) -> Result<Self, BasisError> {
        if !(ecut > 0.0 && supersampling > 0.0) {
            return Err(BasisError::InvalidCutoff {
                ecut,
                supersampling,
            });
        }
        let g_max = supersampling * (2.0 * ecut).sqrt();
        let mut size = [0usize; 3];
        for (i, n) in size.iter_mut().enumerate() {
            let a_norm = lattice.vectors().column(i).norm();
            let g_max_i = (g_max * a_norm / (2.0 * PI)).ceil() as usize;
            *n = 2 * g_max_i + 1;
        }
        Self::new(size)
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    pub fn len(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.g_vectors.is_empty()
    }

    /// Integer reciprocal multi-indices in flat grid order.
    pub fn g_vectors(&self) -> &[Vector3<i32>] {
        &self.g_vectors
    }

    /// Split a flat index into its three axis indices.
    pub fn unflatten(&self, idx: usize) -> [usize; 3] {
        let [n1, n2, _] = self.size;
        [idx % n1, (idx / n1) % n2, idx / (n1 * n2)]
    }

    pub fn flatten(&self, index: [usize; 3]) -> usize {
        let [n1, n2, _] = self.size;
        index[0] + n1 * (index[1] + n2 * index[2])
    }

    /// Flat index of an integer reciprocal vector, if it lies on the grid.
    pub fn index_of_g(&self, g: &Vector3<i32>) -> Option<usize> {
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let n = self.size[axis] as i32;
            let wrapped = g[axis].rem_euclid(n) as usize;
            if fft_frequency(wrapped, self.size[axis]) != g[axis] {
                return None;
            }
            index[axis] = wrapped;
        }
        Some(self.flatten(index))
    }

    /// Flat index holding -G for the vector at `idx`, wrapped modulo the grid.
    ///
    /// For an unpaired Nyquist frequency on an even axis the partner is the
    /// point itself along that axis.
    pub fn conjugate_index(&self, idx: usize) -> usize {
        let index = self.unflatten(idx);
        let mut partner = [0usize; 3];
        for axis in 0..3 {
            let n = self.size[axis];
            partner[axis] = (n - index[axis]) % n;
        }
        self.flatten(partner)
    }

    /// Fractional coordinates of real-space grid point `idx`.
    pub fn r_fractional(&self, idx: usize) -> Vector3<f64> {
        let index = self.unflatten(idx);
        Vector3::new(
            index[0] as f64 / self.size[0] as f64,
            index[1] as f64 / self.size[1] as f64,
            index[2] as f64 / self.size[2] as f64,
        )
    }
}
