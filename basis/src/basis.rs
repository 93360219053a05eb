extern crate nalgebra as na;

use crate::error::BasisError;
use crate::grid::FftGrid;
use crate::lattice::Lattice;
use crate::transform::GridTransform;
use na::{Matrix3, Vector3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Interface a reciprocal-space term needs from its basis.
///
/// Implementors guarantee that `g_vectors()`, the output of `r_to_g` and the
/// input of `g_to_r` share one index ordering.
pub trait ReciprocalBasis {
    fn reciprocal_lattice(&self) -> &Matrix3<f64>;
    fn g_vectors(&self) -> &[Vector3<i32>];
    fn unit_cell_volume(&self) -> f64;
    fn n_spin_components(&self) -> usize;
    fn kpoints(&self) -> &[Kpoint];
    fn r_to_g(&self, f_real: &[f64]) -> Result<Vec<Complex64>, BasisError>;
    fn g_to_r(&self, f_fourier: &[Complex64]) -> Result<Vec<Complex64>, BasisError>;

    /// For every index, the index holding -G (wrapped modulo the grid).
    /// Coefficients of a real field satisfy f̂[conj[i]] = conj(f̂[i]).
    fn conjugate_indices(&self) -> Vec<usize>;

    fn n_grid_points(&self) -> usize {
        self.g_vectors().len()
    }

    /// Volume per real-space grid point, the weight of a Riemann sum over the cell.
    fn volume_element(&self) -> f64 {
        self.unit_cell_volume() / self.n_grid_points() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinPolarization {
    #[default]
    None,
    Collinear,
}

impl SpinPolarization {
    pub fn n_components(&self) -> usize {
        match self {
            SpinPolarization::None => 1,
            SpinPolarization::Collinear => 2,
        }
    }
}

/// A Bloch wave vector (fractional reciprocal coordinates) for one spin channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpoint {
    pub coordinate: Vector3<f64>,
    pub spin: usize,
}

#[derive(Debug, Clone)]
pub struct PlaneWaveBasis {
    lattice: Lattice,
    transform: GridTransform,
    kpoints: Vec<Kpoint>,
    spin: SpinPolarization,
}

impl PlaneWaveBasis {
    /// Build a basis on `grid`. Each k-point is repeated once per spin
    /// channel, spin-major; an empty list means Γ only.
    pub fn new(
        lattice: Lattice,
        grid: FftGrid,
        kcoords: &[Vector3<f64>],
        spin: SpinPolarization,
    ) -> Self {
        let kcoords = if kcoords.is_empty() {
            vec![Vector3::zeros()]
        } else {
            kcoords.to_vec()
        };
        let kpoints = (0..spin.n_components())
            .flat_map(|s| {
                kcoords.iter().map(move |&coordinate| Kpoint {
                    coordinate,
                    spin: s,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            "Plane-wave basis: fft size {:?}, {} k-points, {} spin component(s)",
            grid.size(),
            kpoints.len(),
            spin.n_components()
        );

        let transform = GridTransform::new(grid, lattice.volume());
        PlaneWaveBasis {
            lattice,
            transform,
            kpoints,
            spin,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn grid(&self) -> &FftGrid {
        self.transform.grid()
    }

    pub fn spin_polarization(&self) -> SpinPolarization {
        self.spin
    }
}

impl ReciprocalBasis for PlaneWaveBasis {
    fn reciprocal_lattice(&self) -> &Matrix3<f64> {
        self.lattice.reciprocal()
    }

    fn g_vectors(&self) -> &[Vector3<i32>] {
        self.transform.grid().g_vectors()
    }

    fn unit_cell_volume(&self) -> f64 {
        self.lattice.volume()
    }

    fn n_spin_components(&self) -> usize {
        self.spin.n_components()
    }

    fn kpoints(&self) -> &[Kpoint] {
        &self.kpoints
    }

    fn r_to_g(&self, f_real: &[f64]) -> Result<Vec<Complex64>, BasisError> {
        self.transform.r_to_g(f_real)
    }

    fn g_to_r(&self, f_fourier: &[Complex64]) -> Result<Vec<Complex64>, BasisError> {
        self.transform.g_to_r(f_fourier)
    }

    fn conjugate_indices(&self) -> Vec<usize> {
        let grid = self.transform.grid();
        (0..grid.len()).map(|idx| grid.conjugate_index(idx)).collect()
    }
}
