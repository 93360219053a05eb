//! Configuration management for Hartree evaluations
//!
//! Handles the YAML input describing the cell, the FFT grid, the density
//! and the term parameters, with defaults for everything but the lattice.

mod args;

pub use args::Args;

use basis::{BasisError, DensityField, FftGrid, GaussianCharge, Lattice, PlaneWaveBasis, SpinPolarization};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Rows are the lattice vectors, in bohr.
    pub lattice: [[f64; 3]; 3],
    #[serde(default)]
    pub grid: GridParams,
    #[serde(default)]
    pub kpoints: Vec<[f64; 3]>,
    #[serde(default)]
    pub spin_polarization: SpinPolarization,
    #[serde(default)]
    pub hartree: HartreeParams,
    #[serde(default)]
    pub density: DensityParams,
    pub kernel_check: Option<KernelCheckParams>,
}

/// FFT grid parameters; an explicit `fft_size` wins over the cutoff.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GridParams {
    pub ecut: Option<f64>,
    pub supersampling: Option<f64>,
    pub fft_size: Option<[usize; 3]>,
}

impl GridParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.ecut.is_none() {
            self.ecut = Some(5.0);
        }
        if self.supersampling.is_none() {
            self.supersampling = Some(2.0);
        }
        self
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HartreeParams {
    pub scaling_factor: Option<f64>,
}

impl HartreeParams {
    pub fn with_defaults(mut self) -> Self {
        if self.scaling_factor.is_none() {
            self.scaling_factor = Some(1.0);
        }
        self
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DensityParams {
    #[serde(default)]
    pub gaussians: Vec<GaussianCharge>,
    #[serde(default)]
    pub plane_waves: Vec<PlaneWaveParams>,
}

/// Real cosine density mode at reciprocal vector `g`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct PlaneWaveParams {
    pub g: [i32; 3],
    pub amplitude: f64,
}

/// Dense kernel validation parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KernelCheckParams {
    pub enabled: Option<bool>,
    pub max_grid_points: Option<usize>,
}

impl Default for KernelCheckParams {
    fn default() -> Self {
        KernelCheckParams {
            enabled: Some(false),
            max_grid_points: Some(1000),
        }
    }
}

impl KernelCheckParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.max_grid_points.is_none() {
            self.max_grid_points = defaults.max_grid_points;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.grid = self.grid.with_defaults();
        self.hartree = self.hartree.with_defaults();
        if let Some(check) = self.kernel_check.take() {
            self.kernel_check = Some(check.with_defaults());
        }
        self
    }

    pub fn scaling_factor(&self) -> f64 {
        self.hartree.scaling_factor.unwrap_or(1.0)
    }

    pub fn is_kernel_check_enabled(&self) -> bool {
        self.kernel_check
            .as_ref()
            .and_then(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn kernel_check_max_points(&self) -> usize {
        self.kernel_check
            .as_ref()
            .and_then(|c| c.max_grid_points)
            .unwrap_or(1000)
    }

    pub fn build_lattice(&self) -> Result<Lattice, BasisError> {
        Lattice::from_rows(self.lattice)
    }

    pub fn build_grid(&self, lattice: &Lattice) -> Result<FftGrid, BasisError> {
        match self.grid.fft_size {
            Some(size) => FftGrid::new(size),
            None => FftGrid::from_ecut(
                lattice,
                self.grid.ecut.unwrap_or(5.0),
                self.grid.supersampling.unwrap_or(2.0),
            ),
        }
    }

    pub fn build_basis(&self) -> Result<PlaneWaveBasis, BasisError> {
        let lattice = self.build_lattice()?;
        let grid = self.build_grid(&lattice)?;
        let kcoords: Vec<Vector3<f64>> = self.kpoints.iter().map(|k| Vector3::from(*k)).collect();
        Ok(PlaneWaveBasis::new(lattice, grid, &kcoords, self.spin_polarization))
    }

    /// Gaussian charges plus plane-wave modes, one real-space channel per spin.
    /// Plane-wave modes are split evenly over the spin channels.
    pub fn build_density(&self, basis: &PlaneWaveBasis) -> Result<DensityField, BasisError> {
        let mut channels = match DensityField::gaussians(basis, &self.density.gaussians)? {
            DensityField::Real { channels } => channels,
            DensityField::Fourier { .. } => unreachable!("gaussian densities are sampled in real space"),
        };
        let weight = 1.0 / channels.len() as f64;

        for mode in &self.density.plane_waves {
            let wave = DensityField::plane_wave(basis, Vector3::from(mode.g), mode.amplitude)?;
            let wave_real = wave.total_real(basis)?;
            for channel in channels.iter_mut() {
                channel
                    .iter_mut()
                    .zip(&wave_real)
                    .for_each(|(rho, w)| *rho += weight * w);
            }
        }
        Ok(DensityField::Real { channels })
    }
}
