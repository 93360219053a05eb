//! Tests for the Hartree term

use super::{GreenCoefficients, Term, TermHartree};
use crate::error::HartreeError;
use approx::{assert_abs_diff_eq, assert_relative_eq};
use basis::{dot_real, DensityField, FftGrid, Lattice, PlaneWaveBasis, ReciprocalBasis, SpinPolarization};
use nalgebra::Vector3;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::sync::Arc;

fn skewed_lattice() -> Lattice {
    Lattice::from_rows([[5.0, 0.0, 0.0], [1.0, 4.5, 0.0], [0.3, 0.6, 6.0]]).unwrap()
}

fn make_basis(size: [usize; 3], spin: SpinPolarization) -> Arc<PlaneWaveBasis> {
    let kcoords = [Vector3::zeros(), Vector3::new(0.25, 0.25, 0.0)];
    Arc::new(PlaneWaveBasis::new(skewed_lattice(), FftGrid::new(size).unwrap(), &kcoords, spin))
}

fn random_density(basis: &PlaneWaveBasis, n_channels: usize, seed: u64) -> DensityField {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(0.0, 1.0).unwrap();
    let channels = (0..n_channels)
        .map(|_| (0..basis.n_grid_points()).map(|_| dist.sample(&mut rng)).collect())
        .collect();
    DensityField::from_real(channels)
}

fn real_channel(density: &DensityField) -> &[f64] {
    match density {
        DensityField::Real { channels } => &channels[0],
        DensityField::Fourier { .. } => panic!("expected a real-space density"),
    }
}

#[test]
fn test_zero_vector_entries_vanish_for_any_scaling() {
    let basis = make_basis([4, 3, 5], SpinPolarization::None);
    for scaling in [1.0, -2.5, 0.0, 7.0] {
        let green = GreenCoefficients::build(basis.as_ref(), scaling);
        let zero = green.zero_index().expect("grid contains the zero vector");
        assert_eq!(basis.g_vectors()[zero], Vector3::zeros());
        assert_eq!(green.coefficients()[zero], 0.0);
        assert_eq!(green.inverse()[zero], 0.0);
    }
}

#[test]
fn test_zero_vector_is_located_not_assumed_first() {
    struct Shuffled(PlaneWaveBasis, Vec<Vector3<i32>>);
    impl ReciprocalBasis for Shuffled {
        fn reciprocal_lattice(&self) -> &nalgebra::Matrix3<f64> {
            self.0.reciprocal_lattice()
        }
        fn g_vectors(&self) -> &[Vector3<i32>] {
            &self.1
        }
        fn unit_cell_volume(&self) -> f64 {
            self.0.unit_cell_volume()
        }
        fn n_spin_components(&self) -> usize {
            1
        }
        fn kpoints(&self) -> &[basis::Kpoint] {
            self.0.kpoints()
        }
        fn r_to_g(&self, f: &[f64]) -> Result<Vec<Complex64>, basis::BasisError> {
            self.0.r_to_g(f)
        }
        fn g_to_r(&self, f: &[Complex64]) -> Result<Vec<Complex64>, basis::BasisError> {
            self.0.g_to_r(f)
        }
        fn conjugate_indices(&self) -> Vec<usize> {
            self.0.conjugate_indices()
        }
    }

    let inner = PlaneWaveBasis::new(skewed_lattice(), FftGrid::new([3, 3, 3]).unwrap(), &[], SpinPolarization::None);
    let mut g_vectors = inner.g_vectors().to_vec();
    g_vectors.rotate_left(5);
    let shuffled = Shuffled(inner, g_vectors);

    let green = GreenCoefficients::build(&shuffled, 1.0);
    assert_eq!(green.zero_index(), Some(22));
    assert_eq!(green.coefficients()[22], 0.0);
    assert_eq!(green.coefficients().iter().filter(|&&x| x == 0.0).count(), 1);
}

#[test]
fn test_green_coefficients_match_poisson_formula() {
    let basis = make_basis([4, 3, 5], SpinPolarization::None);
    let scaling = 0.7;
    let green = GreenCoefficients::build(basis.as_ref(), scaling);
    let lattice = basis.lattice();

    for (idx, g) in basis.g_vectors().iter().enumerate() {
        if *g == Vector3::zeros() {
            continue;
        }
        let g_norm_sq = lattice.cartesian_g(g).norm_squared();
        let expected = scaling * 4.0 * PI / g_norm_sq;
        assert_relative_eq!(green.coefficients()[idx], expected, max_relative = 1e-14);
        assert_relative_eq!(green.inverse()[idx], 1.0 / expected, max_relative = 1e-14);
        assert!(green.coefficients()[idx] > 0.0);
    }
}

#[test]
fn test_negative_scaling_has_no_square_root() {
    let basis = make_basis([3, 3, 3], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), -1.0);
    assert!(term.green().sqrt().is_none());

    let delta_rho = random_density(&basis, 1, 3);
    assert_eq!(
        term.apply_kernel_sqrt(&delta_rho),
        Err(HartreeError::IndefiniteKernel { scaling_factor: -1.0 })
    );
    assert!(term.apply_kernel_invsqrt(&delta_rho).is_err());
    // energy and the plain kernel stay available
    assert!(term.evaluate(&delta_rho).unwrap().energy < 0.0);
    assert!(term.apply_kernel(&delta_rho).is_ok());
}

#[test]
fn test_zero_density_gives_zero_energy_and_potential() {
    let basis = make_basis([4, 4, 3], SpinPolarization::Collinear);
    for scaling in [1.0, -3.0, 0.0] {
        let term = TermHartree::new(Arc::clone(&basis), scaling);
        let output = term.evaluate(&DensityField::zeros(basis.as_ref())).unwrap();
        assert_eq!(output.energy, 0.0);
        assert!(output.potential.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_plane_wave_density_energy_and_potential() {
    let basis = make_basis([5, 4, 3], SpinPolarization::None);
    let scaling = 1.7;
    let term = TermHartree::new(Arc::clone(&basis), scaling);
    let grid = basis.grid();

    let g = Vector3::new(1, -1, 1);
    let density = DensityField::plane_wave(basis.as_ref(), g, 1.0).unwrap();
    let output = term.evaluate(&density).unwrap();

    let g_norm_sq = basis.lattice().cartesian_g(&g).norm_squared();
    let green = scaling * 4.0 * PI / g_norm_sq;
    assert_relative_eq!(output.energy, green / 2.0, max_relative = 1e-12);

    // V(G) = green · ρ(G) at ±G and nothing anywhere else
    let plus = grid.index_of_g(&g).unwrap();
    let minus = grid.index_of_g(&(-g)).unwrap();
    let amplitude = 1.0 / 2f64.sqrt();
    for (idx, v) in output.potential_fourier.iter().enumerate() {
        let expected = if idx == plus || idx == minus { green * amplitude } else { 0.0 };
        assert_abs_diff_eq!(v.re, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-12);
    }

    let prefactor = 2.0 * green * amplitude / basis.unit_cell_volume().sqrt();
    for (r, v) in output.potential.iter().enumerate() {
        let phase = 2.0 * PI * g.map(|x| x as f64).dot(&grid.r_fractional(r));
        assert_abs_diff_eq!(*v, prefactor * phase.cos(), epsilon = 1e-12);
    }
}

#[test]
fn test_off_axis_nyquist_plane_wave_on_even_grid() {
    let basis = make_basis([4, 3, 3], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let grid = basis.grid();

    // -g = (2, -1, 0) wraps to (-2, -1, 0) on the even first axis
    let g = Vector3::new(-2, 1, 0);
    let partner = Vector3::new(-2, -1, 0);
    let density = DensityField::plane_wave(basis.as_ref(), g, 1.0).unwrap();
    let output = term.evaluate(&density).unwrap();

    let green = |v: &Vector3<i32>| 4.0 * PI / basis.lattice().cartesian_g(v).norm_squared();
    let (green_plus, green_partner) = (green(&g), green(&partner));
    assert_relative_eq!(output.energy, (green_plus + green_partner) / 4.0, max_relative = 1e-12);

    // the potential is projected onto the shared real cosine
    let prefactor = (green_plus + green_partner) / (2f64.sqrt() * basis.unit_cell_volume().sqrt());
    for (r, v) in output.potential.iter().enumerate() {
        let phase = 2.0 * PI * g.map(|x| x as f64).dot(&grid.r_fractional(r));
        assert_abs_diff_eq!(*v, prefactor * phase.cos(), epsilon = 1e-12);
    }
}

#[test]
fn test_energy_is_linear_in_scaling_factor() {
    let basis = make_basis([4, 5, 3], SpinPolarization::None);
    let density = random_density(&basis, 1, 17);
    let energy = |s: f64| TermHartree::new(Arc::clone(&basis), s).evaluate(&density).unwrap().energy;
    for s in [0.5, 1.0, -0.8] {
        assert_relative_eq!(energy(2.0 * s), 2.0 * energy(s), max_relative = 1e-12);
    }
}

#[test]
fn test_energy_equals_half_real_space_overlap() {
    let basis = make_basis([4, 4, 4], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let density = random_density(&basis, 1, 5);
    let output = term.evaluate(&density).unwrap();

    let overlap = dot_real(&output.potential, real_channel(&density), basis.volume_element());
    assert_relative_eq!(output.energy, overlap / 2.0, max_relative = 1e-10);
    assert!(output.energy >= 0.0);
}

#[test]
fn test_energy_depends_only_on_total_density() {
    let basis = make_basis([3, 4, 5], SpinPolarization::Collinear);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let spin_resolved = random_density(&basis, 2, 23);
    let total = match &spin_resolved {
        DensityField::Real { channels } => {
            DensityField::from_real(vec![channels[0].iter().zip(&channels[1]).map(|(a, b)| a + b).collect()])
        }
        DensityField::Fourier { .. } => unreachable!(),
    };
    let a = term.evaluate(&spin_resolved).unwrap();
    let b = term.evaluate(&total).unwrap();
    assert_relative_eq!(a.energy, b.energy, max_relative = 1e-12);
}

#[test]
fn test_one_operator_per_kpoint_sharing_potential() {
    let basis = make_basis([3, 3, 4], SpinPolarization::Collinear);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let output = term.evaluate(&random_density(&basis, 2, 9)).unwrap();

    assert_eq!(output.operators.len(), basis.kpoints().len());
    assert_eq!(output.operators.len(), 4);
    for (op, kpoint) in output.operators.iter().zip(basis.kpoints()) {
        assert_eq!(op.kpoint(), kpoint);
        assert_eq!(op.potential(), &output.potential[..]);
    }

    let psi: Vec<Complex64> = (0..basis.n_grid_points())
        .map(|i| Complex64::new(i as f64, 1.0))
        .collect();
    let v_psi = output.operators[2].apply(&psi).unwrap();
    for ((out, p), v) in v_psi.iter().zip(&psi).zip(output.potential.iter()) {
        assert_relative_eq!(out.re, p.re * v, epsilon = 1e-14);
        assert_relative_eq!(out.im, p.im * v, epsilon = 1e-14);
    }
    assert!(matches!(
        output.operators[0].apply(&psi[1..]),
        Err(HartreeError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_term_trait_reports_same_energy() {
    let basis = make_basis([3, 3, 3], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 0.5);
    let density = random_density(&basis, 1, 41);
    let terms: Vec<Box<dyn Term>> = vec![Box::new(TermHartree::new(Arc::clone(&basis), 0.5))];
    let via_trait = terms[0].energy_and_operators(&density).unwrap();
    assert_eq!(terms[0].name(), "Hartree");
    assert_relative_eq!(via_trait.energy, term.evaluate(&density).unwrap().energy);
}

#[test]
fn test_kernel_is_self_adjoint() {
    // even axes with a skewed lattice exercise the unpaired Nyquist modes
    let basis = make_basis([4, 4, 3], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 1.4);
    let a = random_density(&basis, 1, 1);
    let b = random_density(&basis, 1, 2);
    let ka = term.apply_kernel(&a).unwrap();
    let kb = term.apply_kernel(&b).unwrap();

    let dvol = basis.volume_element();
    let lhs = dot_real(real_channel(&a), &kb[0], dvol);
    let rhs = dot_real(&ka[0], real_channel(&b), dvol);
    assert_relative_eq!(lhs, rhs, max_relative = 1e-10);
}

#[test]
fn test_kernel_is_positive_semidefinite() {
    let basis = make_basis([4, 3, 5], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    for seed in 0..8 {
        let delta_rho = random_density(&basis, 1, 100 + seed);
        let k = term.apply_kernel(&delta_rho).unwrap();
        let quadratic = dot_real(real_channel(&delta_rho), &k[0], basis.volume_element());
        assert!(quadratic >= -1e-12, "negative curvature {quadratic}");
    }
}

#[test]
fn test_kernel_broadcasts_to_every_spin_channel() {
    let basis = make_basis([3, 4, 3], SpinPolarization::Collinear);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let delta_v = term.apply_kernel(&random_density(&basis, 2, 8)).unwrap();
    assert_eq!(delta_v.len(), 2);
    assert_eq!(delta_v[0], delta_v[1]);
}

#[test]
fn test_kernel_agrees_with_evaluate_potential() {
    let basis = make_basis([5, 3, 4], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 0.9);
    let density = random_density(&basis, 1, 77);
    let potential = term.evaluate(&density).unwrap().potential;
    let delta_v = term.apply_kernel(&density).unwrap();
    for (a, b) in potential.iter().zip(&delta_v[0]) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_square_root_applied_twice_is_the_kernel() {
    // odd grids: every G has its -G partner, so the tables compose exactly
    let basis = make_basis([5, 3, 3], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 2.0);
    let delta_rho = random_density(&basis, 1, 31);

    let half = term.apply_kernel_sqrt(&delta_rho).unwrap();
    let twice = term.apply_kernel_sqrt(&DensityField::from_real(half)).unwrap();
    let full = term.apply_kernel(&delta_rho).unwrap();
    for (a, b) in twice[0].iter().zip(&full[0]) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_inverse_square_root_inverts_off_the_null_mode() {
    let basis = make_basis([5, 3, 5], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 1.5);
    let delta_rho = random_density(&basis, 1, 57);

    let once = term.apply_kernel_invsqrt(&delta_rho).unwrap();
    let twice = term.apply_kernel_invsqrt(&DensityField::from_real(once)).unwrap();
    let recovered = term.apply_kernel(&DensityField::from_real(twice)).unwrap();

    let original = real_channel(&delta_rho);
    let mean = original.iter().sum::<f64>() / original.len() as f64;
    for (r, x) in recovered[0].iter().zip(original) {
        assert_abs_diff_eq!(*r, x - mean, epsilon = 1e-10);
    }
}

#[test]
fn test_uniform_perturbation_is_annihilated() {
    let basis = make_basis([3, 3, 3], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let uniform = DensityField::from_real(vec![vec![0.25; basis.n_grid_points()]]);
    for delta_v in [
        term.apply_kernel(&uniform).unwrap(),
        term.apply_kernel_sqrt(&uniform).unwrap(),
        term.apply_kernel_invsqrt(&uniform).unwrap(),
    ] {
        assert!(delta_v[0].iter().all(|v| v.abs() < 1e-12));
    }
    assert_abs_diff_eq!(term.evaluate(&uniform).unwrap().energy, 0.0, epsilon = 1e-12);
}

#[test]
fn test_shape_mismatch_is_an_error() {
    let basis = make_basis([3, 3, 3], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let short = DensityField::from_real(vec![vec![0.0; 26]]);
    assert_eq!(
        term.apply_kernel(&short),
        Err(HartreeError::ShapeMismatch { what: "density grid", expected: 27, found: 26 })
    );
    assert!(matches!(term.evaluate(&short), Err(HartreeError::ShapeMismatch { .. })));
}

#[test]
fn test_non_real_fourier_density_is_reported() {
    let basis = make_basis([3, 3, 3], SpinPolarization::None);
    let term = TermHartree::with_unit_scaling(Arc::clone(&basis));
    let idx = basis.grid().index_of_g(&Vector3::new(1, 0, 0)).unwrap();
    let mut coefficients = vec![Complex64::new(0.0, 0.0); basis.n_grid_points()];
    coefficients[idx] = Complex64::new(1.0, 0.0);

    let result = term.evaluate(&DensityField::from_fourier(vec![coefficients]));
    assert!(matches!(
        result,
        Err(HartreeError::NumericalAnomaly { what: "density coefficients", .. })
    ));
}

#[test]
fn test_real_and_fourier_inputs_agree() {
    let basis = make_basis([4, 3, 4], SpinPolarization::None);
    let term = TermHartree::new(Arc::clone(&basis), 1.1);
    let density = random_density(&basis, 1, 61);
    let fourier = DensityField::from_fourier(vec![density.total_fourier(basis.as_ref()).unwrap()]);

    let a = term.evaluate(&density).unwrap();
    let b = term.evaluate(&fourier).unwrap();
    assert_relative_eq!(a.energy, b.energy, max_relative = 1e-12);
    for (x, y) in a.potential.iter().zip(b.potential.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
    }
}
