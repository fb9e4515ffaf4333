use approx::assert_relative_eq;
use modal_solver::analysis::{DofPartition, InverseIteration, ReducedSystem};
use modal_solver::math::{m_inner, Mat};
use modal_solver::prelude::*;
use nalgebra::SymmetricEigen;

const SEGMENTS: usize = 4;

/// Vertical steel cantilever, 0.2 x 0.4 section, split into four elements
///
/// Nodes are added in `order`; the geometry does not depend on it.
fn segmented_column(order: &[usize]) -> FrameModel {
    let mut model = FrameModel::new();
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("R", Section::rectangular(0.2, 0.4)).unwrap();

    for &i in order {
        let mut node = Node::new(0.0, 0.0, i as f64);
        if i == 0 {
            node = node.with_restraints(Restraints::fixed());
        }
        model.add_node(&format!("N{}", i), node).unwrap();
    }
    for &i in order.iter().rev() {
        if i < SEGMENTS {
            let element =
                FrameElement::column(&format!("N{}", i), &format!("N{}", i + 1), "Steel", "R");
            model.add_element(&format!("C{}", i), element).unwrap();
        }
    }
    model
}

fn natural_order() -> Vec<usize> {
    (0..=SEGMENTS).collect()
}

fn reduced(model: &FrameModel) -> ReducedSystem {
    let prepared = model.prepare().unwrap();
    let global = prepared.assemble();
    let partition = DofPartition::from_model(&prepared).unwrap();
    ReducedSystem::reduce(&prepared, &global, &partition)
}

fn tight_options(num_modes: usize) -> ModalOptions {
    ModalOptions::modes(num_modes)
        .with_tolerance(1e-10)
        .with_max_iter(2000)
}

#[test]
fn modes_are_m_orthonormal() {
    let model = segmented_column(&natural_order());
    let system = reduced(&model);
    let options = tight_options(6);
    let solution = InverseIteration::new(&system, &options)
        .unwrap()
        .solve(None)
        .unwrap();

    assert_eq!(solution.modes.len(), 6);
    for (i, a) in solution.modes.iter().enumerate() {
        for (j, b) in solution.modes.iter().enumerate() {
            let product = m_inner(&system.m, &a.eigenpair().vector, &b.eigenpair().vector);
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(product, expected, epsilon = 1e-8);
        }
    }
}

#[test]
fn residuals_are_small() {
    let model = segmented_column(&natural_order());
    let system = reduced(&model);
    let options = tight_options(6);
    let solution = InverseIteration::new(&system, &options)
        .unwrap()
        .solve(None)
        .unwrap();

    for outcome in &solution.modes {
        assert!(outcome.is_converged());
        let pair = outcome.eigenpair();
        let k_phi = &system.k * &pair.vector;
        let residual = &k_phi - &system.m * &pair.vector * pair.eigenvalue;
        assert!(
            residual.norm() <= 1e-4 * k_phi.norm(),
            "residual {:e} for λ = {:e}",
            residual.norm(),
            pair.eigenvalue
        );
    }
}

#[test]
fn eigenvalues_match_dense_reference() {
    let model = segmented_column(&natural_order());
    let system = reduced(&model);
    let options = tight_options(6);
    let solution = InverseIteration::new(&system, &options)
        .unwrap()
        .solve(None)
        .unwrap();

    // Standard form L⁻¹·K·L⁻ᵗ with M = L·Lᵗ
    let l = system.m.clone().cholesky().unwrap().l();
    let l_inv = l.try_inverse().unwrap();
    let a: Mat = &l_inv * &system.k * l_inv.transpose();
    let a = (&a + a.transpose()) * 0.5;
    let mut reference: Vec<f64> = SymmetricEigen::new(a).eigenvalues.iter().copied().collect();
    reference.sort_by(f64::total_cmp);

    for (outcome, expected) in solution.modes.iter().zip(&reference) {
        assert_relative_eq!(outcome.eigenpair().eigenvalue, *expected, max_relative = 1e-6);
    }
}

#[test]
fn frequencies_ascend_and_modes_are_numbered() {
    let model = segmented_column(&natural_order());
    let result = model.analyze_modal(&tight_options(8)).unwrap();

    assert_eq!(result.modes.len(), 8);
    for (index, mode) in result.modes.iter().enumerate() {
        assert_eq!(mode.mode, index + 1);
    }
    for pair in result.modes.windows(2) {
        assert!(pair[0].eigenvalue <= pair[1].eigenvalue);
    }
    assert_eq!(result.summary.fundamental_frequency, Some(result.modes[0].frequency));
}

#[test]
fn weak_axis_bending_comes_first() {
    let model = segmented_column(&natural_order());
    let result = model.analyze_modal(&tight_options(2)).unwrap();

    // Strong axis is four times stiffer with the same mass
    let first = &result.modes[0];
    let second = &result.modes[1];
    assert!(first.participation.ux > 50.0 || first.participation.uy > 50.0);
    assert_relative_eq!(second.frequency / first.frequency, 2.0, max_relative = 0.02);
}

#[test]
fn node_order_does_not_change_results() {
    let forward = segmented_column(&natural_order());
    let shuffled = segmented_column(&[3, 0, 4, 1, 2]);
    let options = tight_options(6);

    let a = forward.analyze_modal(&options).unwrap();
    let b = shuffled.analyze_modal(&options).unwrap();

    assert_eq!(a.modes.len(), b.modes.len());
    for (ma, mb) in a.modes.iter().zip(&b.modes) {
        assert_relative_eq!(ma.frequency, mb.frequency, max_relative = 1e-8);
        for (pa, pb) in ma.participation.as_array().iter().zip(mb.participation.as_array()) {
            assert_relative_eq!(*pa, pb, epsilon = 1e-6);
        }
    }

    // Shapes agree up to sign
    for mode in 1..=a.modes.len() {
        let ta = a.node_displacement(mode, "N4").unwrap();
        let tb = b.node_displacement(mode, "N4").unwrap();
        let dot: f64 = ta.as_array().iter().zip(tb.as_array()).map(|(x, y)| x * y).sum();
        let sign = if dot < 0.0 { -1.0 } else { 1.0 };
        for (x, y) in ta.as_array().iter().zip(tb.as_array()) {
            assert_relative_eq!(*x, sign * y, epsilon = 1e-6);
        }
    }
}

#[test]
fn truncated_participation_stays_below_total() {
    let model = segmented_column(&natural_order());
    let result = model.analyze_modal(&tight_options(4)).unwrap();

    for mode in &result.modes {
        for (pct, cum) in mode.participation.as_array().iter().zip(mode.cumulative.as_array()) {
            assert!(*pct >= 0.0);
            assert!(cum <= 100.0 + 1e-9);
        }
    }
}

#[test]
fn all_modes_recover_full_translational_mass() {
    let model = segmented_column(&natural_order());
    let free_dofs = SEGMENTS * 6;
    let result = model
        .analyze_modal(&ModalOptions::modes(free_dofs).with_max_iter(500))
        .unwrap();

    assert_eq!(result.modes.len(), free_dofs);
    let total = result.summary.cumulative;
    assert_relative_eq!(total.ux, 100.0, epsilon = 1e-3);
    assert_relative_eq!(total.uy, 100.0, epsilon = 1e-3);
    assert_relative_eq!(total.uz, 100.0, epsilon = 1e-3);
}

#[test]
fn diagonal_mass_basis_uses_diagonal_totals() {
    let model = segmented_column(&natural_order());
    let options = tight_options(2).with_mass_basis(MassBasis::Diagonal);
    let result = model.analyze_modal(&options).unwrap();
    let system = reduced(&model);

    let diagonal_ux: f64 = (0..system.size())
        .filter(|&row| system.direction(row) == 0)
        .map(|row| system.m[(row, row)])
        .sum();
    assert_relative_eq!(result.summary.total_mass.ux, diagonal_ux, max_relative = 1e-12);
}

#[test]
fn same_seed_gives_identical_results() {
    let model = segmented_column(&natural_order());
    let options = ModalOptions::modes(3).with_seed(42);
    let a = model.analyze_modal(&options).unwrap();
    let b = model.analyze_modal(&options).unwrap();
    assert_eq!(a.frequencies(), b.frequencies());
    assert_eq!(a.shapes, b.shapes);
}
