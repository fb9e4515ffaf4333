use approx::assert_relative_eq;
use modal_solver::prelude::*;

const LENGTH: f64 = 3.0;
const E: f64 = 200e9;
const I: f64 = 8.33e-6;
const TIP_MASS: f64 = 1000.0;

/// Single massless column with a lumped tip mass
fn tip_mass_cantilever() -> FrameModel {
    let mut model = FrameModel::new();
    model
        .add_material("Massless", Material::new(E, 77e9, 0.0))
        .unwrap();
    model
        .add_section("S", Section::new(0.01, I, I, 2.0 * I))
        .unwrap();
    model
        .add_node("Base", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))
        .unwrap();
    model
        .add_node(
            "Tip",
            Node::new(0.0, 0.0, LENGTH).with_mass(NodalMass::translational(TIP_MASS)),
        )
        .unwrap();
    model
        .add_element("C1", FrameElement::column("Base", "Tip", "Massless", "S"))
        .unwrap();
    model
}

#[test]
fn fundamental_frequency_matches_closed_form() {
    let model = tip_mass_cantilever();
    let result = model.analyze_modal(&ModalOptions::modes(1)).unwrap();

    let expected =
        (3.0 * E * I / (TIP_MASS * LENGTH.powi(3))).sqrt() / (2.0 * std::f64::consts::PI);
    let mode = &result.modes[0];

    assert_eq!(mode.mode, 1);
    assert!(mode.converged);
    assert_relative_eq!(mode.frequency, expected, max_relative = 0.01);
    assert_relative_eq!(mode.period.unwrap(), 1.0 / expected, max_relative = 0.01);
    assert_relative_eq!(
        mode.circular_frequency,
        2.0 * std::f64::consts::PI * mode.frequency,
        max_relative = 1e-12
    );
}

#[test]
fn lateral_pair_then_axial() {
    let model = tip_mass_cantilever();
    let result = model.analyze_modal(&ModalOptions::modes(3)).unwrap();
    assert_eq!(result.modes.len(), 3);

    // Square section: the two bending modes coincide
    assert_relative_eq!(result.modes[0].frequency, result.modes[1].frequency, max_relative = 1e-6);

    let axial = (E * 0.01 / LENGTH / TIP_MASS).sqrt() / (2.0 * std::f64::consts::PI);
    assert_relative_eq!(result.modes[2].frequency, axial, max_relative = 1e-6);
    assert_relative_eq!(result.modes[2].participation.uz, 100.0, epsilon = 1e-6);

    // Each lateral mode mobilizes the whole tip mass in some horizontal direction
    for mode in &result.modes[..2] {
        let lateral = mode.participation.ux + mode.participation.uy;
        assert_relative_eq!(lateral, 100.0, epsilon = 1e-6);
    }
}

#[test]
fn base_shape_is_zero_and_tip_moves() {
    let model = tip_mass_cantilever();
    let result = model.analyze_modal(&ModalOptions::modes(1)).unwrap();

    let base = result.node_displacement(1, "Base").unwrap();
    assert_eq!(base.as_array(), [0.0; 6]);

    let tip = result.node_displacement(1, "Tip").unwrap();
    assert!(tip.translation_magnitude() > 0.0);
    assert!(tip.dz.abs() < 1e-4 * tip.translation_magnitude());
}

#[test]
fn massless_rotations_truncate_mode_count() {
    let model = tip_mass_cantilever();
    let result = model.analyze_modal(&ModalOptions::modes(12)).unwrap();

    assert_eq!(result.modes.len(), 3);
    assert_eq!(result.summary.free_dofs, 6);
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        AnalysisWarning::MasslessTruncation {
            requested: 6,
            extracted: 3
        }
    )));
}
