//! Modal analysis driver

use log::{info, warn};

use super::participation::{self, Participation, ParticipationCalculator};
use super::{
    CancellationToken, DofPartition, InverseIteration, ModalOptions, ModeOutcome, ReducedSystem,
};
use crate::error::{SolverError, SolverResult};
use crate::math::Vector;
use crate::model::{FrameModel, DOF_PER_NODE};
use crate::results::{
    AnalysisWarning, DirectionalRatios, ModalAnalysis, ModalResult, ModalSummary, ModeShape,
    NodeDisplacement,
};

/// Run a modal analysis from model to per-mode results
///
/// Any error aborts the run and no partial results are returned. Problems
/// that do not stop the run are collected in [`ModalAnalysis::warnings`].
pub fn run_modal(
    model: &FrameModel,
    options: &ModalOptions,
    cancel: Option<&CancellationToken>,
) -> SolverResult<ModalAnalysis> {
    options.validate()?;

    let prepared = model.prepare()?;
    let mut warnings: Vec<AnalysisWarning> = prepared
        .skipped
        .iter()
        .map(|(element, reason)| AnalysisWarning::SkippedElement {
            element: element.clone(),
            reason: reason.clone(),
        })
        .collect();

    let global = prepared.assemble();
    let partition = DofPartition::from_model(&prepared)?;
    let system = ReducedSystem::reduce(&prepared, &global, &partition);

    if system.massive_dofs() == 0 {
        return Err(SolverError::Model(
            "no free DOF carries mass, check densities and nodal masses".to_string(),
        ));
    }

    let solver = InverseIteration::new(&system, options)?;
    warnings.extend(
        solver
            .clamped_pivots()
            .iter()
            .map(|pivot| AnalysisWarning::ClampedPivot {
                dof: system.labels[pivot.index].clone(),
                pivot: *pivot,
            }),
    );

    let solution = solver.solve(cancel)?;
    if solution.modes.len() < solution.requested {
        warnings.push(AnalysisWarning::MasslessTruncation {
            requested: solution.requested,
            extracted: solution.modes.len(),
        });
    }

    let vectors: Vec<Vector> = solution
        .modes
        .iter()
        .map(|outcome| with_positive_peak(&outcome.eigenpair().vector))
        .collect();

    let calculator = ParticipationCalculator::new(&system, options.mass_basis);
    let participations: Vec<Participation> =
        vectors.iter().map(|v| calculator.compute(v)).collect();
    let cumulative = participation::cumulative(&participations);

    let mut modes = Vec::with_capacity(vectors.len());
    let mut shapes = Vec::with_capacity(vectors.len() * prepared.nodes.len());

    for (index, (outcome, vector)) in solution.modes.iter().zip(&vectors).enumerate() {
        let mode = index + 1;

        if let ModeOutcome::NotConverged { iterations, .. } = outcome {
            if !options.accept_unconverged {
                return Err(SolverError::NotConverged {
                    mode,
                    iterations: *iterations,
                });
            }
            warnings.push(AnalysisWarning::NotConverged {
                mode,
                iterations: *iterations,
            });
        }

        let eigenvalue = outcome.eigenpair().eigenvalue;
        if eigenvalue < 0.0 {
            warn!("Mode {} has negative eigenvalue {:e}, reported as 0 Hz", mode, eigenvalue);
            warnings.push(AnalysisWarning::NegativeEigenvalue { mode, eigenvalue });
        }

        let (circular_frequency, frequency, period) = ModalResult::frequencies(eigenvalue);
        info!(
            "Mode {}: f = {:.4} Hz, T = {}",
            mode,
            frequency,
            period.map_or_else(|| "-".to_string(), |t| format!("{:.4} s", t))
        );

        modes.push(ModalResult {
            mode,
            eigenvalue,
            circular_frequency,
            frequency,
            period,
            participation: DirectionalRatios::from_array(participations[index].percent),
            cumulative: DirectionalRatios::from_array(cumulative[index]),
            modal_mass: participations[index].modal_mass,
            converged: outcome.is_converged(),
        });

        let full = system.expand(vector);
        for (node_index, name) in prepared.node_names.iter().enumerate() {
            let base = node_index * DOF_PER_NODE;
            let mut values = [0.0; DOF_PER_NODE];
            for (offset, value) in values.iter_mut().enumerate() {
                *value = full[base + offset];
            }
            shapes.push(ModeShape {
                mode,
                node: name.to_string(),
                displacement: NodeDisplacement::from_array(values),
            });
        }
    }

    let summary = ModalSummary {
        num_modes: modes.len(),
        requested_modes: solution.requested,
        total_dofs: system.total_dofs,
        free_dofs: system.size(),
        total_mass: DirectionalRatios::from_array(calculator.totals()),
        cumulative: cumulative
            .last()
            .map(|c| DirectionalRatios::from_array(*c))
            .unwrap_or_default(),
        fundamental_frequency: modes.first().map(|m| m.frequency),
        fundamental_period: modes.first().and_then(|m| m.period),
        all_converged: modes.iter().all(|m| m.converged),
    };

    info!(
        "Modal analysis complete: {} modes, cumulative UX {:.1}% UY {:.1}% UZ {:.1}%",
        summary.num_modes, summary.cumulative.ux, summary.cumulative.uy, summary.cumulative.uz
    );

    Ok(ModalAnalysis {
        modes,
        shapes,
        summary,
        warnings,
    })
}

/// Flip the sign so the largest-magnitude component is positive
fn with_positive_peak(vector: &Vector) -> Vector {
    let peak = vector
        .iter()
        .copied()
        .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
    if peak < 0.0 {
        -vector
    } else {
        vector.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{FrameElement, Material, NodalMass, Node, Restraints, Section};
    use approx::assert_relative_eq;

    fn portal_frame() -> FrameModel {
        let mut model = FrameModel::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("Col", Section::rectangular(0.3, 0.3)).unwrap();
        model.add_section("Beam", Section::rectangular(0.3, 0.5)).unwrap();

        model
            .add_node("B1", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))
            .unwrap();
        model
            .add_node("B2", Node::new(6.0, 0.0, 0.0).with_restraints(Restraints::fixed()))
            .unwrap();
        model.add_node("T1", Node::new(0.0, 0.0, 4.0)).unwrap();
        model.add_node("T2", Node::new(6.0, 0.0, 4.0)).unwrap();

        model
            .add_element("C1", FrameElement::column("B1", "T1", "Steel", "Col"))
            .unwrap();
        model
            .add_element("C2", FrameElement::column("B2", "T2", "Steel", "Col"))
            .unwrap();
        model
            .add_element("G1", FrameElement::new("T1", "T2", "Steel", "Beam"))
            .unwrap();
        model
    }

    #[test]
    fn test_portal_frame_modes_ascending() {
        let model = portal_frame();
        let options = ModalOptions::modes(6).with_max_iter(2000);
        let result = model.analyze_modal(&options).unwrap();

        assert_eq!(result.modes.len(), 6);
        assert_eq!(result.shapes.len(), 6 * 4);
        for pair in result.modes.windows(2) {
            assert!(pair[0].frequency <= pair[1].frequency);
        }
        assert_eq!(result.modes[0].mode, 1);
        assert_eq!(result.summary.free_dofs, 12);
        assert!(!result
            .warnings
            .iter()
            .any(|w| matches!(w, AnalysisWarning::SkippedElement { .. })));
    }

    #[test]
    fn test_requested_modes_capped_at_free_dofs() {
        let model = portal_frame();
        let result = model.analyze_modal(&ModalOptions::modes(20)).unwrap();
        assert_eq!(result.summary.requested_modes, 12);
        assert!(result.modes.len() <= 12);
    }

    #[test]
    fn test_fixed_bases_have_zero_shape() {
        let model = portal_frame();
        let result = model.analyze_modal(&ModalOptions::modes(3)).unwrap();
        for mode in 1..=3 {
            let base = result.node_displacement(mode, "B1").unwrap();
            assert_eq!(base.as_array(), [0.0; 6]);
            assert!(result.node_displacement(mode, "T1").unwrap().translation_magnitude() > 0.0);
        }
    }

    #[test]
    fn test_cumulative_participation_bounded() {
        let model = portal_frame();
        let result = model.analyze_modal(&ModalOptions::modes(4)).unwrap();
        let last = result.modes.last().unwrap();
        for value in last.cumulative.as_array() {
            assert!(value <= 100.0 + 1e-9);
        }
        assert_relative_eq!(result.summary.cumulative.ux, last.cumulative.ux);
    }

    #[test]
    fn test_massless_model_is_model_error() {
        let mut model = portal_frame();
        model.materials.insert("Steel".into(), Material::new(200e9, 77e9, 0.0));
        assert!(matches!(
            model.analyze_modal(&ModalOptions::default()),
            Err(SolverError::Model(_))
        ));
    }

    #[test]
    fn test_strict_mode_rejects_unconverged() {
        let model = portal_frame();
        let options = ModalOptions::modes(2).with_max_iter(1).strict();
        assert!(matches!(
            model.analyze_modal(&options),
            Err(SolverError::NotConverged { mode: 1, iterations: 1 })
        ));
    }

    #[test]
    fn test_unconverged_modes_are_warned() {
        let model = portal_frame();
        let options = ModalOptions::modes(2).with_max_iter(1);
        let result = model.analyze_modal(&options).unwrap();
        assert!(!result.summary.all_converged);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, AnalysisWarning::NotConverged { mode: 1, .. })));
    }

    #[test]
    fn test_tip_mass_only_truncates_modes() {
        let mut model = FrameModel::new();
        model.add_material("Light", Material::new(200e9, 77e9, 0.0)).unwrap();
        model.add_section("S", Section::rectangular(0.1, 0.1)).unwrap();
        model
            .add_node("Base", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))
            .unwrap();
        model
            .add_node("Tip", Node::new(0.0, 0.0, 3.0).with_mass(NodalMass::translational(500.0)))
            .unwrap();
        model
            .add_element("C1", FrameElement::column("Base", "Tip", "Light", "S"))
            .unwrap();

        let result = model.analyze_modal(&ModalOptions::modes(6)).unwrap();
        assert_eq!(result.modes.len(), 3);
        assert!(result.warnings.contains(&AnalysisWarning::MasslessTruncation {
            requested: 6,
            extracted: 3,
        }));
    }
}
