//! Result types for modal analysis

use serde::{Deserialize, Serialize};

use crate::math::ClampedPivot;
use crate::model::SkipReason;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// A value per global direction, e.g. mass participation percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalRatios {
    pub ux: f64,
    pub uy: f64,
    pub uz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl DirectionalRatios {
    /// Create from array [UX, UY, UZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            ux: arr[0],
            uy: arr[1],
            uz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.ux, self.uy, self.uz, self.rx, self.ry, self.rz]
    }

    /// Largest translational component
    pub fn max_translational(&self) -> f64 {
        self.ux.max(self.uy).max(self.uz)
    }
}

/// Frequency and participation of one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalResult {
    /// 1-based, in ascending frequency
    pub mode: usize,
    /// λ = ω² (rad²/s²)
    pub eigenvalue: f64,
    /// ω (rad/s)
    pub circular_frequency: f64,
    /// f (Hz)
    pub frequency: f64,
    /// T = 1/f (s); `None` for a zero-frequency mode
    pub period: Option<f64>,
    /// Mass participation percent
    pub participation: DirectionalRatios,
    /// Running participation percent up to and including this mode
    pub cumulative: DirectionalRatios,
    /// φᵗ·M·φ
    pub modal_mass: f64,
    /// False when the mode hit the iteration limit
    pub converged: bool,
}

impl ModalResult {
    /// Frequency quantities from an eigenvalue; negative λ is treated as zero
    pub fn frequencies(eigenvalue: f64) -> (f64, f64, Option<f64>) {
        let omega = eigenvalue.max(0.0).sqrt();
        let frequency = omega / (2.0 * std::f64::consts::PI);
        let period = (frequency > 0.0).then(|| 1.0 / frequency);
        (omega, frequency, period)
    }
}

/// Displacement of one node in one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeShape {
    pub mode: usize,
    pub node: String,
    pub displacement: NodeDisplacement,
}

/// Run-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSummary {
    pub num_modes: usize,
    /// Requested mode count capped at the number of free DOFs
    pub requested_modes: usize,
    pub total_dofs: usize,
    pub free_dofs: usize,
    /// Directional total mass against which participation is measured
    pub total_mass: DirectionalRatios,
    /// Cumulative participation after the last mode
    pub cumulative: DirectionalRatios,
    pub fundamental_frequency: Option<f64>,
    pub fundamental_period: Option<f64>,
    pub all_converged: bool,
}

/// Conditions that did not stop the run but may affect the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Element left out of the model
    SkippedElement { element: String, reason: SkipReason },
    /// Cholesky pivot raised to the pivot floor
    ClampedPivot { dof: String, pivot: ClampedPivot },
    /// Mode kept after hitting the iteration limit
    NotConverged { mode: usize, iterations: usize },
    /// Fewer modes than requested because M is singular on the free DOFs
    MasslessTruncation { requested: usize, extracted: usize },
    /// Slightly negative eigenvalue treated as a zero-frequency mode
    NegativeEigenvalue { mode: usize, eigenvalue: f64 },
}

/// Complete output of a modal analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalAnalysis {
    /// Modes in ascending frequency
    pub modes: Vec<ModalResult>,
    /// One entry per (mode, node), grouped by mode
    pub shapes: Vec<ModeShape>,
    pub summary: ModalSummary,
    pub warnings: Vec<AnalysisWarning>,
}

impl ModalAnalysis {
    pub fn frequencies(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.frequency).collect()
    }

    /// Shapes of one mode, in node order
    pub fn mode_shape(&self, mode: usize) -> impl Iterator<Item = &ModeShape> {
        self.shapes.iter().filter(move |s| s.mode == mode)
    }

    /// Displacement of a node in a mode
    pub fn node_displacement(&self, mode: usize, node: &str) -> Option<&NodeDisplacement> {
        self.shapes
            .iter()
            .find(|s| s.mode == mode && s.node == node)
            .map(|s| &s.displacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequencies_from_eigenvalue() {
        let (omega, f, period) = ModalResult::frequencies(400.0);
        assert_relative_eq!(omega, 20.0);
        assert_relative_eq!(f, 20.0 / (2.0 * std::f64::consts::PI));
        assert_relative_eq!(period.unwrap(), 1.0 / f);
    }

    #[test]
    fn test_zero_frequency_has_no_period() {
        assert_eq!(ModalResult::frequencies(0.0), (0.0, 0.0, None));
        assert_eq!(ModalResult::frequencies(-1e-9), (0.0, 0.0, None));
    }

    #[test]
    fn test_displacement_magnitudes() {
        let d = NodeDisplacement::from_array([3.0, 0.0, 4.0, 0.0, 1.0, 0.0]);
        assert_relative_eq!(d.translation_magnitude(), 5.0);
        assert_relative_eq!(d.rotation_magnitude(), 1.0);
    }

    #[test]
    fn test_directional_ratios_round_trip() {
        let r = DirectionalRatios::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(r.uy, 2.0);
        assert_eq!(r.rz, 6.0);
        assert_eq!(r.max_translational(), 3.0);
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = AnalysisWarning::NotConverged {
            mode: 2,
            iterations: 100,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "not_converged");
        assert_eq!(json["iterations"], 100);
    }
}
