//! Local coordinate triad of a two-node frame element

use super::{Mat3, Vec3};
use crate::error::{SolverError, SolverResult};

/// Elements shorter than this are treated as degenerate
pub const MIN_LENGTH: f64 = 1e-10;

/// |x · Z| at or above which the element counts as vertical
pub const VERTICAL_THRESHOLD: f64 = 0.999;

/// Length and right-handed orthonormal local axes of an element
///
/// Local x runs from the start node to the end node. Local z is
/// perpendicular to x and the global Z axis (global X for near-vertical
/// elements), and local y completes the triad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalAxes {
    pub length: f64,
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl LocalAxes {
    /// Compute the triad for an element running from `start` to `end`
    pub fn between(element: &str, start: &[f64; 3], end: &[f64; 3]) -> SolverResult<Self> {
        let delta = Vec3::from(*end) - Vec3::from(*start);
        let length = delta.norm();

        if length < MIN_LENGTH {
            return Err(SolverError::DegenerateElement {
                element: element.to_string(),
                length,
            });
        }

        let x = delta / length;
        let reference = if x.dot(&Vec3::z()).abs() >= VERTICAL_THRESHOLD {
            Vec3::x()
        } else {
            Vec3::z()
        };
        let z = x.cross(&reference).normalize();
        let y = z.cross(&x);

        Ok(Self { length, x, y, z })
    }

    /// Direction cosine matrix with the local axes as rows
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_rows(&[self.x.transpose(), self.y.transpose(), self.z.transpose()])
    }
}
