//! Section properties for frame elements

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Cross-section properties for frame elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area in m²
    pub a: f64,
    /// Moment of inertia about local y-axis in m⁴
    pub iy: f64,
    /// Moment of inertia about local z-axis in m⁴
    pub iz: f64,
    /// Torsional constant in m⁴
    pub j: f64,
}

impl Section {
    /// Create a new section with basic properties
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self { a, iy, iz, j }
    }

    /// Solid rectangle, `depth` measured along local z
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        // Saint-Venant approximation
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);
        Self {
            a: width * depth,
            iy: width * depth.powi(3) / 12.0,
            iz: depth * width.powi(3) / 12.0,
            j,
        }
    }

    /// Solid circle
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let i = PI * r.powi(4) / 4.0;
        Self::new(PI * r * r, i, i, 2.0 * i)
    }

    /// Hollow circular (pipe) section
    pub fn pipe(outer_diameter: f64, wall_thickness: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;
        let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;
        Self::new(PI * (r_o * r_o - r_i * r_i), i, i, 2.0 * i)
    }

    /// Closed thin-walled box/tube section
    pub fn box_section(width: f64, depth: f64, wall_thickness: f64) -> Self {
        let t = wall_thickness;
        let bi = width - 2.0 * t;
        let di = depth - 2.0 * t;

        let enclosed = (width - t) * (depth - t);
        let perimeter = 2.0 * (width + depth) - 4.0 * t;

        Self {
            a: width * depth - bi * di,
            iy: (width * depth.powi(3) - bi * di.powi(3)) / 12.0,
            iz: (depth * width.powi(3) - di * bi.powi(3)) / 12.0,
            j: 4.0 * enclosed.powi(2) * t / perimeter,
        }
    }

    /// Polar moment of inertia
    pub fn ip(&self) -> f64 {
        self.iy + self.iz
    }

    /// Reject non-physical values
    pub fn validate(&self, name: &str) -> SolverResult<()> {
        let props = [("A", self.a), ("Iy", self.iy), ("Iz", self.iz), ("J", self.j)];
        for (label, value) in props {
            if !(value > 0.0) {
                return Err(SolverError::InvalidInput(format!(
                    "section '{}' must have positive {} (got {})",
                    name, label, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::rectangular(0.2, 0.2)
    }
}
