//! Node element - represents a point in 3D space

use serde::{Deserialize, Serialize};

use super::Restraints;

/// Lumped mass attached to a node
///
/// Translational masses are in kg, rotational inertias in kg·m².
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodalMass {
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
    pub ix: f64,
    pub iy: f64,
    pub iz: f64,
}

impl NodalMass {
    /// Create a nodal mass with explicit per-axis values
    pub fn new(mx: f64, my: f64, mz: f64, ix: f64, iy: f64, iz: f64) -> Self {
        Self { mx, my, mz, ix, iy, iz }
    }

    /// Same translational mass on all three axes, no rotational inertia
    pub fn translational(m: f64) -> Self {
        Self::new(m, m, m, 0.0, 0.0, 0.0)
    }

    /// Diagonal entries in DOF order [DX, DY, DZ, RX, RY, RZ]
    pub fn as_array(&self) -> [f64; 6] {
        [self.mx, self.my, self.mz, self.ix, self.iy, self.iz]
    }
}

/// A 3D node in the finite element model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Restrained DOFs, all free unless specified
    #[serde(default)]
    pub restraints: Restraints,
    /// Optional lumped mass
    #[serde(default)]
    pub mass: Option<NodalMass>,
}

impl Node {
    /// Create a new free, massless node at the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            restraints: Restraints::free(),
            mass: None,
        }
    }

    /// Set the restraint flags
    pub fn with_restraints(mut self, restraints: Restraints) -> Self {
        self.restraints = restraints;
        self
    }

    /// Attach a lumped mass
    pub fn with_mass(mut self, mass: NodalMass) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
