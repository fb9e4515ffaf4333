//! Nodal restraint conditions

use serde::{Deserialize, Serialize};

/// Restraint flags at a node, in DOF order [DX, DY, DZ, RX, RY, RZ]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restraints {
    /// Restrained in X translation
    #[serde(default)]
    pub dx: bool,
    /// Restrained in Y translation
    #[serde(default)]
    pub dy: bool,
    /// Restrained in Z translation
    #[serde(default)]
    pub dz: bool,
    /// Restrained in X rotation
    #[serde(default)]
    pub rx: bool,
    /// Restrained in Y rotation
    #[serde(default)]
    pub ry: bool,
    /// Restrained in Z rotation
    #[serde(default)]
    pub rz: bool,
}

impl Restraints {
    /// No restraints
    pub fn free() -> Self {
        Self::default()
    }

    /// Fully fixed (all DOFs restrained)
    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Pinned (translations restrained, rotations free)
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Create restraints with specific flags
    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self { dx, dy, dz, rx, ry, rz }
    }

    /// Flags as an array [DX, DY, DZ, RX, RY, RZ]
    pub fn as_array(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Get list of restrained DOF offsets (0-5)
    pub fn restrained_dofs(&self) -> Vec<usize> {
        (0..6).filter(|&i| self.as_array()[i]).collect()
    }

    /// Get list of free DOF offsets (0-5)
    pub fn free_dofs(&self) -> Vec<usize> {
        (0..6).filter(|&i| !self.as_array()[i]).collect()
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.as_array().iter().any(|&r| r)
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.as_array().iter().filter(|&&r| r).count()
    }
}
