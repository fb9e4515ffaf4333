//! Frame element - two-node 3D beam/column/brace

use serde::{Deserialize, Serialize};

/// Structural role of a frame element
///
/// All kinds use the same Euler-Bernoulli formulation; the kind is carried
/// through for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Beam,
    Column,
    Brace,
}

/// A 3D frame element connecting two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameElement {
    /// Structural role
    #[serde(default)]
    pub kind: ElementKind,
    /// Name of the start node
    pub i_node: String,
    /// Name of the end node
    pub j_node: String,
    /// Name of the material
    pub material: String,
    /// Name of the section
    pub section: String,
}

impl FrameElement {
    /// Create a new beam element
    pub fn new(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self {
            kind: ElementKind::Beam,
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section: section.to_string(),
        }
    }

    /// Create a new column element
    pub fn column(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self::new(i_node, j_node, material, section).with_kind(ElementKind::Column)
    }

    /// Set the element kind
    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }
}
