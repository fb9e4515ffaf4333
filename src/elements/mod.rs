//! Structural elements module

mod frame_element;
mod material;
mod node;
mod restraints;
mod section;

pub use frame_element::{ElementKind, FrameElement};
pub use material::Material;
pub use node::{NodalMass, Node};
pub use restraints::Restraints;
pub use section::Section;
