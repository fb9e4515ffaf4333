//! Modal Solver - natural frequencies and mode shapes of 3D frames
//!
//! Builds a frame finite-element model, assembles the global stiffness and
//! consistent mass matrices, removes restrained DOFs and extracts the lowest
//! modes of K·φ = λ·M·φ by deflated inverse iteration, supporting:
//! - Euler-Bernoulli frame elements (beams, columns, braces)
//! - Lumped nodal masses
//! - Directional mass participation and cumulative participation
//! - Result rows for persistence
//!
//! ## Example
//! ```rust
//! use modal_solver::prelude::*;
//!
//! let mut model = FrameModel::new();
//!
//! // Add material and section
//! model.add_material("Steel", Material::steel()).unwrap();
//! model.add_section("C300", Section::rectangular(0.3, 0.3)).unwrap();
//!
//! // Add nodes
//! model
//!     .add_node("N1", Node::new(0.0, 0.0, 0.0).with_restraints(Restraints::fixed()))
//!     .unwrap();
//! model.add_node("N2", Node::new(0.0, 0.0, 4.0)).unwrap();
//!
//! // Add column
//! model
//!     .add_element("C1", FrameElement::column("N1", "N2", "Steel", "C300"))
//!     .unwrap();
//!
//! // Analyze
//! let result = model.analyze_modal(&ModalOptions::modes(3)).unwrap();
//! assert_eq!(result.modes.len(), 3);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod math;
pub mod model;
pub mod records;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{CancellationToken, MassBasis, ModalOptions};
    pub use crate::elements::{
        ElementKind, FrameElement, Material, NodalMass, Node, Restraints, Section,
    };
    pub use crate::error::{SolverError, SolverResult};
    pub use crate::model::FrameModel;
    pub use crate::records::{ModelInput, RunRecord, RunStatus, SequentialIdGenerator};
    pub use crate::results::{
        AnalysisWarning, ModalAnalysis, ModalResult, ModalSummary, ModeShape, NodeDisplacement,
    };
}
