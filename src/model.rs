//! Frame model - structural model container and global matrix assembly

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{self, CancellationToken, ModalOptions};
use crate::elements::{ElementKind, FrameElement, Material, NodalMass, Node, Restraints, Section};
use crate::error::{SolverError, SolverResult};
use crate::math::{self, LocalAxes, Mat, Mat12};
use crate::results::ModalAnalysis;

/// Degrees of freedom per node: [DX, DY, DZ, RX, RY, RZ]
pub const DOF_PER_NODE: usize = 6;

/// Short labels for the six nodal DOFs
pub const DOF_LABELS: [&str; DOF_PER_NODE] = ["DX", "DY", "DZ", "RX", "RY", "RZ"];

/// The 3D frame model as supplied by the caller
///
/// Node order is insertion order and fixes the global DOF numbering.
#[derive(Debug, Clone, Default)]
pub struct FrameModel {
    /// Nodes by name
    pub nodes: HashMap<String, Node>,
    /// Materials by name
    pub materials: HashMap<String, Material>,
    /// Sections by name
    pub sections: HashMap<String, Section>,
    node_order: Vec<String>,
    elements: Vec<(String, FrameElement)>,
    element_names: HashSet<String>,
}

impl FrameModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> SolverResult<()> {
        if self.nodes.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.nodes.insert(name.to_string(), node);
        self.node_order.push(name.to_string());
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> SolverResult<()> {
        if self.materials.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.materials.insert(name.to_string(), material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> SolverResult<()> {
        if self.sections.contains_key(name) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.sections.insert(name.to_string(), section);
        Ok(())
    }

    /// Add a frame element to the model
    ///
    /// Both end nodes must already exist. Material and section references
    /// are resolved when the model is prepared; elements whose references
    /// are missing then are skipped and reported.
    pub fn add_element(&mut self, name: &str, element: FrameElement) -> SolverResult<()> {
        if !self.nodes.contains_key(&element.i_node) {
            return Err(SolverError::NodeNotFound(element.i_node.clone()));
        }
        if !self.nodes.contains_key(&element.j_node) {
            return Err(SolverError::NodeNotFound(element.j_node.clone()));
        }
        if !self.element_names.insert(name.to_string()) {
            return Err(SolverError::DuplicateName(name.to_string()));
        }
        self.elements.push((name.to_string(), element));
        Ok(())
    }

    /// Replace the restraint flags of a node
    pub fn set_restraints(&mut self, node_name: &str, restraints: Restraints) -> SolverResult<()> {
        let node = self
            .nodes
            .get_mut(node_name)
            .ok_or_else(|| SolverError::NodeNotFound(node_name.to_string()))?;
        node.restraints = restraints;
        Ok(())
    }

    /// Attach a lumped mass to a node
    pub fn set_nodal_mass(&mut self, node_name: &str, mass: NodalMass) -> SolverResult<()> {
        let node = self
            .nodes
            .get_mut(node_name)
            .ok_or_else(|| SolverError::NodeNotFound(node_name.to_string()))?;
        node.mass = Some(mass);
        Ok(())
    }

    /// Node names in DOF numbering order
    pub fn node_names(&self) -> &[String] {
        &self.node_order
    }

    /// Elements in insertion order
    pub fn elements(&self) -> impl Iterator<Item = (&str, &FrameElement)> {
        self.elements.iter().map(|(name, element)| (name.as_str(), element))
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Resolve references and compute element geometry
    pub fn prepare(&self) -> SolverResult<AnalysisModel<'_>> {
        AnalysisModel::build(self)
    }

    /// Run modal analysis with the given options
    pub fn analyze_modal(&self, options: &ModalOptions) -> SolverResult<ModalAnalysis> {
        analysis::run_modal(self, options, None)
    }

    /// Run modal analysis that stops when `cancel` is triggered
    pub fn analyze_modal_with_cancel(
        &self,
        options: &ModalOptions,
        cancel: &CancellationToken,
    ) -> SolverResult<ModalAnalysis> {
        analysis::run_modal(self, options, Some(cancel))
    }
}

/// Why an element was left out of the analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "name", rename_all = "snake_case")]
pub enum SkipReason {
    MissingMaterial(String),
    MissingSection(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingMaterial(name) => write!(f, "material '{}' not found", name),
            SkipReason::MissingSection(name) => write!(f, "section '{}' not found", name),
        }
    }
}

/// An element with all references resolved and geometry computed
#[derive(Debug, Clone)]
pub struct ResolvedElement<'a> {
    pub name: &'a str,
    pub kind: ElementKind,
    /// Node index of the start node
    pub i_index: usize,
    /// Node index of the end node
    pub j_index: usize,
    pub material: &'a Material,
    pub section: &'a Section,
    pub axes: LocalAxes,
}

/// Outcome of resolving one element against the model
#[derive(Debug, Clone)]
pub enum ElementResolution<'a> {
    Resolved(ResolvedElement<'a>),
    Skipped { element: String, reason: SkipReason },
}

/// Global stiffness and mass matrices over all DOFs
#[derive(Debug, Clone)]
pub struct GlobalMatrices {
    pub k: Mat,
    pub m: Mat,
}

/// A frame model prepared for analysis
///
/// Holds the node order, the node-to-DOF map and the resolved elements.
/// Materials and sections are borrowed from the source model.
#[derive(Debug, Clone)]
pub struct AnalysisModel<'a> {
    /// Node names in DOF order
    pub node_names: Vec<&'a str>,
    /// Nodes in DOF order
    pub nodes: Vec<&'a Node>,
    /// First global DOF of each node
    pub dof_map: HashMap<&'a str, usize>,
    /// Elements that take part in the analysis
    pub elements: Vec<ResolvedElement<'a>>,
    /// Elements left out, with the reason
    pub skipped: Vec<(String, SkipReason)>,
}

impl<'a> AnalysisModel<'a> {
    /// Build the analysis aggregate from a frame model
    pub fn build(model: &'a FrameModel) -> SolverResult<Self> {
        if model.node_order.is_empty() {
            return Err(SolverError::Model("model has no nodes".to_string()));
        }
        if model.elements.is_empty() {
            return Err(SolverError::Model("model has no frame elements".to_string()));
        }

        let mut node_names = Vec::with_capacity(model.node_order.len());
        let mut nodes = Vec::with_capacity(model.node_order.len());
        let mut dof_map = HashMap::with_capacity(model.node_order.len());
        for (index, name) in model.node_order.iter().enumerate() {
            let node = model
                .nodes
                .get(name)
                .ok_or_else(|| SolverError::NodeNotFound(name.clone()))?;
            node_names.push(name.as_str());
            nodes.push(node);
            dof_map.insert(name.as_str(), index * DOF_PER_NODE);
        }

        let mut elements = Vec::with_capacity(model.elements.len());
        let mut skipped = Vec::new();
        let mut validated = HashSet::new();

        for (name, element) in &model.elements {
            match Self::resolve(model, &dof_map, name, element)? {
                ElementResolution::Resolved(resolved) => {
                    if validated.insert(("material", element.material.as_str())) {
                        resolved.material.validate(&element.material)?;
                    }
                    if validated.insert(("section", element.section.as_str())) {
                        resolved.section.validate(&element.section)?;
                    }
                    elements.push(resolved);
                }
                ElementResolution::Skipped { element, reason } => {
                    warn!("Skipping element '{}': {}", element, reason);
                    skipped.push((element, reason));
                }
            }
        }

        if elements.is_empty() {
            return Err(SolverError::Model(format!(
                "no frame element could be resolved ({} skipped)",
                skipped.len()
            )));
        }

        info!(
            "Prepared model: {} nodes, {} elements, {} skipped",
            nodes.len(),
            elements.len(),
            skipped.len()
        );

        Ok(Self {
            node_names,
            nodes,
            dof_map,
            elements,
            skipped,
        })
    }

    fn resolve(
        model: &'a FrameModel,
        dof_map: &HashMap<&'a str, usize>,
        name: &'a str,
        element: &'a FrameElement,
    ) -> SolverResult<ElementResolution<'a>> {
        let Some(material) = model.materials.get(&element.material) else {
            return Ok(ElementResolution::Skipped {
                element: name.to_string(),
                reason: SkipReason::MissingMaterial(element.material.clone()),
            });
        };
        let Some(section) = model.sections.get(&element.section) else {
            return Ok(ElementResolution::Skipped {
                element: name.to_string(),
                reason: SkipReason::MissingSection(element.section.clone()),
            });
        };

        let i_dof = *dof_map
            .get(element.i_node.as_str())
            .ok_or_else(|| SolverError::NodeNotFound(element.i_node.clone()))?;
        let j_dof = *dof_map
            .get(element.j_node.as_str())
            .ok_or_else(|| SolverError::NodeNotFound(element.j_node.clone()))?;

        let i_node = &model.nodes[&element.i_node];
        let j_node = &model.nodes[&element.j_node];
        let axes = LocalAxes::between(name, &i_node.coords(), &j_node.coords())?;

        Ok(ElementResolution::Resolved(ResolvedElement {
            name,
            kind: element.kind,
            i_index: i_dof / DOF_PER_NODE,
            j_index: j_dof / DOF_PER_NODE,
            material,
            section,
            axes,
        }))
    }

    /// Total DOF count, six per node
    pub fn total_dofs(&self) -> usize {
        self.nodes.len() * DOF_PER_NODE
    }

    /// Human-readable label of a global DOF, e.g. `N3:RZ`
    pub fn dof_label(&self, dof: usize) -> String {
        format!(
            "{}:{}",
            self.node_names[dof / DOF_PER_NODE],
            DOF_LABELS[dof % DOF_PER_NODE]
        )
    }

    /// Assemble the global stiffness and mass matrices
    pub fn assemble(&self) -> GlobalMatrices {
        let n_dofs = self.total_dofs();
        let mut k = Mat::zeros(n_dofs, n_dofs);
        let mut m = Mat::zeros(n_dofs, n_dofs);

        for element in &self.elements {
            let (material, section) = (element.material, element.section);
            let length = element.axes.length;
            let t = math::transformation_matrix(&element.axes);

            let k_local = math::local_stiffness(
                material.e,
                material.g,
                section.a,
                section.iy,
                section.iz,
                section.j,
                length,
            );
            let m_local = math::local_consistent_mass(
                material.rho,
                section.a,
                section.iy,
                section.iz,
                length,
            );

            let i_dof = element.i_index * DOF_PER_NODE;
            let j_dof = element.j_index * DOF_PER_NODE;
            scatter(&mut k, &math::to_global(&k_local, &t), i_dof, j_dof);
            scatter(&mut m, &math::to_global(&m_local, &t), i_dof, j_dof);
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(mass) = node.mass {
                let base = index * DOF_PER_NODE;
                for (offset, value) in mass.as_array().into_iter().enumerate() {
                    m[(base + offset, base + offset)] += value;
                }
            }
        }

        GlobalMatrices { k, m }
    }
}

/// Accumulate a 12x12 element matrix into a global matrix
///
/// Writes the i-i, i-j, j-i and j-j 6x6 blocks.
fn scatter(global: &mut Mat, element: &Mat12, i_dof: usize, j_dof: usize) {
    let blocks = [(i_dof, 0), (j_dof, DOF_PER_NODE)];
    for &(row_dof, row_offset) in &blocks {
        for &(col_dof, col_offset) in &blocks {
            for a in 0..DOF_PER_NODE {
                for b in 0..DOF_PER_NODE {
                    global[(row_dof + a, col_dof + b)] += element[(row_offset + a, col_offset + b)];
                }
            }
        }
    }
}
