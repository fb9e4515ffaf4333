//! Persistence records - model input, result rows and run status

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::analysis::ModalOptions;
use crate::elements::{ElementKind, FrameElement, Material, NodalMass, Node, Restraints, Section};
use crate::error::{SolverError, SolverResult};
use crate::model::FrameModel;
use crate::results::{
    AnalysisWarning, DirectionalRatios, ModalAnalysis, ModalSummary, NodeDisplacement,
};

/// Node as stored by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub restraints: Restraints,
    #[serde(default)]
    pub mass: Option<NodalMass>,
}

/// Material with either a shear modulus or a Poisson ratio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: String,
    pub e: f64,
    #[serde(default)]
    pub g: Option<f64>,
    #[serde(default)]
    pub nu: Option<f64>,
    pub rho: f64,
}

impl MaterialRecord {
    pub fn to_material(&self) -> SolverResult<Material> {
        match (self.g, self.nu) {
            (Some(g), _) => Ok(Material::new(self.e, g, self.rho)),
            (None, Some(nu)) if nu > -1.0 && nu < 0.5 => {
                Ok(Material::isotropic(self.e, nu, self.rho))
            }
            (None, Some(nu)) => Err(SolverError::InvalidInput(format!(
                "material '{}' has Poisson's ratio {} outside (-1, 0.5)",
                self.id, nu
            ))),
            (None, None) => Err(SolverError::InvalidInput(format!(
                "material '{}' needs either g or nu",
                self.id
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: String,
    pub a: f64,
    pub iy: f64,
    pub iz: f64,
    pub j: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    #[serde(default)]
    pub kind: ElementKind,
    pub start_node: String,
    pub end_node: String,
    pub section: String,
    pub material: String,
}

/// A complete model as fetched from storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInput {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub materials: Vec<MaterialRecord>,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

impl ModelInput {
    /// Parse from JSON
    pub fn from_json(json: &str) -> SolverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a frame model; node order follows the record order
    pub fn to_model(&self) -> SolverResult<FrameModel> {
        let mut model = FrameModel::new();

        for record in &self.nodes {
            let mut node =
                Node::new(record.x, record.y, record.z).with_restraints(record.restraints);
            if let Some(mass) = record.mass {
                node = node.with_mass(mass);
            }
            model.add_node(&record.id, node)?;
        }

        for record in &self.materials {
            model.add_material(&record.id, record.to_material()?)?;
        }

        for record in &self.sections {
            model.add_section(
                &record.id,
                Section::new(record.a, record.iy, record.iz, record.j),
            )?;
        }

        for record in &self.elements {
            let element = FrameElement::new(
                &record.start_node,
                &record.end_node,
                &record.material,
                &record.section,
            )
            .with_kind(record.kind);
            model.add_element(&record.id, element)?;
        }

        Ok(model)
    }
}

/// Source of row identifiers
pub trait IdGenerator {
    fn next_id(&mut self) -> u64;
}

/// Hands out consecutive IDs from a starting value
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// One stored row per mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalResultRow {
    pub id: u64,
    pub run_id: u64,
    pub mode: usize,
    pub frequency: f64,
    pub period: Option<f64>,
    pub circular_frequency: f64,
    pub participation: DirectionalRatios,
    pub cumulative: DirectionalRatios,
    pub modal_mass: f64,
    pub converged: bool,
}

/// One stored row per (mode, node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeShapeRow {
    pub id: u64,
    pub run_id: u64,
    pub mode: usize,
    pub node: String,
    #[serde(flatten)]
    pub displacement: NodeDisplacement,
}

/// Map an analysis to storage rows, mode rows first
pub fn emit_rows(
    analysis: &ModalAnalysis,
    run_id: u64,
    ids: &mut dyn IdGenerator,
) -> (Vec<ModalResultRow>, Vec<ModeShapeRow>) {
    let modes = analysis
        .modes
        .iter()
        .map(|m| ModalResultRow {
            id: ids.next_id(),
            run_id,
            mode: m.mode,
            frequency: m.frequency,
            period: m.period,
            circular_frequency: m.circular_frequency,
            participation: m.participation,
            cumulative: m.cumulative,
            modal_mass: m.modal_mass,
            converged: m.converged,
        })
        .collect();

    let shapes = analysis
        .shapes
        .iter()
        .map(|s| ModeShapeRow {
            id: ids.next_id(),
            run_id,
            mode: s.mode,
            node: s.node.clone(),
            displacement: s.displacement,
        })
        .collect();

    (modes, shapes)
}

/// State of an analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed(String),
}

/// A run with its status and, once completed, its rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: u64,
    #[serde(flatten)]
    pub status: RunStatus,
    pub modes: Vec<ModalResultRow>,
    pub shapes: Vec<ModeShapeRow>,
    pub summary: Option<ModalSummary>,
    pub warnings: Vec<AnalysisWarning>,
}

impl RunRecord {
    pub fn start(run_id: u64) -> Self {
        Self {
            run_id,
            status: RunStatus::Running,
            modes: Vec::new(),
            shapes: Vec::new(),
            summary: None,
            warnings: Vec::new(),
        }
    }

    /// Attach the rows of a finished analysis
    pub fn complete(&mut self, analysis: ModalAnalysis, ids: &mut dyn IdGenerator) {
        let (modes, shapes) = emit_rows(&analysis, self.run_id, ids);
        self.modes = modes;
        self.shapes = shapes;
        self.summary = Some(analysis.summary);
        self.warnings = analysis.warnings;
        self.status = RunStatus::Completed;
    }

    /// Record a failure; a failed run keeps no rows
    pub fn fail(&mut self, message: impl Into<String>) {
        self.modes.clear();
        self.shapes.clear();
        self.summary = None;
        self.warnings.clear();
        self.status = RunStatus::Failed(message.into());
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Run a modal analysis on stored input and record the outcome
pub fn execute(
    input: &ModelInput,
    options: &ModalOptions,
    run_id: u64,
    ids: &mut dyn IdGenerator,
) -> RunRecord {
    let mut record = RunRecord::start(run_id);
    info!("Run {}: {} nodes, {} elements", run_id, input.nodes.len(), input.elements.len());

    match input.to_model().and_then(|model| model.analyze_modal(options)) {
        Ok(analysis) => {
            record.complete(analysis, ids);
            info!("Run {} completed with {} modes", run_id, record.modes.len());
        }
        Err(e) => {
            error!("Run {} failed: {}", run_id, e);
            record.fail(e.to_string());
        }
    }

    record
}
