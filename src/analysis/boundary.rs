//! Boundary conditions - free/restrained DOF partition and reduced matrices

use log::info;

use crate::error::{SolverError, SolverResult};
use crate::math::{self, Mat, Vector};
use crate::model::{AnalysisModel, GlobalMatrices, DOF_PER_NODE};

/// Disjoint free and restrained DOF lists over the global numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofPartition {
    pub free: Vec<usize>,
    pub restrained: Vec<usize>,
}

impl DofPartition {
    /// Partition DOFs by each node's restraint flags
    pub fn from_model(model: &AnalysisModel<'_>) -> SolverResult<Self> {
        let mut free = Vec::new();
        let mut restrained = Vec::new();

        for (index, node) in model.nodes.iter().enumerate() {
            for (offset, is_restrained) in node.restraints.as_array().into_iter().enumerate() {
                let dof = index * DOF_PER_NODE + offset;
                if is_restrained {
                    restrained.push(dof);
                } else {
                    free.push(dof);
                }
            }
        }

        if free.is_empty() {
            return Err(SolverError::Constraint(format!(
                "all {} DOFs are restrained, there are no modes to extract",
                restrained.len()
            )));
        }

        Ok(Self { free, restrained })
    }
}

/// Stiffness and mass restricted to the free DOFs
#[derive(Debug, Clone)]
pub struct ReducedSystem {
    pub k: Mat,
    pub m: Mat,
    /// Global DOF of each reduced row
    pub free_dofs: Vec<usize>,
    /// Label of each reduced row, e.g. `N2:DX`
    pub labels: Vec<String>,
    /// Size of the unreduced system
    pub total_dofs: usize,
}

impl ReducedSystem {
    /// Delete restrained rows and columns from K and M
    ///
    /// Restrained DOFs carry zero displacement, so their rows and columns
    /// drop out without condensation.
    pub fn reduce(
        model: &AnalysisModel<'_>,
        global: &GlobalMatrices,
        partition: &DofPartition,
    ) -> Self {
        let free_dofs = partition.free.clone();
        let labels = free_dofs.iter().map(|&dof| model.dof_label(dof)).collect();

        info!(
            "Reduced system: {} free / {} restrained DOFs",
            partition.free.len(),
            partition.restrained.len()
        );

        Self {
            k: math::select_submatrix(&global.k, &free_dofs),
            m: math::select_submatrix(&global.m, &free_dofs),
            free_dofs,
            labels,
            total_dofs: model.total_dofs(),
        }
    }

    /// Number of free DOFs
    pub fn size(&self) -> usize {
        self.free_dofs.len()
    }

    /// Nodal DOF offset (0-5) of each reduced row
    pub fn direction(&self, row: usize) -> usize {
        self.free_dofs[row] % DOF_PER_NODE
    }

    /// Free DOFs whose diagonal mass is positive
    ///
    /// Bounds the rank of M and so the number of finite eigenvalues.
    pub fn massive_dofs(&self) -> usize {
        (0..self.size()).filter(|&i| self.m[(i, i)] > 0.0).count()
    }

    /// Scatter a reduced vector back to all DOFs, zero at restraints
    pub fn expand(&self, reduced: &Vector) -> Vector {
        let mut full = Vector::zeros(self.total_dofs);
        for (row, &dof) in self.free_dofs.iter().enumerate() {
            full[dof] = reduced[row];
        }
        full
    }
}
