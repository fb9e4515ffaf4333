//! Error types for the modal solver

use thiserror::Error;

/// Main error type for the modal solver
#[derive(Error, Debug)]
pub enum SolverError {
    /// The model has no nodes, or no usable frame elements
    #[error("Model error: {0}")]
    Model(String),

    /// Every degree of freedom is restrained
    #[error("Constraint error: {0}")]
    Constraint(String),

    /// Cholesky factorization hit a non-positive pivot
    #[error("Numerical error: non-positive pivot {pivot:e} at {dof}, stiffness matrix is singular")]
    Numerical { dof: String, pivot: f64 },

    #[error("Element '{element}' is degenerate (length {length:e})")]
    DegenerateElement { element: String, length: f64 },

    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Mode {mode} did not converge after {iterations} iterations")]
    NotConverged { mode: usize, iterations: usize },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Time budget exceeded after {elapsed_ms} ms")]
    TimeBudgetExceeded { elapsed_ms: u128 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for modal analysis operations
pub type SolverResult<T> = Result<T, SolverError>;
