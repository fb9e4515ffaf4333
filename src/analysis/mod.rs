//! Modal analysis options and pipeline stages

pub mod boundary;
pub mod eigen;
pub mod modal;
pub mod participation;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

pub use boundary::{DofPartition, ReducedSystem};
pub use eigen::{EigenSolution, Eigenpair, InverseIteration, ModeOutcome};
pub use modal::run_modal;
pub use participation::{cumulative, Participation, ParticipationCalculator};

/// How the directional total mass used for participation is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassBasis {
    /// rᵗ·M·r with r the unit influence vector of the direction
    #[default]
    Influence,
    /// Sum of the diagonal mass entries of the direction
    Diagonal,
}

/// Options for modal analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalOptions {
    /// Number of modes to extract, clamped to the free DOF count
    pub num_modes: usize,
    /// Relative eigenvalue change that counts as converged
    pub tolerance: f64,
    /// Iteration limit per mode
    pub max_iterations: usize,
    /// Smallest Cholesky pivot accepted without clamping
    pub pivot_floor: f64,
    /// Keep modes that hit `max_iterations` instead of failing the run
    pub accept_unconverged: bool,
    /// Seed for the start vectors
    pub seed: u64,
    /// Wall-clock limit for the eigensolve in milliseconds
    pub time_budget_ms: Option<u64>,
    /// Directional mass measure for participation factors
    pub mass_basis: MassBasis,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            num_modes: 12,
            tolerance: 1e-8,
            max_iterations: 100,
            pivot_floor: 1e-10,
            accept_unconverged: true,
            seed: 0x5eed,
            time_budget_ms: None,
            mass_basis: MassBasis::Influence,
        }
    }
}

impl ModalOptions {
    /// Options extracting `num_modes` modes
    pub fn modes(num_modes: usize) -> Self {
        Self {
            num_modes,
            ..Self::default()
        }
    }

    /// Set maximum iterations per mode
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the Cholesky pivot floor
    pub fn with_pivot_floor(mut self, floor: f64) -> Self {
        self.pivot_floor = floor;
        self
    }

    /// Fail the run when a mode does not converge
    pub fn strict(mut self) -> Self {
        self.accept_unconverged = false;
        self
    }

    /// Set the start-vector seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Limit the eigensolve wall-clock time
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(budget.as_millis() as u64);
        self
    }

    /// Set the directional mass measure
    pub fn with_mass_basis(mut self, basis: MassBasis) -> Self {
        self.mass_basis = basis;
        self
    }

    /// Wall-clock limit, if any
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    /// Reject option values the solver cannot work with
    pub fn validate(&self) -> SolverResult<()> {
        if self.num_modes == 0 {
            return Err(SolverError::InvalidInput("num_modes must be at least 1".to_string()));
        }
        if !(self.tolerance > 0.0) {
            return Err(SolverError::InvalidInput(format!(
                "tolerance must be positive (got {})",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.pivot_floor > 0.0) {
            return Err(SolverError::InvalidInput(format!(
                "pivot_floor must be positive (got {})",
                self.pivot_floor
            )));
        }
        Ok(())
    }
}

/// Cooperative cancellation flag shared between a run and its caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at its next check
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ModalOptions::default();
        assert_eq!(options.num_modes, 12);
        assert_eq!(options.tolerance, 1e-8);
        assert_eq!(options.max_iterations, 100);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_options() {
        assert!(ModalOptions::modes(0).validate().is_err());
        assert!(ModalOptions::default().with_tolerance(0.0).validate().is_err());
        assert!(ModalOptions::default().with_max_iter(0).validate().is_err());
        assert!(ModalOptions::default().with_pivot_floor(-1.0).validate().is_err());
    }

    #[test]
    fn test_partial_options_deserialize_with_defaults() {
        let options: ModalOptions = serde_json::from_str(r#"{"num_modes": 4}"#).unwrap();
        assert_eq!(options.num_modes, 4);
        assert_eq!(options.max_iterations, 100);
        assert_eq!(options.mass_basis, MassBasis::Influence);
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
