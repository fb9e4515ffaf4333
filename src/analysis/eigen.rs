//! Generalized eigensolver for K·φ = λ·M·φ
//!
//! K is factored once by Cholesky. Each mode is then found by inverse
//! iteration from a random start vector, deflated against the modes
//! already accepted so that successive modes come out in ascending order.

use std::time::Instant;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CancellationToken, ModalOptions, ReducedSystem};
use crate::error::{SolverError, SolverResult};
use crate::math::{m_inner, CholeskyFactor, ClampedPivot, Mat, PivotFailure, Vector};

/// Relative M-norm below which a vector is treated as carrying no mass
const MASSLESS_TOL: f64 = 1e-12;

/// An eigenvalue with its M-normalized eigenvector over the free DOFs
#[derive(Debug, Clone)]
pub struct Eigenpair {
    /// λ = ω² in rad²/s²
    pub eigenvalue: f64,
    pub vector: Vector,
}

/// Result of iterating one mode
#[derive(Debug, Clone)]
pub enum ModeOutcome {
    Converged(Eigenpair),
    /// `max_iterations` ran out; holds the last iterate
    NotConverged { estimate: Eigenpair, iterations: usize },
}

impl ModeOutcome {
    pub fn eigenpair(&self) -> &Eigenpair {
        match self {
            ModeOutcome::Converged(pair) => pair,
            ModeOutcome::NotConverged { estimate, .. } => estimate,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, ModeOutcome::Converged(_))
    }
}

/// Modes found by a solve, in ascending eigenvalue order
#[derive(Debug, Clone)]
pub struct EigenSolution {
    pub modes: Vec<ModeOutcome>,
    /// Mode count after clamping to the free DOF count
    pub requested: usize,
}

fn pivot_error(system: &ReducedSystem, failure: PivotFailure) -> SolverError {
    SolverError::Numerical {
        dof: system.labels[failure.index].clone(),
        pivot: failure.value,
    }
}

/// Deflated inverse iteration on a reduced system
pub struct InverseIteration<'a> {
    system: &'a ReducedSystem,
    options: &'a ModalOptions,
    factor: CholeskyFactor,
}

impl<'a> InverseIteration<'a> {
    /// Factor the reduced stiffness matrix
    pub fn new(system: &'a ReducedSystem, options: &'a ModalOptions) -> SolverResult<Self> {
        let factor = CholeskyFactor::new(&system.k, options.pivot_floor)
            .map_err(|failure| pivot_error(system, failure))?;

        for pivot in factor.clamped_pivots() {
            warn!(
                "Cholesky pivot {:e} at {} raised to floor {:e}; stiffness may be near-singular",
                pivot.value, system.labels[pivot.index], options.pivot_floor
            );
        }

        Ok(Self {
            system,
            options,
            factor,
        })
    }

    /// Pivots raised to the floor during factorization
    pub fn clamped_pivots(&self) -> &[ClampedPivot] {
        self.factor.clamped_pivots()
    }

    /// Extract the lowest modes
    pub fn solve(&self, cancel: Option<&CancellationToken>) -> SolverResult<EigenSolution> {
        let m = &self.system.m;
        let n = self.system.size();
        let requested = self.options.num_modes.min(n);
        let target = requested.min(self.system.massive_dofs());
        if target < requested {
            warn!(
                "Only {} of {} free DOFs carry mass; extracting {} modes instead of {}",
                self.system.massive_dofs(),
                n,
                target,
                requested
            );
        }

        let mass_scale = m.diagonal().amax();
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let started = Instant::now();

        let mut accepted: Vec<(Vector, Vector)> = Vec::with_capacity(target);
        let mut modes = Vec::with_capacity(target);

        for mode in 0..target {
            let start = Vector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
            let Some(outcome) = self.iterate_mode(start, &accepted, mass_scale, cancel, started)?
            else {
                warn!(
                    "Mode {} has no mass left after deflation; stopping at {} modes",
                    mode + 1,
                    modes.len()
                );
                break;
            };

            let pair = outcome.eigenpair();
            accepted.push((pair.vector.clone(), m * &pair.vector));
            modes.push(outcome);
        }

        let in_order = modes
            .windows(2)
            .all(|w| w[0].eigenpair().eigenvalue <= w[1].eigenpair().eigenvalue);
        if !in_order {
            debug!("Reordering modes by eigenvalue");
            modes.sort_by(|a, b| {
                a.eigenpair()
                    .eigenvalue
                    .total_cmp(&b.eigenpair().eigenvalue)
            });
        }

        Ok(EigenSolution { modes, requested })
    }

    /// Inverse iteration for one mode; `None` when the deflated start vector has no mass
    fn iterate_mode(
        &self,
        mut phi: Vector,
        accepted: &[(Vector, Vector)],
        mass_scale: f64,
        cancel: Option<&CancellationToken>,
        started: Instant,
    ) -> SolverResult<Option<ModeOutcome>> {
        let k = &self.system.k;
        let m = &self.system.m;
        let mut lambda: Option<f64> = None;
        let mut converged = false;
        let mut iterations = 0;

        for iteration in 1..=self.options.max_iterations {
            self.check_interrupt(cancel, started)?;

            deflate(&mut phi, accepted);
            if !m_normalize(m, &mut phi, mass_scale) {
                return Ok(None);
            }

            // K·φ' = M·φ
            let rhs = m * &phi;
            let next = self
                .factor
                .solve(&rhs)
                .map_err(|failure| pivot_error(self.system, failure))?;

            // φ'ᵗ·K·φ' = φ'ᵗ·M·φ
            let denom = m_inner(m, &next, &next);
            if !(denom > MASSLESS_TOL * mass_scale * next.norm_squared()) {
                return Ok(None);
            }
            let lambda_next = next.dot(&rhs) / denom;

            iterations = iteration;
            phi = next;
            let change = lambda.map(|prev| (lambda_next - prev).abs() / lambda_next.abs().max(1.0));
            lambda = Some(lambda_next);

            if change.is_some_and(|c| c < self.options.tolerance) {
                converged = true;
                break;
            }
        }

        deflate(&mut phi, accepted);
        if !m_normalize(m, &mut phi, mass_scale) {
            return Ok(None);
        }

        // Rayleigh quotient of the final M-normalized vector
        let eigenvalue = phi.dot(&(k * &phi));
        let pair = Eigenpair {
            eigenvalue,
            vector: phi,
        };

        if converged {
            debug!(
                "Mode {} converged in {} iterations: λ = {:e}",
                accepted.len() + 1,
                iterations,
                eigenvalue
            );
            Ok(Some(ModeOutcome::Converged(pair)))
        } else {
            warn!(
                "Mode {} did not converge in {} iterations (λ ≈ {:e})",
                accepted.len() + 1,
                iterations,
                eigenvalue
            );
            Ok(Some(ModeOutcome::NotConverged {
                estimate: pair,
                iterations,
            }))
        }
    }

    fn check_interrupt(
        &self,
        cancel: Option<&CancellationToken>,
        started: Instant,
    ) -> SolverResult<()> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(SolverError::Cancelled);
        }
        if let Some(budget) = self.options.time_budget() {
            let elapsed = started.elapsed();
            if elapsed >= budget {
                return Err(SolverError::TimeBudgetExceeded {
                    elapsed_ms: elapsed.as_millis(),
                });
            }
        }
        Ok(())
    }
}

/// Remove the M-components along accepted modes: φ ← φ − Σ (φᵗ·M·eᵢ)·eᵢ
///
/// Each accepted entry is (eᵢ, M·eᵢ).
fn deflate(phi: &mut Vector, accepted: &[(Vector, Vector)]) {
    for (vector, mass_product) in accepted {
        let c = mass_product.dot(phi);
        phi.axpy(-c, vector, 1.0);
    }
}

/// Scale φ to unit M-norm; false if φ carries no mass
fn m_normalize(m: &Mat, phi: &mut Vector, mass_scale: f64) -> bool {
    let norm_sq = m_inner(m, phi, phi);
    if !(norm_sq > MASSLESS_TOL * mass_scale * phi.norm_squared()) {
        return false;
    }
    *phi /= norm_sq.sqrt();
    true
}
