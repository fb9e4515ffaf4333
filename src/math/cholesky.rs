//! Dense Cholesky factorization K = L·Lᵗ with a pivot floor

use serde::{Deserialize, Serialize};

use super::{Mat, Vector};

/// A pivot that was raised to the floor during factorization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampedPivot {
    /// Row of the factored matrix
    pub index: usize,
    /// Pivot value before clamping
    pub value: f64,
}

/// Factorization stopped on a non-positive pivot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotFailure {
    pub index: usize,
    pub value: f64,
}

/// Lower-triangular Cholesky factor
#[derive(Debug, Clone)]
pub struct CholeskyFactor {
    l: Mat,
    clamped: Vec<ClampedPivot>,
}

impl CholeskyFactor {
    /// Factor a symmetric matrix, reading only its lower triangle
    ///
    /// Pivots in (0, `floor`) are raised to `floor` and recorded; a pivot
    /// at or below zero fails the factorization.
    pub fn new(a: &Mat, floor: f64) -> Result<Self, PivotFailure> {
        let n = a.nrows();
        let mut l = Mat::zeros(n, n);
        let mut clamped = Vec::new();

        for j in 0..n {
            let mut pivot = a[(j, j)];
            for k in 0..j {
                pivot -= l[(j, k)] * l[(j, k)];
            }

            if !(pivot > 0.0) {
                return Err(PivotFailure { index: j, value: pivot });
            }
            if pivot < floor {
                clamped.push(ClampedPivot { index: j, value: pivot });
                pivot = floor;
            }

            let diag = pivot.sqrt();
            l[(j, j)] = diag;

            for i in (j + 1)..n {
                let mut sum = a[(i, j)];
                for k in 0..j {
                    sum -= l[(i, k)] * l[(j, k)];
                }
                l[(i, j)] = sum / diag;
            }
        }

        Ok(Self { l, clamped })
    }

    /// Solve A·x = b with L·y = b then Lᵗ·x = y
    ///
    /// Fails only if a diagonal entry of L is zero.
    pub fn solve(&self, b: &Vector) -> Result<Vector, PivotFailure> {
        self.l
            .solve_lower_triangular(b)
            .and_then(|y| self.l.tr_solve_lower_triangular(&y))
            .ok_or_else(|| self.zero_pivot())
    }

    fn zero_pivot(&self) -> PivotFailure {
        let index = self.l.diagonal().iter().position(|d| *d == 0.0).unwrap_or(0);
        PivotFailure { index, value: 0.0 }
    }

    /// The lower-triangular factor
    pub fn l(&self) -> &Mat {
        &self.l
    }

    /// Pivots that were raised to the floor
    pub fn clamped_pivots(&self) -> &[ClampedPivot] {
        &self.clamped
    }
}
