//! Dense linear algebra kernel for modal analysis
//!
//! Matrices and vectors are `nalgebra` dynamic types: a flat contiguous
//! buffer with explicit dimensions, checked on construction.

pub mod cholesky;
pub mod frame;
pub mod geometry;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, Vector3};

pub use cholesky::{CholeskyFactor, ClampedPivot, PivotFailure};
pub use frame::{local_consistent_mass, local_stiffness, to_global, transformation_matrix};
pub use geometry::LocalAxes;

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for frame element stiffness/mass/transformation
pub type Mat12 = SMatrix<f64, 12, 12>;

/// Mass-weighted inner product uᵗ·M·v
pub fn m_inner(m: &Mat, u: &Vector, v: &Vector) -> f64 {
    u.dot(&(m * v))
}

/// Rows and columns of `a` at `indices`, in the given order
pub fn select_submatrix(a: &Mat, indices: &[usize]) -> Mat {
    Mat::from_fn(indices.len(), indices.len(), |r, c| a[(indices[r], indices[c])])
}

/// Largest absolute asymmetry |a_ij − a_ji| relative to the largest entry
pub fn relative_asymmetry(a: &Mat) -> f64 {
    let scale = a.amax();
    if scale == 0.0 {
        return 0.0;
    }
    (a - a.transpose()).amax() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_m_inner_identity() {
        let m = Mat::identity(3, 3) * 2.0;
        let u = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!((m_inner(&m, &u, &u) - 28.0).abs() < 1e-12);
    }

    #[test]
    fn test_select_submatrix() {
        let a = Mat::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
        let sub = select_submatrix(&a, &[1, 3]);
        assert_eq!(sub[(0, 0)], 5.0);
        assert_eq!(sub[(0, 1)], 7.0);
        assert_eq!(sub[(1, 0)], 13.0);
        assert_eq!(sub[(1, 1)], 15.0);
    }

    #[test]
    fn test_relative_asymmetry() {
        let mut a = Mat::identity(2, 2);
        assert_eq!(relative_asymmetry(&a), 0.0);
        a[(0, 1)] = 0.5;
        assert!((relative_asymmetry(&a) - 0.5).abs() < 1e-12);
    }
}
