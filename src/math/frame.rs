//! Element matrices and coordinate transformation for the 3D frame element
//!
//! Local DOF order per node is [u, v, w, θx, θy, θz]; the start node
//! occupies 0..6 and the end node 6..12.

use super::{LocalAxes, Mat12};

/// Set a coefficient and its mirror across the diagonal
fn set_sym(m: &mut Mat12, i: usize, j: usize, value: f64) {
    m[(i, j)] = value;
    m[(j, i)] = value;
}

/// Local 12x12 Euler-Bernoulli stiffness matrix
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `j` - Torsional constant
/// * `length` - Element length
pub fn local_stiffness(e: f64, g: f64, a: f64, iy: f64, iz: f64, j: f64, length: f64) -> Mat12 {
    let l = length;
    let mut k = Mat12::zeros();

    // Axial and torsion share the two-term bar pattern
    for (dof, value) in [(0, e * a / l), (3, g * j / l)] {
        set_sym(&mut k, dof, dof, value);
        set_sym(&mut k, dof + 6, dof + 6, value);
        set_sym(&mut k, dof, dof + 6, -value);
    }

    // Bending about local z: v (1, 7), θz (5, 11)
    let ei = e * iz;
    set_sym(&mut k, 1, 1, 12.0 * ei / l.powi(3));
    set_sym(&mut k, 7, 7, 12.0 * ei / l.powi(3));
    set_sym(&mut k, 1, 7, -12.0 * ei / l.powi(3));
    set_sym(&mut k, 1, 5, 6.0 * ei / l.powi(2));
    set_sym(&mut k, 1, 11, 6.0 * ei / l.powi(2));
    set_sym(&mut k, 7, 5, -6.0 * ei / l.powi(2));
    set_sym(&mut k, 7, 11, -6.0 * ei / l.powi(2));
    set_sym(&mut k, 5, 5, 4.0 * ei / l);
    set_sym(&mut k, 11, 11, 4.0 * ei / l);
    set_sym(&mut k, 5, 11, 2.0 * ei / l);

    // Bending about local y: w (2, 8), θy (4, 10); rotation coupling flips sign
    let ei = e * iy;
    set_sym(&mut k, 2, 2, 12.0 * ei / l.powi(3));
    set_sym(&mut k, 8, 8, 12.0 * ei / l.powi(3));
    set_sym(&mut k, 2, 8, -12.0 * ei / l.powi(3));
    set_sym(&mut k, 2, 4, -6.0 * ei / l.powi(2));
    set_sym(&mut k, 2, 10, -6.0 * ei / l.powi(2));
    set_sym(&mut k, 8, 4, 6.0 * ei / l.powi(2));
    set_sym(&mut k, 8, 10, 6.0 * ei / l.powi(2));
    set_sym(&mut k, 4, 4, 4.0 * ei / l);
    set_sym(&mut k, 10, 10, 4.0 * ei / l);
    set_sym(&mut k, 4, 10, 2.0 * ei / l);

    k
}

/// Local 12x12 consistent mass matrix
///
/// Translational blocks use the cubic Hermite shape functions of the
/// stiffness formulation. The torsional block uses the polar mass moment of
/// inertia ρ·(Iy+Iz)·L in place of the axial ρ·A·L.
///
/// # Arguments
/// * `rho` - Mass density
/// * `a` - Cross-sectional area
/// * `iy`, `iz` - Second moments of area (torsional inertia)
/// * `length` - Element length
pub fn local_consistent_mass(rho: f64, a: f64, iy: f64, iz: f64, length: f64) -> Mat12 {
    let l = length;
    let ml = rho * a * l;
    let jl = rho * (iy + iz) * l;
    let mut m = Mat12::zeros();

    for (dof, total) in [(0, ml), (3, jl)] {
        set_sym(&mut m, dof, dof, total / 3.0);
        set_sym(&mut m, dof + 6, dof + 6, total / 3.0);
        set_sym(&mut m, dof, dof + 6, total / 6.0);
    }

    // (translation i, rotation i, translation j, rotation j, rotation sign)
    for (v1, r1, v2, r2, s) in [(1, 5, 7, 11, 1.0), (2, 4, 8, 10, -1.0)] {
        set_sym(&mut m, v1, v1, 13.0 * ml / 35.0);
        set_sym(&mut m, v2, v2, 13.0 * ml / 35.0);
        set_sym(&mut m, v1, v2, 9.0 * ml / 70.0);
        set_sym(&mut m, r1, r1, ml * l * l / 105.0);
        set_sym(&mut m, r2, r2, ml * l * l / 105.0);
        set_sym(&mut m, r1, r2, -ml * l * l / 140.0);
        set_sym(&mut m, v1, r1, s * 11.0 * ml * l / 210.0);
        set_sym(&mut m, v2, r2, -s * 11.0 * ml * l / 210.0);
        set_sym(&mut m, v1, r2, -s * 13.0 * ml * l / 420.0);
        set_sym(&mut m, v2, r1, s * 13.0 * ml * l / 420.0);
    }

    m
}

/// Block-diagonal 12x12 transformation from global to local coordinates
pub fn transformation_matrix(axes: &LocalAxes) -> Mat12 {
    let r = axes.rotation();
    let mut t = Mat12::zeros();
    for block in 0..4 {
        let offset = block * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(&r);
    }
    t
}

/// Rotate a local element matrix to global axes: Tᵗ·k·T
pub fn to_global(local: &Mat12, t: &Mat12) -> Mat12 {
    t.transpose() * local * t
}
