//! Material properties

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Elastic and inertial material properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity in Pa
    pub e: f64,
    /// Shear modulus in Pa
    pub g: f64,
    /// Mass density in kg/m³
    pub rho: f64,
}

impl Material {
    /// Create a material from E, G and density
    pub fn new(e: f64, g: f64, rho: f64) -> Self {
        Self { e, g, rho }
    }

    /// Isotropic material, G = E / (2 (1 + nu))
    pub fn isotropic(e: f64, nu: f64, rho: f64) -> Self {
        Self::new(e, e / (2.0 * (1.0 + nu)), rho)
    }

    /// Structural steel
    pub fn steel() -> Self {
        Self::new(200e9, 77e9, 7850.0)
    }

    /// Normal-weight concrete from its compressive strength in Pa
    pub fn concrete(fc: f64) -> Self {
        // ACI estimate: E = 4700 sqrt(f'c) with f'c in MPa
        let e = 4700.0 * (fc / 1e6).sqrt() * 1e6;
        Self::isotropic(e, 0.2, 2400.0)
    }

    /// Reject non-physical values
    pub fn validate(&self, name: &str) -> SolverResult<()> {
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !positive(self.e) || !positive(self.g) {
            return Err(SolverError::InvalidInput(format!(
                "material '{}' must have positive E and G (E={}, G={})",
                name, self.e, self.g
            )));
        }
        if !(self.rho >= 0.0 && self.rho.is_finite()) {
            return Err(SolverError::InvalidInput(format!(
                "material '{}' has invalid density {}",
                name, self.rho
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotropic_material() {
        let mat = Material::isotropic(200e9, 0.3, 7850.0);
        let expected_g = 200e9 / (2.0 * 1.3);
        assert!((mat.g - expected_g).abs() < 1.0);
    }

    #[test]
    fn test_validate_rejects_zero_modulus() {
        assert!(Material::new(0.0, 1.0, 1.0).validate("bad").is_err());
        assert!(Material::new(1.0, 1.0, -1.0).validate("bad").is_err());
        assert!(Material::steel().validate("steel").is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Material::new(200e9, f64::INFINITY, 7850.0).validate("bad").is_err());
        assert!(Material::new(f64::NAN, 77e9, 7850.0).validate("bad").is_err());
        assert!(Material::new(200e9, 77e9, f64::INFINITY).validate("bad").is_err());
    }

    #[test]
    fn test_concrete_modulus() {
        let mat = Material::concrete(30e6);
        assert!((mat.e - 4700.0 * 30f64.sqrt() * 1e6).abs() < 1.0);
        assert!((mat.g - mat.e / 2.4).abs() < 1.0);
        assert!(mat.validate("C30").is_ok());
    }

    #[test]
    fn test_massless_material_is_valid() {
        assert!(Material::new(200e9, 77e9, 0.0).validate("massless").is_ok());
    }
}
