#![warn(missing_docs)]

//! Static material property tables.
//!
//! Engineering context attached to roughness reports: a report for an
//! additively manufactured part usually names the alloy it was printed
//! in. The tables here are reference data, not measurements; all values
//! are SI (Pa, kg/m^3, W/m.K, J/kg.K, S/m).

use serde::Serialize;

/// Mechanical, thermal, and electrical properties of a print material.
#[derive(Debug, Clone, Serialize)]
pub struct Material {
    /// Material designation.
    pub name: &'static str,
    /// Density (kg/m^3).
    pub density: f64,
    /// Ultimate tensile strength (Pa).
    pub tensile_strength: f64,
    /// Yield strength (Pa).
    pub yield_strength: f64,
    /// Elastic modulus (Pa).
    pub elastic_modulus: f64,
    /// Poisson's ratio (dimensionless).
    pub poisson_ratio: f64,
    /// Fatigue strength (Pa).
    pub fatigue_strength: f64,
    /// Thermal conductivity (W/m.K).
    pub thermal_conductivity: f64,
    /// Coefficient of thermal expansion (1/K).
    pub thermal_expansion: f64,
    /// Specific heat capacity (J/kg.K).
    pub specific_heat: f64,
    /// Electrical conductivity (S/m).
    pub electrical_conductivity: f64,
    /// Chemical composition as (element, weight percent).
    pub composition: &'static [(&'static str, f64)],
}

/// AlSi10Mg aluminium alloy, the common laser powder-bed-fusion alloy.
pub const ALSI10MG: Material = Material {
    name: "AlSi10Mg",
    density: 2.67e3,
    tensile_strength: 450e6,
    yield_strength: 285e6,
    elastic_modulus: 73.5e9,
    poisson_ratio: 0.33,
    fatigue_strength: 110e6,
    thermal_conductivity: 140.0,
    thermal_expansion: 21e-6,
    specific_heat: 915.0,
    electrical_conductivity: 2.1e6,
    composition: &[
        ("Si", 6.5),
        ("Mg", 0.45),
        ("Cu", 0.05),
        ("Fe", 0.15),
        ("Mn", 0.1),
        ("Ti", 0.05),
        ("Others", 0.25),
    ],
};

impl Material {
    /// Look up a material table by (case-insensitive) name.
    pub fn by_name(name: &str) -> Option<&'static Material> {
        ALL.iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .copied()
    }
}

/// Every known material table.
pub const ALL: &[&Material] = &[&ALSI10MG];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(Material::by_name("alsi10mg").is_some());
        assert!(Material::by_name("AlSi10Mg").is_some());
        assert!(Material::by_name("unobtainium").is_none());
    }

    #[test]
    fn alsi10mg_is_physically_plausible() {
        let m = &ALSI10MG;
        assert!(m.yield_strength < m.tensile_strength);
        assert!(m.poisson_ratio > 0.0 && m.poisson_ratio < 0.5);
        assert!(m.density > 2.0e3 && m.density < 3.0e3);
    }

    #[test]
    fn serializes_with_composition() {
        let json = serde_json::to_value(&ALSI10MG).unwrap();
        assert_eq!(json["name"], "AlSi10Mg");
        assert_eq!(json["composition"][0][0], "Si");
    }
}
