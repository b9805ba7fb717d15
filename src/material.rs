//! Material records and the registry builders populate.
//!
//! Materials are data: the external renderer decides how a grid, glass, or
//! metal surface is actually shaded. Scene code only cares about identity,
//! color, and the handful of parameters the optics scenes vary.

use std::collections::HashMap;

use crate::error::{Error, ResourceKind, Result};

/// Unique identifier for a material.
pub type MaterialId = String;

/// Scene color theme.
pub mod theme {
    pub const BACKGROUND: &str = "#f0f1eb";
    pub const GLASS: &str = "#007deb";
    pub const METAL: &str = "#b2cc99";
}

/// Shading families the optics scenes use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    /// Line grid over a solid background.
    Grid { ratio: f32 },
    /// Translucent dielectric.
    Glass { alpha: f32 },
    /// Metallic PBR surface.
    Metal { metallic: f32, roughness: f32 },
    /// Plain diffuse surface with optional transparency.
    Standard { alpha: f32 },
}

#[derive(Debug, Clone)]
pub struct Material {
    pub id: MaterialId,
    pub color: [f32; 4],
    pub kind: MaterialKind,
}

impl Material {
    pub fn new(id: impl Into<String>, color: [f32; 4], kind: MaterialKind) -> Self {
        Self {
            id: id.into(),
            color,
            kind,
        }
    }

    /// Effective opacity of this material.
    pub fn alpha(&self) -> f32 {
        match self.kind {
            MaterialKind::Glass { alpha } | MaterialKind::Standard { alpha } => alpha,
            MaterialKind::Grid { .. } | MaterialKind::Metal { .. } => 1.0,
        }
    }
}

/// Parse a `#rrggbb` hex color into RGBA with full alpha.
pub fn parse_hex_color(hex: &str) -> Result<[f32; 4]> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| Error::invalid(format!("hex color must start with '#': {hex}")))?;

    if digits.len() != 6 {
        return Err(Error::invalid(format!(
            "hex color must be 6 digits: {hex}"
        )));
    }

    let channel = |range: std::ops::Range<usize>| -> Result<f32> {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| Error::invalid(format!("bad hex digit in color: {hex}")))
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0])
}

/// Registry of named materials. Registration order is the builders' order.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<MaterialId, Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material. A second registration under the same id is a
    /// setup error, never a silent shadow.
    pub fn register(&mut self, material: Material) -> Result<()> {
        if self.materials.contains_key(&material.id) {
            return Err(Error::duplicate(ResourceKind::Material, &material.id));
        }
        self.materials.insert(material.id.clone(), material);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.materials.contains_key(id)
    }

    /// All registered material ids.
    pub fn ids(&self) -> Vec<&str> {
        self.materials.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000000").unwrap(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(parse_hex_color("#ffffff").unwrap(), [1.0, 1.0, 1.0, 1.0]);

        let glass = parse_hex_color(theme::GLASS).unwrap();
        assert_eq!(glass[0], 0.0);
        assert!((glass[1] - 125.0 / 255.0).abs() < 1e-6);
        assert!((glass[2] - 235.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_color_rejects_garbage() {
        assert!(parse_hex_color("007deb").is_err());
        assert!(parse_hex_color("#07deb").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = MaterialRegistry::new();
        registry
            .register(Material::new(
                "glass",
                parse_hex_color(theme::GLASS).unwrap(),
                MaterialKind::Glass { alpha: 0.3 },
            ))
            .unwrap();

        assert!(registry.exists("glass"));
        assert!(!registry.exists("metal"));
        assert_eq!(registry.get("glass").unwrap().alpha(), 0.3);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = MaterialRegistry::new();
        let make = || {
            Material::new(
                "grid",
                [1.0; 4],
                MaterialKind::Grid { ratio: 0.1 },
            )
        };

        registry.register(make()).unwrap();
        assert!(matches!(
            registry.register(make()),
            Err(Error::DuplicateResource { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_opaque_kinds_report_full_alpha() {
        let metal = Material::new(
            "metal",
            [1.0; 4],
            MaterialKind::Metal {
                metallic: 1.0,
                roughness: 0.6,
            },
        );
        assert_eq!(metal.alpha(), 1.0);
    }
}
