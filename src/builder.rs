//! Scene fragment builders and the composer that runs them.
//!
//! A builder is an independently constructed unit of scene assembly: given
//! the shared scene exactly once, it registers named resources and returns.
//! Builders declare the resource names they depend on, and the composer
//! verifies those declarations before each build, so an ordering mistake
//! fails at setup with the offending builder named instead of surfacing
//! later as a dangling lookup.

use crate::error::{Error, ResourceKind, Result};
use crate::heightfield::SurfaceGrid;
use crate::material::{parse_hex_color, Material, MaterialKind};
use crate::scene::{Geometry, Scene};

/// One unit of scene assembly, invoked exactly once.
pub trait Builder {
    fn name(&self) -> &str;

    /// Resource names (materials or entities) that must exist before this
    /// builder runs.
    fn requires(&self) -> &[String] {
        &[]
    }

    fn build(&self, scene: &mut Scene) -> Result<()>;
}

/// Ordered builder registry. Composition happens once, synchronously,
/// before the render loop starts.
#[derive(Default)]
pub struct SceneComposer {
    builders: Vec<Box<dyn Builder>>,
}

impl SceneComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, builder: impl Builder + 'static) -> Self {
        self.builders.push(Box::new(builder));
        self
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Run every builder in registration order. Consuming `self` makes the
    /// one-shot contract structural: a composed registry cannot run again.
    pub fn compose(self, scene: &mut Scene) -> Result<()> {
        for builder in &self.builders {
            for required in builder.requires() {
                if !scene.has_material(required) && !scene.has_entity(required) {
                    return Err(Error::missing(
                        ResourceKind::Material,
                        format!("{required} (required by builder '{}')", builder.name()),
                    ));
                }
            }

            log::debug!("building scene fragment '{}'", builder.name());
            builder.build(scene)?;
        }

        Ok(())
    }
}

/// Closure builder for one-off scene fragments.
pub struct Lambda {
    name: String,
    requires: Vec<String>,
    build: Box<dyn Fn(&mut Scene) -> Result<()>>,
}

impl Lambda {
    pub fn new(
        name: impl Into<String>,
        build: impl Fn(&mut Scene) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
            build: Box::new(build),
        }
    }

    pub fn with_requires(mut self, names: &[&str]) -> Self {
        self.requires = names.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Builder for Lambda {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[String] {
        &self.requires
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        (self.build)(scene)
    }
}

/// Registers a grid-line material.
pub struct GridMaterial {
    name: String,
    color: String,
}

impl GridMaterial {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Builder for GridMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        scene.register_material(Material::new(
            &self.name,
            parse_hex_color(&self.color)?,
            MaterialKind::Grid { ratio: 0.1 },
        ))
    }
}

/// Registers a translucent glass material.
pub struct GlassMaterial {
    name: String,
    color: String,
}

impl GlassMaterial {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Builder for GlassMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        scene.register_material(Material::new(
            &self.name,
            parse_hex_color(&self.color)?,
            MaterialKind::Glass { alpha: 0.3 },
        ))
    }
}

/// Registers a metallic PBR material.
pub struct MetalMaterial {
    name: String,
    color: String,
}

impl MetalMaterial {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Builder for MetalMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        scene.register_material(Material::new(
            &self.name,
            parse_hex_color(&self.color)?,
            MaterialKind::Metal {
                metallic: 1.0,
                roughness: 0.6,
            },
        ))
    }
}

/// Registers a plain diffuse material with optional transparency.
pub struct StandardMaterial {
    name: String,
    color: String,
    alpha: f32,
}

impl StandardMaterial {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            alpha: 1.0,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

impl Builder for StandardMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        scene.register_material(Material::new(
            &self.name,
            parse_hex_color(&self.color)?,
            MaterialKind::Standard { alpha: self.alpha },
        ))
    }
}

/// Adds a flat ground plane using a previously registered material.
pub struct Ground {
    name: String,
    requires: Vec<String>,
    width: f32,
    depth: f32,
}

impl Ground {
    pub fn new(name: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: vec![material.into()],
            width: 1.0,
            depth: 1.0,
        }
    }

    pub fn with_extent(mut self, width: f32, depth: f32) -> Self {
        self.width = width;
        self.depth = depth;
        self
    }
}

impl Builder for Ground {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[String] {
        &self.requires
    }

    fn build(&self, scene: &mut Scene) -> Result<()> {
        let grid = SurfaceGrid::ground(self.width, self.depth, 1)?;
        scene.add_mesh(
            &self.name,
            Geometry::Heightfield(grid),
            Some(&self.requires[0]),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::theme;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_compose_runs_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let tag = |label: &'static str, order: Rc<RefCell<Vec<&'static str>>>| {
            Lambda::new(label, move |_scene| {
                order.borrow_mut().push(label);
                Ok(())
            })
        };

        let mut scene = Scene::new();
        SceneComposer::new()
            .register(tag("first", order.clone()))
            .register(tag("second", order.clone()))
            .register(tag("third", order.clone()))
            .compose(&mut scene)
            .unwrap();

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_missing_requirement_aborts_composition() {
        let mut scene = Scene::new();
        let err = SceneComposer::new()
            .register(Ground::new("grid", "grid"))
            .compose(&mut scene)
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("grid"));
        assert!(message.contains("required by builder"));
        assert!(scene.is_empty(), "nothing may be built after the failure");
    }

    #[test]
    fn test_material_builders_register_their_kinds() {
        let mut scene = Scene::new();
        SceneComposer::new()
            .register(GridMaterial::new("grid", theme::BACKGROUND))
            .register(GlassMaterial::new("glass", theme::GLASS))
            .register(MetalMaterial::new("metal", theme::METAL))
            .register(StandardMaterial::new("standard", theme::GLASS).with_alpha(0.5))
            .compose(&mut scene)
            .unwrap();

        assert!(matches!(
            scene.material("grid").unwrap().kind,
            MaterialKind::Grid { .. }
        ));
        assert_eq!(scene.material("glass").unwrap().alpha(), 0.3);
        assert_eq!(scene.material("standard").unwrap().alpha(), 0.5);
        assert!(matches!(
            scene.material("metal").unwrap().kind,
            MaterialKind::Metal { .. }
        ));
    }

    #[test]
    fn test_ground_builds_on_existing_material() {
        let mut scene = Scene::new();
        SceneComposer::new()
            .register(GridMaterial::new("grid", theme::BACKGROUND))
            .register(Ground::new("grid", "grid"))
            .compose(&mut scene)
            .unwrap();

        // Material and entity namespaces are separate; both may be "grid".
        assert!(scene.has_material("grid"));
        assert!(scene.has_entity("grid"));
    }

    #[test]
    fn test_bad_hex_color_is_fatal() {
        let mut scene = Scene::new();
        let err = SceneComposer::new()
            .register(GlassMaterial::new("glass", "not-a-color"))
            .compose(&mut scene)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
