//! Scene graph for narrative-driven experiments.
//!
//! Entities reference shared geometry by id: duplicating a mirror or an atom
//! creates a lightweight instance with its own transform and visibility, not
//! a copy of the vertex data. All lookups are by name and fail loudly:
//! builder ordering determines what exists, and an ordering mistake should
//! never degrade into a silent absent reference.

use std::collections::HashMap;

use glam::Vec3;

use crate::error::{Error, ResourceKind, Result};
use crate::heightfield::SurfaceGrid;
use crate::material::{Material, MaterialId, MaterialRegistry};
use crate::optics::GaussianBeam;

/// Unique identifier for scene entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Unique identifier for shared geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

/// Transform component for scene entities.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3, // Euler angles in radians
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Renderable geometry. Parametric variants are realized by the renderer;
/// heightfields carry their vertex data; a particle cloud is the slot a
/// particle field's records fill each tick.
#[derive(Debug, Clone)]
pub enum Geometry {
    Cylinder {
        height: f32,
        diameter: f32,
    },
    Plane {
        size: f32,
    },
    Cuboid {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Hollow rectangular frame (outer minus inner footprint).
    Frame {
        outer: f32,
        inner: f32,
        height: f32,
    },
    Sphere {
        diameter: f32,
    },
    /// Tube along Z whose radius follows the beam waist.
    BeamTube {
        beam: GaussianBeam,
        length: f32,
        standing_frequency: Option<f32>,
    },
    Heightfield(SurfaceGrid),
    ParticleCloud {
        count: usize,
    },
}

/// A scene entity: shared geometry, optional material, own transform.
#[derive(Debug, Clone)]
pub struct SceneEntity {
    pub geometry: GeometryId,
    pub material: Option<MaterialId>,
    pub transform: Transform,
    pub visible: bool,
}

/// The scene: entity and geometry tables, a name index, and the material
/// registry builders populate.
#[derive(Debug, Default)]
pub struct Scene {
    geometries: HashMap<GeometryId, Geometry>,
    entities: HashMap<EntityId, SceneEntity>,
    names: HashMap<String, EntityId>,
    materials: MaterialRegistry,
    next_geometry: u64,
    next_entity: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // --- materials ---

    /// Register a material under its id. Duplicates are setup errors.
    pub fn register_material(&mut self, material: Material) -> Result<()> {
        self.materials.register(material)
    }

    pub fn material(&self, id: &str) -> Result<&Material> {
        self.materials
            .get(id)
            .ok_or_else(|| Error::missing(ResourceKind::Material, id))
    }

    pub fn has_material(&self, id: &str) -> bool {
        self.materials.exists(id)
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    // --- entities ---

    /// Add a named mesh. The material, if any, must already be registered.
    pub fn add_mesh(
        &mut self,
        name: &str,
        geometry: Geometry,
        material: Option<&str>,
    ) -> Result<EntityId> {
        if self.names.contains_key(name) {
            return Err(Error::duplicate(ResourceKind::Entity, name));
        }
        if let Some(id) = material {
            self.material(id)?;
        }

        let geometry_id = GeometryId(self.next_geometry);
        self.next_geometry += 1;
        self.geometries.insert(geometry_id, geometry);

        let entity_id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(
            entity_id,
            SceneEntity {
                geometry: geometry_id,
                material: material.map(str::to_owned),
                transform: Transform::default(),
                visible: true,
            },
        );
        self.names.insert(name.to_owned(), entity_id);

        Ok(entity_id)
    }

    /// Duplicate an entity as a lightweight instance: same geometry and
    /// material, its own copy of the transform and visibility.
    pub fn instance(&mut self, source: &str, name: &str) -> Result<EntityId> {
        if self.names.contains_key(name) {
            return Err(Error::duplicate(ResourceKind::Entity, name));
        }

        let copy = self.get_by_name(source)?.clone();

        let entity_id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(entity_id, copy);
        self.names.insert(name.to_owned(), entity_id);

        Ok(entity_id)
    }

    pub fn entity(&self, name: &str) -> Result<EntityId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::missing(ResourceKind::Entity, name))
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Result<&SceneEntity> {
        let id = self.entity(name)?;
        self.entities
            .get(&id)
            .ok_or_else(|| Error::missing(ResourceKind::Entity, name))
    }

    pub fn get_mut_by_name(&mut self, name: &str) -> Result<&mut SceneEntity> {
        let id = self.entity(name)?;
        self.entities
            .get_mut(&id)
            .ok_or_else(|| Error::missing(ResourceKind::Entity, name))
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        self.get_mut_by_name(name)?.visible = visible;
        Ok(())
    }

    pub fn is_visible(&self, name: &str) -> Result<bool> {
        Ok(self.get_by_name(name)?.visible)
    }

    /// Swap an entity's material. Both entity and material must exist.
    pub fn set_material(&mut self, name: &str, material: &str) -> Result<()> {
        self.material(material)?;
        self.get_mut_by_name(name)?.material = Some(material.to_owned());
        Ok(())
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        self.geometries.get_mut(&id)
    }

    /// Re-displace a heightfield entity in place. Callers drive the cadence:
    /// once for a static potential, every tick for an animated one. Instances
    /// sharing the geometry see the update too.
    pub fn displace_heightfield(
        &mut self,
        name: &str,
        height: impl Fn(f32, f32) -> f32,
    ) -> Result<()> {
        let id = self.get_by_name(name)?.geometry;
        match self.geometries.get_mut(&id) {
            Some(Geometry::Heightfield(grid)) => {
                grid.displace_with(height);
                Ok(())
            }
            _ => Err(Error::invalid(format!("entity '{name}' is not a heightfield"))),
        }
    }

    /// Iterate all named entities.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SceneEntity)> {
        self.names
            .iter()
            .filter_map(|(name, id)| self.entities.get(id).map(|e| (name.as_str(), e)))
    }

    /// Names of currently visible entities, sorted for stable output.
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .iter()
            .filter(|(_, e)| e.visible)
            .map(|(n, _)| n)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialKind;

    fn glass() -> Material {
        Material::new("glass", [0.0, 0.5, 0.9, 1.0], MaterialKind::Glass { alpha: 0.3 })
    }

    #[test]
    fn test_add_mesh_and_lookup() {
        let mut scene = Scene::new();
        scene.register_material(glass()).unwrap();

        let id = scene
            .add_mesh("mirror", Geometry::Plane { size: 0.1 }, Some("glass"))
            .unwrap();

        assert_eq!(scene.entity("mirror").unwrap(), id);
        assert!(scene.get(id).unwrap().visible);
        assert!(scene.is_visible("mirror").unwrap());
    }

    #[test]
    fn test_missing_material_fails_fast() {
        let mut scene = Scene::new();
        let err = scene
            .add_mesh("mirror", Geometry::Plane { size: 0.1 }, Some("glass"))
            .unwrap_err();

        assert!(matches!(err, Error::MissingResource { .. }));
        assert!(!scene.has_entity("mirror"));
    }

    #[test]
    fn test_missing_entity_is_an_error_not_a_null() {
        let scene = Scene::new();
        assert!(matches!(
            scene.entity("laser"),
            Err(Error::MissingResource { .. })
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut scene = Scene::new();
        scene
            .add_mesh("laser", Geometry::Cylinder { height: 0.1, diameter: 0.05 }, None)
            .unwrap();

        let err = scene
            .add_mesh("laser", Geometry::Plane { size: 1.0 }, None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateResource { .. }));
    }

    #[test]
    fn test_instance_shares_geometry() {
        let mut scene = Scene::new();
        scene.register_material(glass()).unwrap();

        scene
            .add_mesh("mirror1", Geometry::Plane { size: 0.1 }, Some("glass"))
            .unwrap();
        scene.get_mut_by_name("mirror1").unwrap().transform.position.x = -0.39;
        scene.set_visible("mirror1", false).unwrap();

        scene.instance("mirror1", "mirror2").unwrap();
        scene.get_mut_by_name("mirror2").unwrap().transform.position.x = 0.5;

        let m1 = scene.get_by_name("mirror1").unwrap();
        let m2 = scene.get_by_name("mirror2").unwrap();

        assert_eq!(m1.geometry, m2.geometry, "instances share geometry");
        assert!(!m2.visible, "instance copies visibility at creation");
        assert_eq!(m1.transform.position.x, -0.39);
        assert_eq!(m2.transform.position.x, 0.5);
    }

    #[test]
    fn test_set_material_checks_both_sides() {
        let mut scene = Scene::new();
        scene.register_material(glass()).unwrap();
        scene
            .add_mesh("mirror", Geometry::Plane { size: 0.1 }, Some("glass"))
            .unwrap();

        assert!(scene.set_material("mirror", "metal").is_err());
        assert!(scene.set_material("beam", "glass").is_err());
        assert!(scene.set_material("mirror", "glass").is_ok());
    }

    #[test]
    fn test_displace_heightfield_in_place() {
        let mut scene = Scene::new();
        let grid = SurfaceGrid::ground(1.0, 1.0, 4).unwrap();
        scene
            .add_mesh("potential", Geometry::Heightfield(grid), None)
            .unwrap();

        scene.displace_heightfield("potential", |_, _| 0.15).unwrap();

        let id = scene.get_by_name("potential").unwrap().geometry;
        let Some(Geometry::Heightfield(grid)) = scene.geometry(id) else {
            panic!("expected a heightfield");
        };
        for p in grid.positions().chunks_exact(3) {
            assert_eq!(p[1], 0.15);
        }

        // Only heightfields can be displaced.
        scene
            .add_mesh("mirror", Geometry::Plane { size: 0.1 }, None)
            .unwrap();
        assert!(scene.displace_heightfield("mirror", |_, _| 0.0).is_err());
        assert!(scene.displace_heightfield("ghost", |_, _| 0.0).is_err());
    }

    #[test]
    fn test_visible_names_sorted() {
        let mut scene = Scene::new();
        scene.add_mesh("b", Geometry::Sphere { diameter: 0.03 }, None).unwrap();
        scene.add_mesh("a", Geometry::Sphere { diameter: 0.03 }, None).unwrap();
        scene.add_mesh("c", Geometry::Sphere { diameter: 0.03 }, None).unwrap();
        scene.set_visible("c", false).unwrap();

        assert_eq!(scene.visible_names(), vec!["a", "b"]);
    }
}
