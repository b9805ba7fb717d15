//! Concrete experiment scripts.
//!
//! Each function assembles one presentation: materials and ground through
//! the composer, bench hardware through a closure builder, and the narrative
//! as a cue table. These are instantiations of the machinery in the rest of
//! the crate; adding another experiment means writing another function like
//! these two.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::builder::{
    GlassMaterial, GridMaterial, Ground, Lambda, MetalMaterial, SceneComposer, StandardMaterial,
};
use crate::colormap::ColorRamp;
use crate::error::Result;
use crate::heightfield::{Displacement, SurfaceGrid};
use crate::material::theme;
use crate::mesh::Axis;
use crate::narrative::{Cue, PoseOverride, Script};
use crate::optics::GaussianBeam;
use crate::particle::{self, ParticleField};
use crate::presentation::{BeamParticles, Presentation};
use crate::scene::{Geometry, Scene};

/// Laser, two mirrors, and a particle beam between them.
///
/// Step 1 reveals the laser, step 3 the mirrors (turning the traveling beam
/// into a standing wave), step 4 swaps the particle cloud for the
/// interference heightfield.
pub fn simple_bench(particle_count: usize, seed: u64) -> Result<Presentation> {
    let beam = GaussianBeam::new(2e-2, 1000e-9)?;
    let standing_frequency = 50.0 * PI;

    let mut scene = Scene::new();
    SceneComposer::new()
        .register(GridMaterial::new("grid", theme::BACKGROUND))
        .register(GlassMaterial::new("glass", theme::GLASS))
        .register(MetalMaterial::new("metal", theme::METAL))
        .register(StandardMaterial::new("standard", theme::GLASS))
        .register(Ground::new("grid", "grid"))
        .register(
            Lambda::new("bench", move |scene: &mut Scene| {
                scene.add_mesh(
                    "laser",
                    Geometry::Cylinder {
                        height: 0.1,
                        diameter: 0.05,
                    },
                    Some("metal"),
                )?;
                let laser = scene.get_mut_by_name("laser")?;
                laser.transform.rotation.z = FRAC_PI_2;
                laser.transform.position = Vec3::new(-0.45, 0.05, 0.0);
                laser.visible = false;

                scene.add_mesh("mirror1", Geometry::Plane { size: 0.1 }, Some("glass"))?;
                let mirror1 = scene.get_mut_by_name("mirror1")?;
                mirror1.transform.rotation.y = FRAC_PI_2;
                mirror1.transform.position = Vec3::new(-0.39, 0.05, 0.0);
                mirror1.visible = false;

                scene.instance("mirror1", "mirror2")?;
                scene.get_mut_by_name("mirror2")?.transform.position.x = 0.5;

                scene.add_mesh(
                    "particles",
                    Geometry::ParticleCloud {
                        count: particle_count,
                    },
                    None,
                )?;

                let mut fringes = SurfaceGrid::ground(0.89, 0.1, 500)?;
                fringes.displace(&Displacement::CosineSquared {
                    amplitude: 0.01,
                    spatial_frequency: standing_frequency,
                });
                scene.add_mesh("interference", Geometry::Heightfield(fringes), Some("standard"))?;
                let interference = scene.get_mut_by_name("interference")?;
                interference.transform.position = Vec3::new(0.055, 0.05, 0.0);
                interference.visible = false;

                Ok(())
            })
            .with_requires(&["metal", "glass", "standard"]),
        )
        .compose(&mut scene)?;

    let script = Script::new()
        .at(
            0,
            vec![
                Cue::hide("laser"),
                Cue::hide("mirror1"),
                Cue::hide("mirror2"),
                Cue::hide("interference"),
                Cue::show("particles"),
            ],
        )
        .at(1, vec![Cue::show("laser")])
        .at(3, vec![Cue::show("mirror1"), Cue::show("mirror2")])
        .at(4, vec![Cue::hide("particles"), Cue::show("interference")]);

    Ok(Presentation::new(scene, script).with_beam_particles(BeamParticles {
        field: ParticleField::new(particle_count, seed)?,
        entity: "particles".into(),
        beam,
        ramp: ColorRamp::viridis(),
        mirrors: ("mirror1".into(), "mirror2".into()),
        y_range: (0.03, 0.07),
        z_range: (-0.025, 0.025),
        standing_frequency,
        gate_step: 1,
    }))
}

const ATOM_COUNT: usize = 50;

fn atom_name(i: usize) -> String {
    format!("atom{i:02}")
}

/// Crossed beam lines building up to an optical lattice with trapped atoms.
///
/// Steps 1-4 assemble the beams and mirrors, 5-7 swap in the lattice
/// potential and the atom cloud, 8-14 walk through box, trap, barrier, and
/// perturbation potentials, the moving ones driven by pose overrides.
pub fn lattice_bench() -> Result<Presentation> {
    let beam = GaussianBeam::new(150e-4, 30e-4)?;

    let mut scene = Scene::new();
    SceneComposer::new()
        .register(GridMaterial::new("grid", theme::BACKGROUND))
        .register(MetalMaterial::new("metal", theme::METAL))
        .register(StandardMaterial::new("glass", theme::GLASS).with_alpha(0.3))
        .register(StandardMaterial::new("standard", theme::GLASS))
        .register(Ground::new("grid", "grid"))
        .register(
            Lambda::new("bench", move |scene: &mut Scene| {
                scene.add_mesh(
                    "laser1",
                    Geometry::Cylinder {
                        height: 0.15,
                        diameter: 0.12,
                    },
                    Some("metal"),
                )?;
                let laser1 = scene.get_mut_by_name("laser1")?;
                laser1.transform.rotation.z = FRAC_PI_2;
                laser1.transform.position = Vec3::new(-0.6, 0.1, 0.0);

                scene.add_mesh(
                    "beam1a",
                    Geometry::BeamTube {
                        beam,
                        length: 1.0,
                        standing_frequency: None,
                    },
                    Some("standard"),
                )?;
                let beam1a = scene.get_mut_by_name("beam1a")?;
                beam1a.transform.rotation.y = FRAC_PI_2;
                beam1a.transform.position.y = 0.1;

                scene.add_mesh(
                    "beam1b",
                    Geometry::BeamTube {
                        beam,
                        length: 1.0,
                        standing_frequency: Some(100.0 * PI),
                    },
                    Some("standard"),
                )?;
                let beam1b = scene.get_mut_by_name("beam1b")?;
                beam1b.transform.rotation.y = FRAC_PI_2;
                beam1b.transform.position.y = 0.1;

                scene.add_mesh("mirror1", Geometry::Plane { size: 0.2 }, Some("metal"))?;
                let mirror1 = scene.get_mut_by_name("mirror1")?;
                mirror1.transform.rotation.y = FRAC_PI_2;
                mirror1.transform.position = Vec3::new(0.5, 0.1, 0.0);

                scene.instance("laser1", "laser2")?;
                let laser2 = scene.get_mut_by_name("laser2")?;
                laser2.transform.rotation.y = FRAC_PI_2;
                laser2.transform.position = Vec3::new(0.0, 0.1, -0.6);

                scene.instance("beam1b", "beam2b")?;
                scene.get_mut_by_name("beam2b")?.transform.rotation.y = 0.0;

                scene.instance("mirror1", "mirror2")?;
                scene.set_material("mirror2", "glass")?;
                let mirror2 = scene.get_mut_by_name("mirror2")?;
                mirror2.transform.rotation.y = 0.0;
                mirror2.transform.position = Vec3::new(0.0, 0.1, 0.5);

                let mut lattice = SurfaceGrid::ground(1.02, 1.02, 500)?;
                lattice.displace(&Displacement::CosineLattice {
                    amplitude: -0.05,
                    spatial_frequency: 10.0 * PI,
                });
                scene.add_mesh("potential", Geometry::Heightfield(lattice), Some("standard"))?;

                // Atom cloud snapped onto the lattice sites.
                let mut rng = 0x61746f6d; // deterministic layout
                scene.add_mesh(
                    &atom_name(0),
                    Geometry::Sphere { diameter: 0.03 },
                    Some("metal"),
                )?;
                for i in 0..ATOM_COUNT {
                    if i > 0 {
                        scene.instance(&atom_name(0), &atom_name(i))?;
                    }
                    let x = particle::uniform(&mut rng, -4.0, 4.0).round() / 10.0;
                    let z = particle::uniform(&mut rng, -4.0, 4.0).round() / 10.0;
                    scene.get_mut_by_name(&atom_name(i))?.transform.position = Vec3::new(x, 0.0, z);
                }

                scene.add_mesh(
                    "box",
                    Geometry::Cuboid {
                        width: 0.05,
                        height: 0.2,
                        depth: 0.5,
                    },
                    Some("standard"),
                )?;
                let potential_box = scene.get_mut_by_name("box")?;
                potential_box.transform.position.y = 0.05;
                potential_box.transform.rotation.y = FRAC_PI_2;

                scene.add_mesh(
                    "trap",
                    Geometry::Frame {
                        outer: 0.5,
                        inner: 0.4,
                        height: 0.2,
                    },
                    Some("standard"),
                )?;
                scene.get_mut_by_name("trap")?.transform.position.y = 0.05;

                scene.add_mesh(
                    "barrier",
                    Geometry::Cuboid {
                        width: 0.3,
                        height: 0.2,
                        depth: 0.3,
                    },
                    Some("standard"),
                )?;
                scene.get_mut_by_name("barrier")?.transform.position.y = 0.05;

                scene.add_mesh(
                    "perturbation",
                    Geometry::Cylinder {
                        height: 0.3,
                        diameter: 0.1,
                    },
                    Some("standard"),
                )?;
                scene.get_mut_by_name("perturbation")?.transform.position.y = 0.05;

                Ok(())
            })
            .with_requires(&["metal", "glass", "standard", "grid"]),
        )
        .compose(&mut scene)?;

    let mut baseline = vec![
        Cue::show("grid"),
        Cue::hide("beam1a"),
        Cue::hide("beam1b"),
        Cue::hide("beam2b"),
        Cue::hide("laser1"),
        Cue::hide("laser2"),
        Cue::hide("mirror1"),
        Cue::hide("mirror2"),
        Cue::hide("potential"),
        Cue::hide("box"),
        Cue::hide("trap"),
        Cue::hide("barrier"),
        Cue::hide("perturbation"),
    ];
    for i in 0..ATOM_COUNT {
        baseline.push(Cue::hide(atom_name(i)));
    }

    // Step 5 clears the optics bench back to the empty grid before the
    // potential-surface act begins.
    let teardown = baseline.clone();

    let mut script = Script::new()
        .at(0, baseline)
        .at(1, vec![Cue::show("laser1"), Cue::show("mirror1")])
        .at(
            2,
            vec![
                Cue::show("beam1a"),
                Cue::hide("beam1b"),
                Cue::set_material("mirror1", "metal"),
            ],
        )
        .at(
            3,
            vec![
                Cue::hide("beam1a"),
                Cue::show("beam1b"),
                Cue::hide("beam2b"),
                Cue::hide("laser2"),
                Cue::hide("mirror2"),
                Cue::set_material("mirror1", "glass"),
            ],
        )
        .at(
            4,
            vec![
                Cue::show("beam1b"),
                Cue::show("beam2b"),
                Cue::show("laser1"),
                Cue::show("laser2"),
                Cue::show("mirror1"),
                Cue::show("mirror2"),
            ],
        )
        .at(5, teardown)
        .at(6, vec![Cue::hide("grid"), Cue::show("potential")])
        .at(9, vec![Cue::show("box")])
        .at(
            10,
            vec![
                Cue::show("box"),
                Cue::pose(
                    "box",
                    PoseOverride::Oscillate {
                        axis: Axis::Z,
                        amplitude: 0.3,
                        angular_frequency: 1.0,
                    },
                ),
                Cue::hide("trap"),
                Cue::hide("barrier"),
            ],
        )
        .at(11, vec![Cue::hide("box"), Cue::show("trap")])
        .at(
            12,
            vec![Cue::pose(
                "trap",
                PoseOverride::PulseScale {
                    axes: vec![Axis::X, Axis::Z],
                    bias: 0.5,
                    angular_frequency: 1.0,
                },
            )],
        )
        .at(
            13,
            vec![
                Cue::hide("trap"),
                Cue::hide("box"),
                Cue::show("barrier"),
                Cue::hide("perturbation"),
            ],
        )
        .at(
            14,
            vec![
                Cue::hide("barrier"),
                Cue::show("perturbation"),
                Cue::pose(
                    "perturbation",
                    PoseOverride::Oscillate {
                        axis: Axis::X,
                        amplitude: 0.1,
                        angular_frequency: 2.0,
                    },
                ),
            ],
        );

    for i in 0..ATOM_COUNT {
        script.push(7, Cue::show(atom_name(i)));
        script.push(8, Cue::hide(atom_name(i)));
    }
    script.push(8, Cue::hide("box"));

    Ok(Presentation::new(scene, script))
}
