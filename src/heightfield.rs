//! Heightfield surfaces driven by closed-form potentials.
//!
//! A [`SurfaceGrid`] is a rectangular subdivided plane with a fixed index
//! topology. Displacing it rewrites every vertex's Y from a pure function of
//! `(x, z)` and recomputes the normals; X, Z, and the index buffer never
//! change after creation, so a displaced grid can be re-uploaded into the
//! same mesh resource. Displacement replaces Y rather than accumulating, so
//! re-running a static potential every tick is harmless.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::mesh::Vertex;
use crate::optics::GaussianBeam;

/// A parameterized vertical displacement, evaluated at `(x, z)`.
#[derive(Debug, Clone)]
pub enum Displacement {
    /// `A * cos(k x)^2`, interference fringes along one axis.
    CosineSquared {
        amplitude: f32,
        spatial_frequency: f32,
    },

    /// `A * (cos(k x)^2 + cos(k z)^2)`, a two-dimensional optical lattice.
    CosineLattice {
        amplitude: f32,
        spatial_frequency: f32,
    },

    /// `A * sin(k x)^2 * sin(k z)^2`, the product-form lattice.
    SineLatticeProduct {
        amplitude: f32,
        spatial_frequency: f32,
    },

    /// Beam waist envelope along X, optionally pinched by a standing wave.
    BeamEnvelope {
        beam: GaussianBeam,
        standing_frequency: Option<f32>,
    },
}

impl Displacement {
    /// Evaluate the displacement at a grid point.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        match self {
            Displacement::CosineSquared {
                amplitude,
                spatial_frequency,
            } => amplitude * (spatial_frequency * x).cos().powi(2),

            Displacement::CosineLattice {
                amplitude,
                spatial_frequency,
            } => {
                let cx = (spatial_frequency * x).cos();
                let cz = (spatial_frequency * z).cos();
                amplitude * (cx * cx + cz * cz)
            }

            Displacement::SineLatticeProduct {
                amplitude,
                spatial_frequency,
            } => {
                let sx = (spatial_frequency * x).sin();
                let sz = (spatial_frequency * z).sin();
                amplitude * sx * sx * sz * sz
            }

            Displacement::BeamEnvelope {
                beam,
                standing_frequency,
            } => {
                let mut height = beam.waist(x);
                if let Some(k) = standing_frequency {
                    height *= (k * x).cos().powi(2);
                }
                height
            }
        }
    }
}

/// A rectangular subdivided plane, Y-up, centered at the origin.
///
/// Positions and normals are stride-3 flat buffers (`x, y, z` per vertex);
/// the index buffer is fixed at creation.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    positions: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
}

impl SurfaceGrid {
    /// Build a flat `width` x `depth` grid with `subdivisions` quads per side.
    pub fn ground(width: f32, depth: f32, subdivisions: u32) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 || !depth.is_finite() || depth <= 0.0 {
            return Err(Error::invalid(format!(
                "ground extent must be > 0, got {width} x {depth}"
            )));
        }
        if subdivisions == 0 {
            return Err(Error::invalid("ground needs at least one subdivision"));
        }

        let n = subdivisions as usize;
        let side = n + 1;
        let mut positions = Vec::with_capacity(side * side * 3);

        for iz in 0..side {
            let z = depth * (iz as f32 / n as f32 - 0.5);
            for ix in 0..side {
                let x = width * (ix as f32 / n as f32 - 0.5);
                positions.extend_from_slice(&[x, 0.0, z]);
            }
        }

        let mut indices = Vec::with_capacity(n * n * 6);
        for iz in 0..n {
            for ix in 0..n {
                let a = (iz * side + ix) as u32;
                let b = a + 1;
                let c = a + side as u32;
                let d = c + 1;

                // CCW seen from +Y
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        let mut normals = vec![0.0; positions.len()];
        for i in (1..normals.len()).step_by(3) {
            normals[i] = 1.0;
        }

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Rewrite every vertex's Y from `height(x, z)` and refresh the normals.
    pub fn displace(&mut self, displacement: &Displacement) {
        self.displace_with(|x, z| displacement.height(x, z));
    }

    /// Same as [`displace`](Self::displace) with an arbitrary pure function.
    pub fn displace_with(&mut self, height: impl Fn(f32, f32) -> f32) {
        for i in (0..self.positions.len()).step_by(3) {
            let x = self.positions[i];
            let z = self.positions[i + 2];
            self.positions[i + 1] = height(x, z);
        }

        recompute_normals(&self.positions, &self.indices, &mut self.normals);
    }

    /// Interleave the buffers into Pod vertices for upload.
    pub fn to_vertices(&self, color: [f32; 3]) -> Vec<Vertex> {
        (0..self.vertex_count())
            .map(|v| {
                let i = v * 3;
                Vertex::new(
                    [
                        self.positions[i],
                        self.positions[i + 1],
                        self.positions[i + 2],
                    ],
                    [self.normals[i], self.normals[i + 1], self.normals[i + 2]],
                    color,
                )
            })
            .collect()
    }
}

/// Accumulate per-face normals at shared vertices and normalize.
///
/// The unnormalized cross product weights each face by its area. Degenerate
/// vertices fall back to +Y so a heightfield always stays outward-oriented.
fn recompute_normals(positions: &[f32], indices: &[u32], normals: &mut [f32]) {
    normals.fill(0.0);

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize * 3, tri[1] as usize * 3, tri[2] as usize * 3];

        let pa = Vec3::new(positions[a], positions[a + 1], positions[a + 2]);
        let pb = Vec3::new(positions[b], positions[b + 1], positions[b + 2]);
        let pc = Vec3::new(positions[c], positions[c + 1], positions[c + 2]);

        let face = (pb - pa).cross(pc - pa);

        for base in [a, b, c] {
            normals[base] += face.x;
            normals[base + 1] += face.y;
            normals[base + 2] += face.z;
        }
    }

    for i in (0..normals.len()).step_by(3) {
        let n = Vec3::new(normals[i], normals[i + 1], normals[i + 2]);
        let n = if n.length_squared() > 1e-12 {
            n.normalize()
        } else {
            Vec3::Y
        };

        normals[i] = n.x;
        normals[i + 1] = n.y;
        normals[i + 2] = n.z;
    }
}
