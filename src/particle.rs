//! Beam particle fields.
//!
//! A [`ParticleField`] is an ensemble of point records visualizing the light
//! between two mirrors. Every resample redraws each particle independently:
//! a fresh uniform position inside the sampling volume, and a color looked
//! up from the beam intensity at that position. There is no simulated
//! dynamics and no identity beyond slot reuse.
//!
//! Sampling inputs arrive as an immutable [`FieldSnapshot`] assembled by the
//! caller from the live scene, so the resampling loop never reaches into
//! scene state itself.
//!
//! The RNG is a hand-rolled xorshift64 to keep resampling deterministic for
//! a given seed across platforms.

use glam::Vec3;

use crate::colormap::ColorRamp;
use crate::error::{Error, Result};
use crate::optics::GaussianBeam;

/// A single resampled particle slot.
#[derive(Debug, Clone, Copy)]
pub struct ParticleRecord {
    pub position: Vec3,
    pub color: [f32; 4],
}

impl Default for ParticleRecord {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: [0.0; 4],
        }
    }
}

/// Axis-aligned sampling volume around a beam axis running along X.
///
/// Radial offsets are measured from the `(axis_y, axis_z)` line; the axial
/// coordinate is the particle's x position.
#[derive(Debug, Clone, Copy)]
pub struct BeamVolume {
    pub min: Vec3,
    pub max: Vec3,
    pub axis_y: f32,
    pub axis_z: f32,
}

/// Immutable per-tick sampling inputs, derived from the bracketing scene
/// objects before resampling starts.
#[derive(Debug, Clone, Copy)]
pub struct FieldSnapshot {
    pub volume: BeamVolume,
    /// Spatial frequency `k` of the `cos(k d)^2` standing-wave factor, when
    /// the beam is reflected between two visible end mirrors.
    pub standing_wave: Option<f32>,
}

/// An ensemble of beam particles.
#[derive(Debug, Clone)]
pub struct ParticleField {
    records: Vec<ParticleRecord>,
    rng_state: u64,
    seed: u64,
}

impl ParticleField {
    /// Create an ensemble of `count` particles.
    pub fn new(count: usize, seed: u64) -> Result<Self> {
        if count == 0 {
            return Err(Error::invalid("particle count must be > 0"));
        }

        // xorshift is degenerate at 0; fall back to a fixed non-zero seed.
        let seed = if seed == 0 { 0x5DEECE66D } else { seed };

        Ok(Self {
            records: vec![ParticleRecord::default(); count],
            rng_state: seed,
            seed,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// Restart the deterministic sampling sequence.
    pub fn reset(&mut self) {
        self.rng_state = self.seed;
        self.records.fill(ParticleRecord::default());
    }

    /// Redraw every particle from the snapshot.
    ///
    /// O(len) with no inter-particle dependency. Intensities stay within the
    /// ramp's domain by construction, so the color lookup cannot fault.
    pub fn resample(&mut self, beam: &GaussianBeam, snapshot: &FieldSnapshot, ramp: &ColorRamp) {
        let volume = &snapshot.volume;
        let mut state = self.rng_state;

        for slot in &mut self.records {
            let x = uniform(&mut state, volume.min.x, volume.max.x);
            let y = uniform(&mut state, volume.min.y, volume.max.y);
            let z = uniform(&mut state, volume.min.z, volume.max.z);

            let r = ((y - volume.axis_y).powi(2) + (z - volume.axis_z).powi(2)).sqrt();
            let d = x;

            let mut intensity = beam.intensity(r, d);
            if let Some(k) = snapshot.standing_wave {
                intensity *= (k * d).cos().powi(2);
            }

            slot.position = Vec3::new(x, y, z);
            slot.color = ramp.sample(intensity);
        }

        self.rng_state = state;
    }
}

fn next_unit(state: &mut u64) -> f32 {
    *state ^= *state << 13;
    *state ^= *state >> 7;
    *state ^= *state << 17;
    (*state as f32) / (u64::MAX as f32)
}

/// Uniform draw between `a` and `b` (in either order).
pub(crate) fn uniform(state: &mut u64, a: f32, b: f32) -> f32 {
    a + next_unit(state) * (b - a)
}
