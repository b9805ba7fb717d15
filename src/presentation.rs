//! Per-tick orchestration of one experiment.
//!
//! A [`Presentation`] owns the composed scene, the narrative script, the
//! step/time state, and optionally a beam particle field. Each frame the
//! host calls [`tick`](Presentation::tick); within a tick the narrative
//! snapshot is applied first (particle gating reads flags it sets), then the
//! particle field is resampled from a fresh snapshot of the bracketing
//! mirrors. Everything completes synchronously inside the call.

use glam::Vec3;

use crate::colormap::ColorRamp;
use crate::error::Result;
use crate::narrative::{NarrativeState, Script, StepEvent};
use crate::optics::GaussianBeam;
use crate::particle::{BeamVolume, FieldSnapshot, ParticleField};
use crate::protocol;
use crate::scene::Scene;

/// A particle ensemble bound to the beam segment between two mirrors.
pub struct BeamParticles {
    pub field: ParticleField,
    /// Scene entity whose visibility tells the renderer to draw the records.
    pub entity: String,
    pub beam: GaussianBeam,
    pub ramp: ColorRamp,
    /// Bracketing mirror entity names.
    pub mirrors: (String, String),
    /// Transverse sampling bounds; the beam axis runs through their midpoints.
    pub y_range: (f32, f32),
    pub z_range: (f32, f32),
    /// Spatial frequency of the standing wave once both mirrors reflect.
    pub standing_frequency: f32,
    /// Resampling runs only while the narrative step is past this gate.
    pub gate_step: i32,
}

impl BeamParticles {
    /// Capture this tick's sampling inputs from the live scene. The standing
    /// wave applies only while both end mirrors are visible.
    fn field_snapshot(&self, scene: &Scene) -> Result<FieldSnapshot> {
        let near = scene.get_by_name(&self.mirrors.0)?;
        let far = scene.get_by_name(&self.mirrors.1)?;

        let x0 = near.transform.position.x;
        let x1 = far.transform.position.x;

        let standing = (near.visible && far.visible).then_some(self.standing_frequency);

        Ok(FieldSnapshot {
            volume: BeamVolume {
                min: Vec3::new(x0.min(x1), self.y_range.0, self.z_range.0),
                max: Vec3::new(x0.max(x1), self.y_range.1, self.z_range.1),
                axis_y: (self.y_range.0 + self.y_range.1) / 2.0,
                axis_z: (self.z_range.0 + self.z_range.1) / 2.0,
            },
            standing_wave: standing,
        })
    }
}

/// One experiment, ready to be driven by the host render loop.
pub struct Presentation {
    pub scene: Scene,
    pub script: Script,
    pub state: NarrativeState,
    pub beam_particles: Option<BeamParticles>,
}

impl Presentation {
    pub fn new(scene: Scene, script: Script) -> Self {
        Self {
            scene,
            script,
            state: NarrativeState::new(),
            beam_particles: None,
        }
    }

    pub fn with_beam_particles(mut self, beam_particles: BeamParticles) -> Self {
        self.beam_particles = Some(beam_particles);
        self
    }

    /// Feed one narrative event.
    pub fn step(&mut self, event: StepEvent) {
        self.state.apply(event);
    }

    /// Feed a key press. Returns whether the key was recognized.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match protocol::step_for_key(key) {
            Some(event) => {
                self.state.apply(event);
                true
            }
            None => false,
        }
    }

    /// Feed a cross-context message. Returns whether it moved the narrative.
    pub fn handle_message(&mut self, payload: &str) -> bool {
        match protocol::step_for_message(payload) {
            Some(event) => {
                self.state.apply(event);
                true
            }
            None => false,
        }
    }

    /// One cooperative frame tick: advance time, apply the narrative
    /// snapshot, then resample the gated particle field.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.state.advance_time(dt);
        self.script
            .apply(&mut self.scene, self.state.step, self.state.time)?;

        if let Some(bp) = &mut self.beam_particles {
            if self.state.step > bp.gate_step {
                let snapshot = bp.field_snapshot(&self.scene)?;
                bp.field.resample(&bp.beam, &snapshot, &bp.ramp);
            }
        }

        Ok(())
    }
}
