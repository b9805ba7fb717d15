//! Narrative state machine.
//!
//! A presentation advances through discrete steps. Each step carries a list
//! of cues, and the visible state at step `n` is the fold of every cue table
//! entry from 0 through `n`. That makes [`Script::snapshot`] a pure function
//! of the step: replaying the same step yields the same visible set, and
//! stepping backward genuinely restores earlier states. Steps past the last
//! table entry freeze at the final accumulated state.
//!
//! Pose overrides ([`PoseOverride`]) are the one time-dependent exception:
//! they are gated by the step but evaluated against the wall-clock
//! accumulator, so an oscillating potential keeps moving between steps.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::error::Result;
use crate::mesh::Axis;
use crate::scene::Scene;

/// Discrete narrative input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Advance,
    Retreat,
    Reset,
}

/// The step counter plus the wall-clock accumulator pose overrides read.
#[derive(Debug, Clone, Default)]
pub struct NarrativeState {
    pub step: i32,
    pub time: f32,
}

impl NarrativeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input event. Transitions are unit-granular; retreating at
    /// step 0 is a no-op rather than an underflow.
    pub fn apply(&mut self, event: StepEvent) {
        match event {
            StepEvent::Advance => self.step += 1,
            StepEvent::Retreat => {
                if self.step > 0 {
                    self.step -= 1;
                } else {
                    log::debug!("retreat at step 0 ignored");
                    return;
                }
            }
            StepEvent::Reset => self.step = 0,
        }
        log::debug!("narrative step -> {}", self.step);
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.time += dt;
    }
}

/// Time-driven pose override, gated by the step that introduces it.
#[derive(Debug, Clone, PartialEq)]
pub enum PoseOverride {
    /// `position[axis] = amplitude * cos(angular_frequency * t)`
    Oscillate {
        axis: Axis,
        amplitude: f32,
        angular_frequency: f32,
    },
    /// `scale[axis] = cos(angular_frequency * t)^2 + bias` on each listed axis.
    PulseScale {
        axes: Vec<Axis>,
        bias: f32,
        angular_frequency: f32,
    },
}

/// One visibility/pose change applied to a named entity.
#[derive(Debug, Clone, PartialEq)]
pub enum CueAction {
    Show,
    Hide,
    SetMaterial(String),
    MoveTo(Vec3),
    Pose(PoseOverride),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub target: String,
    pub action: CueAction,
}

impl Cue {
    pub fn show(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            action: CueAction::Show,
        }
    }

    pub fn hide(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            action: CueAction::Hide,
        }
    }

    pub fn set_material(target: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            action: CueAction::SetMaterial(material.into()),
        }
    }

    pub fn move_to(target: impl Into<String>, position: Vec3) -> Self {
        Self {
            target: target.into(),
            action: CueAction::MoveTo(position),
        }
    }

    pub fn pose(target: impl Into<String>, pose: PoseOverride) -> Self {
        Self {
            target: target.into(),
            action: CueAction::Pose(pose),
        }
    }
}

/// Accumulated state of one entity at a given step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectState {
    pub visible: Option<bool>,
    pub material: Option<String>,
    pub position: Option<Vec3>,
    pub pose: Option<PoseOverride>,
}

impl ObjectState {
    fn fold(&mut self, action: &CueAction) {
        match action {
            CueAction::Show => self.visible = Some(true),
            CueAction::Hide => self.visible = Some(false),
            CueAction::SetMaterial(id) => self.material = Some(id.clone()),
            CueAction::MoveTo(p) => self.position = Some(*p),
            CueAction::Pose(p) => self.pose = Some(p.clone()),
        }
    }
}

/// Declarative narrative table: step number to cue list.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: BTreeMap<i32, Vec<Cue>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step's cues, chaining style.
    pub fn at(mut self, step: i32, cues: Vec<Cue>) -> Self {
        self.steps.entry(step).or_default().extend(cues);
        self
    }

    pub fn push(&mut self, step: i32, cue: Cue) {
        self.steps.entry(step).or_default().push(cue);
    }

    /// Highest step with cues, if any.
    pub fn last_step(&self) -> Option<i32> {
        self.steps.keys().next_back().copied()
    }

    /// Fold the cue table from step 0 through `step` into per-entity state.
    ///
    /// Pure in `step`; past the last table entry the fold no longer changes.
    pub fn snapshot(&self, step: i32) -> BTreeMap<String, ObjectState> {
        let mut out: BTreeMap<String, ObjectState> = BTreeMap::new();

        for cues in self.steps.range(..=step).map(|(_, c)| c) {
            for cue in cues {
                out.entry(cue.target.clone()).or_default().fold(&cue.action);
            }
        }

        out
    }

    /// Apply the snapshot for `step` to the live scene. Called every tick;
    /// idempotent except for pose overrides, which read `time`.
    ///
    /// A cue naming an unknown entity or material is a programmer error in
    /// the script and propagates instead of being swallowed.
    pub fn apply(&self, scene: &mut Scene, step: i32, time: f32) -> Result<()> {
        for (target, state) in self.snapshot(step) {
            if let Some(visible) = state.visible {
                scene.set_visible(&target, visible)?;
            }
            if let Some(material) = &state.material {
                scene.set_material(&target, material)?;
            }
            if let Some(position) = state.position {
                scene.get_mut_by_name(&target)?.transform.position = position;
            }
            if let Some(pose) = &state.pose {
                let transform = &mut scene.get_mut_by_name(&target)?.transform;
                match pose {
                    PoseOverride::Oscillate {
                        axis,
                        amplitude,
                        angular_frequency,
                    } => {
                        let value = amplitude * (angular_frequency * time).cos();
                        set_axis(&mut transform.position, *axis, value);
                    }
                    PoseOverride::PulseScale {
                        axes,
                        bias,
                        angular_frequency,
                    } => {
                        let value = (angular_frequency * time).cos().powi(2) + bias;
                        for axis in axes {
                            set_axis(&mut transform.scale, *axis, value);
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn set_axis(v: &mut Vec3, axis: Axis, value: f32) {
    match axis {
        Axis::X => v.x = value,
        Axis::Y => v.y = value,
        Axis::Z => v.z = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Geometry;

    fn demo_script() -> Script {
        Script::new()
            .at(0, vec![Cue::hide("laser"), Cue::hide("mirror")])
            .at(1, vec![Cue::show("laser")])
            .at(3, vec![Cue::show("mirror")])
    }

    fn demo_scene() -> Scene {
        let mut scene = Scene::new();
        scene
            .add_mesh("laser", Geometry::Cylinder { height: 0.1, diameter: 0.05 }, None)
            .unwrap();
        scene
            .add_mesh("mirror", Geometry::Plane { size: 0.1 }, None)
            .unwrap();
        scene
    }

    #[test]
    fn test_events_are_unit_granular() {
        let mut state = NarrativeState::new();
        assert_eq!(state.step, 0);

        state.apply(StepEvent::Advance);
        state.apply(StepEvent::Advance);
        state.apply(StepEvent::Advance);
        assert_eq!(state.step, 3);

        state.apply(StepEvent::Retreat);
        assert_eq!(state.step, 2);

        state.apply(StepEvent::Reset);
        assert_eq!(state.step, 0);
    }

    #[test]
    fn test_retreat_clamps_at_zero() {
        let mut state = NarrativeState::new();
        state.apply(StepEvent::Retreat);
        assert_eq!(state.step, 0);
    }

    #[test]
    fn test_snapshot_is_pure() {
        let script = demo_script();
        assert_eq!(script.snapshot(2), script.snapshot(2));
        assert_eq!(script.snapshot(0), script.snapshot(0));
    }

    #[test]
    fn test_snapshot_accumulates_across_steps() {
        let script = demo_script();

        let at0 = script.snapshot(0);
        assert_eq!(at0["laser"].visible, Some(false));

        let at1 = script.snapshot(1);
        assert_eq!(at1["laser"].visible, Some(true));
        assert_eq!(at1["mirror"].visible, Some(false));

        // Step 2 has no cues; step 1's state persists.
        assert_eq!(script.snapshot(2), at1);

        let at3 = script.snapshot(3);
        assert_eq!(at3["mirror"].visible, Some(true));
        assert_ne!(at3, at0);
    }

    #[test]
    fn test_snapshot_freezes_past_last_step() {
        let script = demo_script();
        let last = script.last_step().unwrap();

        assert_eq!(script.snapshot(last), script.snapshot(last + 1));
        assert_eq!(script.snapshot(last), script.snapshot(last + 100));
    }

    #[test]
    fn test_apply_drives_scene_visibility() {
        let script = demo_script();
        let mut scene = demo_scene();

        script.apply(&mut scene, 0, 0.0).unwrap();
        assert!(!scene.is_visible("laser").unwrap());

        script.apply(&mut scene, 1, 0.0).unwrap();
        assert!(scene.is_visible("laser").unwrap());
        assert!(!scene.is_visible("mirror").unwrap());

        // Applying the same step twice changes nothing.
        script.apply(&mut scene, 1, 0.0).unwrap();
        assert!(scene.is_visible("laser").unwrap());
    }

    #[test]
    fn test_apply_rejects_unknown_target() {
        let script = Script::new().at(0, vec![Cue::show("ghost")]);
        let mut scene = demo_scene();

        assert!(script.apply(&mut scene, 0, 0.0).is_err());
    }

    #[test]
    fn test_move_to_places_the_target() {
        let script = Script::new()
            .at(0, vec![Cue::move_to("laser", Vec3::new(-0.45, 0.05, 0.0))])
            .at(2, vec![Cue::move_to("laser", Vec3::new(0.1, 0.05, 0.0))]);
        let mut scene = demo_scene();

        script.apply(&mut scene, 0, 0.0).unwrap();
        assert_eq!(
            scene.get_by_name("laser").unwrap().transform.position.x,
            -0.45
        );

        // The later cue overrides the earlier placement.
        script.apply(&mut scene, 2, 0.0).unwrap();
        assert_eq!(scene.get_by_name("laser").unwrap().transform.position.x, 0.1);
    }

    #[test]
    fn test_oscillate_follows_time_not_step() {
        let script = Script::new().at(
            1,
            vec![Cue::pose(
                "laser",
                PoseOverride::Oscillate {
                    axis: Axis::Z,
                    amplitude: 0.3,
                    angular_frequency: 1.0,
                },
            )],
        );
        let mut scene = demo_scene();

        script.apply(&mut scene, 1, 0.0).unwrap();
        let z0 = scene.get_by_name("laser").unwrap().transform.position.z;
        assert!((z0 - 0.3).abs() < 1e-6);

        script.apply(&mut scene, 1, std::f32::consts::PI).unwrap();
        let z1 = scene.get_by_name("laser").unwrap().transform.position.z;
        assert!((z1 + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_pulse_scale_stays_above_bias() {
        let script = Script::new().at(
            2,
            vec![Cue::pose(
                "mirror",
                PoseOverride::PulseScale {
                    axes: vec![Axis::X, Axis::Z],
                    bias: 0.5,
                    angular_frequency: 1.0,
                },
            )],
        );
        let mut scene = demo_scene();

        for i in 0..20 {
            script.apply(&mut scene, 2, i as f32 * 0.37).unwrap();
            let scale = &scene.get_by_name("mirror").unwrap().transform.scale;
            assert!(scale.x >= 0.5 && scale.x <= 1.5);
            assert_eq!(scale.x, scale.z);
            assert_eq!(scale.y, 1.0);
        }
    }
}
