//! Character controller: turns input, camera orientation, and the ground
//! probe into forces, jump impulses, and velocity damping each frame.

use nalgebra::Vector3;
use rapier3d::prelude::RigidBodyHandle;

use super::constants::character as consts;
use super::constants::physics::EPSILON;
use super::ground::GroundSensor;
use super::input::InputState;
use super::physics::PhysicsWorld;
use super::scene::{NodeId, Scene};
use crate::config::CharacterSettings;

/// Per-frame controller result consumed by the animation machine
#[derive(Debug, Clone, Copy)]
pub struct ControllerFrame {
    /// Movement intent was non-zero this frame
    pub moving: bool,
    /// A jump impulse fired this frame
    pub jumped: bool,
}

/// Owns the character's physics body and drives it from input. Created only
/// once the character model resolves; until then the experience simply has
/// no controller to run.
pub struct CharacterController {
    pub settings: CharacterSettings,
    pub body: RigidBodyHandle,
    /// Visual node mirroring the body, offset down by half the collider
    /// height (visual origin at the feet, physics origin at the center)
    pub node: NodeId,
    pub grounded: bool,
    pub jumps_taken: u32,
    /// Simulation-clock stamp of the last jump impulse
    pub last_jump_time: f32,
    pub yaw: f32,
}

impl CharacterController {
    pub fn new(settings: CharacterSettings, body: RigidBodyHandle, node: NodeId) -> Self {
        Self {
            settings,
            body,
            node,
            grounded: false,
            jumps_taken: 0,
            // Far enough in the past that the first jump is never gated
            last_jump_time: f32::NEG_INFINITY,
            yaw: 0.0,
        }
    }

    /// Runs one controller frame. `now` is the accumulated simulation clock
    /// in seconds; the ground probe must happen first since both the jump
    /// reset and speed selection depend on it.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        input: &InputState,
        sensor: &GroundSensor,
        camera_forward: [f32; 3],
        now: f32,
    ) -> ControllerFrame {
        self.grounded = sensor.probe(physics, self.body);

        // Jump count recovers only on contact with walkable ground
        if self.grounded {
            self.jumps_taken = 0;
        }

        let world_dir = world_move_direction(move_intent(input), camera_forward);

        let speed = if self.grounded {
            self.settings.ground_speed
        } else {
            self.settings.air_speed
        };
        let drive = match world_dir {
            Some(dir) => [dir[0] * speed, 0.0, dir[2] * speed],
            None => [0.0, 0.0, 0.0],
        };
        physics.set_character_drive(self.body, drive);

        if let Some(dir) = world_dir {
            let target = dir[0].atan2(dir[2]);
            self.yaw = lerp_yaw(self.yaw, target, consts::YAW_SMOOTHING);
        }

        let mut jumped = false;
        if input.jump
            && self.jumps_taken < self.settings.max_jumps
            && now - self.last_jump_time > self.settings.jump_cooldown
        {
            physics.apply_jump_impulse(self.body, self.settings.jump_impulse);
            self.jumps_taken += 1;
            self.last_jump_time = now;
            jumped = true;
        }

        // Damping runs every frame regardless of input; with near-zero
        // contact friction this is what brings the character to rest
        let damping = if self.grounded {
            self.settings.ground_damping
        } else {
            self.settings.air_damping
        };
        physics.damp_horizontal_velocity(self.body, damping);

        if let Some(pos) = physics.get_position(self.body) {
            if let Some(node) = scene.node_mut(self.node) {
                node.position = [pos[0], pos[1] - self.settings.height / 2.0, pos[2]];
                node.yaw = self.yaw;
            }
        }

        ControllerFrame {
            moving: world_dir.is_some(),
            jumped,
        }
    }
}

/// Raw 2D move intent from the directional keys. Axes are independent, so a
/// diagonal reaches length sqrt(2) before normalization.
fn move_intent(input: &InputState) -> [f32; 2] {
    let mut x = 0.0;
    let mut z = 0.0;
    if input.forward {
        z -= 1.0;
    }
    if input.back {
        z += 1.0;
    }
    if input.left {
        x -= 1.0;
    }
    if input.right {
        x += 1.0;
    }
    [x, z]
}

/// Reprojects normalized intent into world space using the camera's
/// Y-flattened forward and the derived right vector, decoupling movement
/// from character facing. Returns None for zero intent or a camera looking
/// straight up or down.
pub(crate) fn world_move_direction(intent: [f32; 2], camera_forward: [f32; 3]) -> Option<[f32; 3]> {
    let len = (intent[0] * intent[0] + intent[1] * intent[1]).sqrt();
    if len < EPSILON {
        return None;
    }
    let ix = intent[0] / len;
    let iz = intent[1] / len;

    let mut forward = Vector3::new(camera_forward[0], 0.0, camera_forward[2]);
    if forward.magnitude() < EPSILON {
        return None;
    }
    forward.normalize_mut();
    let right = forward.cross(&Vector3::y());

    let dir = right * ix - forward * iz;
    Some([dir.x, dir.y, dir.z])
}

/// Shortest-arc exponential yaw interpolation
fn lerp_yaw(current: f32, target: f32, factor: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut delta = (target - current).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    current + delta * factor
}
