//! Ground sensor: classifies the surface under the character each frame.

use rapier3d::prelude::RigidBodyHandle;

use super::constants::ground as consts;
use super::physics::PhysicsWorld;

/// Downward probe sized for the character collider. Pure query; the result
/// feeds both movement speed selection and the jump-count reset, so it must
/// run before movement integration every frame.
#[derive(Debug, Clone, Copy)]
pub struct GroundSensor {
    half_height: f32,
}

impl GroundSensor {
    pub fn new(character_height: f32) -> Self {
        Self {
            half_height: character_height / 2.0,
        }
    }

    /// Casts a short ray down from slightly above the body center. Grounded
    /// means the ray hit a surface whose normal is aligned with world up
    /// within the walkable threshold; no hit means airborne.
    pub fn probe(&self, physics: &PhysicsWorld, body: RigidBodyHandle) -> bool {
        let Some(pos) = physics.get_position(body) else {
            return false;
        };
        let origin = [pos[0], pos[1] + consts::PROBE_LIFT, pos[2]];
        let max_distance = self.half_height + consts::PROBE_MARGIN;

        match physics.cast_ray_down(origin, max_distance, Some(body)) {
            Some(hit) => walkable(hit.normal),
            None => false,
        }
    }
}

/// A surface is walkable when its normal dot world-up exceeds the threshold
/// (roughly a 45 degree slope tolerance)
fn walkable(normal: [f32; 3]) -> bool {
    normal[1] > consts::WALKABLE_NORMAL_MIN
}
