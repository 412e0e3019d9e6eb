use rapier3d::prelude::*;

use super::constants::physics as consts;
use crate::config::{CharacterSettings, ColliderSpec};

// Collision groups: static scenery and the player character. The character
// collides with scenery only; props never collide with each other.
const GROUP_STATIC: Group = Group::GROUP_1;
const GROUP_CHARACTER: Group = Group::GROUP_2;

/// Result of a downward ground probe
#[derive(Debug, Clone, Copy)]
pub struct GroundHit {
    pub distance: f32,
    /// Surface normal at the hit point, world space
    pub normal: [f32; 3],
}

/// Wrapper around Rapier3D for the experience simulation.
/// Owns the terrain and prop bodies plus the single dynamic character body.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

/// Builds a low-friction static collider for a prop or the terrain
fn build_static_collider(spec: ColliderSpec) -> Collider {
    let shape = match spec {
        ColliderSpec::Box { half_extents: [hx, hy, hz] } => SharedShape::cuboid(hx, hy, hz),
        ColliderSpec::Cylinder { radius, height } => SharedShape::cylinder(height / 2.0, radius),
    };
    ColliderBuilder::new(shape)
        .friction(consts::SURFACE_FRICTION)
        .restitution(consts::SURFACE_RESTITUTION)
        .collision_groups(InteractionGroups::new(GROUP_STATIC, Group::ALL))
        .build()
}

impl PhysicsWorld {
    /// Creates a new physics world with downward gravity of the given magnitude
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: vector![0.0, -gravity, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Adds a fixed body for terrain or a prop
    pub fn add_static_part(&mut self, position: [f32; 3], spec: ColliderSpec) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position[0], position[1], position[2]])
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = build_static_collider(spec);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Adds the dynamic character body. Rotations are locked so contacts can
    /// never tip the capsule; facing is applied to the visual node instead.
    pub fn add_character(
        &mut self,
        position: [f32; 3],
        settings: &CharacterSettings,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .lock_rotations()
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cylinder(settings.height / 2.0, settings.radius)
            .mass(settings.mass)
            .friction(consts::SURFACE_FRICTION)
            .restitution(consts::SURFACE_RESTITUTION)
            .collision_groups(InteractionGroups::new(GROUP_CHARACTER, Group::ALL))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Replaces the character's continuous drive force for this frame.
    /// A zero force clears any drive left over from the previous frame.
    pub fn set_character_drive(&mut self, handle: RigidBodyHandle, force: [f32; 3]) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.reset_forces(true);
            let magnitude_sq = force[0] * force[0] + force[1] * force[1] + force[2] * force[2];
            if magnitude_sq > consts::EPSILON * consts::EPSILON {
                body.add_force(vector![force[0], force[1], force[2]], true);
            }
        }
    }

    /// Applies an instantaneous upward jump impulse
    pub fn apply_jump_impulse(&mut self, handle: RigidBodyHandle, impulse: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.apply_impulse(vector![0.0, impulse, 0.0], true);
        }
    }

    /// Multiplies the horizontal velocity components by a damping factor,
    /// leaving vertical velocity untouched
    pub fn damp_horizontal_velocity(&mut self, handle: RigidBodyHandle, factor: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let v = *body.linvel();
            body.set_linvel(vector![v.x * factor, v.y, v.z * factor], true);
        }
    }

    /// Sets the velocity of a body
    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: [f32; 3]) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(vector![velocity[0], velocity[1], velocity[2]], true);
        }
    }

    /// Gets the position of a rigid body
    pub fn get_position(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            [pos.x, pos.y, pos.z]
        })
    }

    /// Gets the velocity of a rigid body
    pub fn get_velocity(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.rigid_body_set.get(handle).map(|body| {
            let vel = body.linvel();
            [vel.x, vel.y, vel.z]
        })
    }

    /// Casts a ray straight down and returns the hit distance and surface
    /// normal, excluding the given body (the caster)
    pub fn cast_ray_down(
        &self,
        origin: [f32; 3],
        max_distance: f32,
        exclude_body: Option<RigidBodyHandle>,
    ) -> Option<GroundHit> {
        let ray = Ray::new(
            point![origin[0], origin[1], origin[2]],
            vector![0.0, -1.0, 0.0],
        );

        let filter = if let Some(body_handle) = exclude_body {
            QueryFilter::default().exclude_rigid_body(body_handle)
        } else {
            QueryFilter::default()
        };

        let (_, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        Some(GroundHit {
            distance: hit.time_of_impact,
            normal: [hit.normal.x, hit.normal.y, hit.normal.z],
        })
    }
}
