//! Third-person follow camera and world-to-screen projection for HUD
//! anchoring. The external renderer owns the real camera; this model feeds
//! it a position, a look target, and an aspect ratio.

use nalgebra::{Isometry3, Perspective3, Point3, Vector3};

use super::constants::camera as consts;
use crate::config::CameraConfig;

pub struct FollowCamera {
    pub position: [f32; 3],
    pub look_target: [f32; 3],
    offset: Vector3<f32>,
    smoothing: f32,
    /// Vertical field of view, radians
    fovy: f32,
    viewport: (f32, f32),
}

impl FollowCamera {
    pub fn new(config: &CameraConfig, viewport: (u32, u32)) -> Self {
        let offset = Vector3::new(config.offset[0], config.offset[1], config.offset[2]);
        Self {
            // Start parked at the follow offset, looking at the origin
            position: [offset.x, offset.y + 5.0, offset.z],
            look_target: [0.0, 0.0, 0.0],
            offset,
            smoothing: config.smoothing,
            fovy: config.fov_degrees.to_radians(),
            viewport: (viewport.0 as f32, viewport.1 as f32),
        }
    }

    /// Recomputes the aspect ratio for a resized viewport
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1) as f32, height.max(1) as f32);
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 / self.viewport.1
    }

    /// Eases toward the character plus the follow offset and re-aims at the
    /// character's upper body
    pub fn follow(&mut self, character_position: [f32; 3]) {
        let current = Vector3::from(self.position);
        let desired = Vector3::from(character_position) + self.offset;
        let eased = current + (desired - current) * self.smoothing;
        self.position = [eased.x, eased.y, eased.z];
        self.look_target = [
            character_position[0],
            character_position[1] + consts::LOOK_AT_LIFT,
            character_position[2],
        ];
    }

    /// View direction from the camera toward its look target, unnormalized.
    /// The controller flattens and renormalizes it for movement.
    pub fn forward(&self) -> [f32; 3] {
        [
            self.look_target[0] - self.position[0],
            self.look_target[1] - self.position[1],
            self.look_target[2] - self.position[2],
        ]
    }

    /// Projects a world point to pixel coordinates. Returns None for points
    /// at or behind the camera plane.
    pub fn world_to_screen(&self, point: [f32; 3]) -> Option<(f32, f32)> {
        let eye = Point3::new(self.position[0], self.position[1], self.position[2]);
        let target = Point3::new(self.look_target[0], self.look_target[1], self.look_target[2]);
        let view = Isometry3::look_at_rh(&eye, &target, &Vector3::y());

        let in_view = view.transform_point(&Point3::new(point[0], point[1], point[2]));
        // Right-handed view space looks down -Z
        if in_view.z >= -consts::NEAR_PLANE {
            return None;
        }

        let projection = Perspective3::new(
            self.aspect(),
            self.fovy,
            consts::NEAR_PLANE,
            consts::FAR_PLANE,
        );
        let ndc = projection.project_point(&in_view);

        let x = (ndc.x * 0.5 + 0.5) * self.viewport.0;
        let y = (-ndc.y * 0.5 + 0.5) * self.viewport.1;
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_origin() -> FollowCamera {
        let mut camera = FollowCamera::new(&CameraConfig::default(), (800, 600));
        camera.position = [0.0, 0.0, 10.0];
        camera.look_target = [0.0, 0.0, 0.0];
        camera
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let camera = camera_at_origin();
        let (x, y) = camera.world_to_screen([0.0, 0.0, 0.0]).unwrap();
        assert!((x - 400.0).abs() < 1.0, "x {}", x);
        assert!((y - 300.0).abs() < 1.0, "y {}", y);
    }

    #[test]
    fn test_point_above_projects_higher() {
        let camera = camera_at_origin();
        let (_, y_center) = camera.world_to_screen([0.0, 0.0, 0.0]).unwrap();
        let (_, y_above) = camera.world_to_screen([0.0, 2.0, 0.0]).unwrap();
        // Screen Y grows downward
        assert!(y_above < y_center);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let camera = camera_at_origin();
        assert!(camera.world_to_screen([0.0, 0.0, 20.0]).is_none());
    }

    #[test]
    fn test_follow_eases_toward_offset() {
        let mut camera = FollowCamera::new(&CameraConfig::default(), (800, 600));
        camera.position = [0.0, 15.0, 30.0];
        camera.follow([10.0, 0.0, 0.0]);

        // One step moves a tenth of the way toward character + offset
        assert!((camera.position[0] - 1.0).abs() < 1e-4);
        assert_eq!(camera.look_target, [10.0, 2.0, 0.0]);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = FollowCamera::new(&CameraConfig::default(), (800, 600));
        camera.resize(1920, 1080);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
