//! Simulation constants shared across the experience.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics constants
pub mod physics {
    /// Fixed timestep for physics simulation (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Maximum physics sub-steps consumed per rendered frame
    pub const MAX_SUBSTEPS: u32 = 3;

    /// Near-zero contact friction; per-frame velocity damping is the
    /// primary deceleration mechanism, not engine friction
    pub const SURFACE_FRICTION: f32 = 0.01;

    /// No bounce by default
    pub const SURFACE_RESTITUTION: f32 = 0.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Ground sensor constants
pub mod ground {
    /// Ray origin lift above the body center
    pub const PROBE_LIFT: f32 = 0.1;

    /// Ray length margin beyond half the collider height
    pub const PROBE_MARGIN: f32 = 0.2;

    /// Minimum hit-normal dot world-up for a walkable surface (~45 degrees)
    pub const WALKABLE_NORMAL_MIN: f32 = 0.7;
}

/// Character constants
pub mod character {
    /// Exponential yaw interpolation factor per frame
    pub const YAW_SMOOTHING: f32 = 0.1;

    /// Spawn position of the character body
    pub const SPAWN_POSITION: [f32; 3] = [0.0, 1.0, 0.0];
}

/// Animation constants
pub mod animation {
    /// Cross-fade duration between animation states
    pub const CROSSFADE_SECONDS: f32 = 0.3;
}

/// Camera constants
pub mod camera {
    pub const NEAR_PLANE: f32 = 0.1;
    pub const FAR_PLANE: f32 = 1000.0;

    /// Look-at point lift above the character origin (upper body)
    pub const LOOK_AT_LIFT: f32 = 2.0;
}

/// HUD constants
pub mod hud {
    /// Seconds per revealed character in the typewriter effect
    pub const TYPEWRITER_CHAR_SECONDS: f32 = 0.05;

    /// Delay after start before the welcome dialogue begins
    pub const DIALOGUE_DELAY: f32 = 5.0;

    /// Hold duration of each dialogue step
    pub const DIALOGUE_HOLD: f32 = 5.0;

    /// Speech bubble anchor lift above the character origin (head)
    pub const BUBBLE_HEAD_LIFT: f32 = 3.0;

    /// Screen-space lift of the bubble above its projected anchor, in pixels
    pub const BUBBLE_SCREEN_LIFT: f32 = 60.0;
}
