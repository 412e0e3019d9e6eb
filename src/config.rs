//! World configuration parsing from world.toml files

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Immutable character tuning. Values mirror the defaults below when the
/// `[character]` section omits them.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CharacterSettings {
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Collider radius
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Collider total height; the visual origin sits at the feet, the
    /// physics origin at the collider center
    #[serde(default = "default_height")]
    pub height: f32,
    /// Instantaneous upward impulse per jump
    #[serde(default = "default_jump_impulse")]
    pub jump_impulse: f32,
    #[serde(default = "default_max_jumps")]
    pub max_jumps: u32,
    /// Minimum seconds between two jump impulses
    #[serde(default = "default_jump_cooldown")]
    pub jump_cooldown: f32,
    /// Horizontal drive force magnitude while grounded
    #[serde(default = "default_ground_speed")]
    pub ground_speed: f32,
    /// Horizontal drive force magnitude while airborne (reduced air control)
    #[serde(default = "default_air_speed")]
    pub air_speed: f32,
    /// Per-frame horizontal velocity multiplier while grounded
    #[serde(default = "default_ground_damping")]
    pub ground_damping: f32,
    /// Per-frame horizontal velocity multiplier while airborne
    #[serde(default = "default_air_damping")]
    pub air_damping: f32,
}

fn default_mass() -> f32 {
    1.0
}

fn default_radius() -> f32 {
    0.5
}

fn default_height() -> f32 {
    1.8
}

fn default_jump_impulse() -> f32 {
    8.0
}

fn default_max_jumps() -> u32 {
    2
}

fn default_jump_cooldown() -> f32 {
    0.2
}

fn default_ground_speed() -> f32 {
    8.0
}

fn default_air_speed() -> f32 {
    4.0
}

fn default_ground_damping() -> f32 {
    0.9
}

fn default_air_damping() -> f32 {
    0.98
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            mass: default_mass(),
            radius: default_radius(),
            height: default_height(),
            jump_impulse: default_jump_impulse(),
            max_jumps: default_max_jumps(),
            jump_cooldown: default_jump_cooldown(),
            ground_speed: default_ground_speed(),
            air_speed: default_air_speed(),
            ground_damping: default_ground_damping(),
            air_damping: default_air_damping(),
        }
    }
}

/// Character section: model paths plus physics tuning
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CharacterConfig {
    /// Model carrying the rig and the idle animation
    #[serde(default)]
    pub model: Option<PathBuf>,
    /// Model carrying the movement ("skip") animation clip
    #[serde(default)]
    pub skip_animation: Option<PathBuf>,
    /// Model carrying the dance animation clip
    #[serde(default)]
    pub dance_animation: Option<PathBuf>,
    #[serde(flatten)]
    pub settings: CharacterSettings,
}

/// World section: gravity magnitude and terrain extent
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_terrain_size")]
    pub terrain_size: f32,
}

fn default_gravity() -> f32 {
    20.0
}

fn default_terrain_size() -> f32 {
    500.0
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            terrain_size: default_terrain_size(),
        }
    }
}

/// Third-person follow camera tuning
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_offset")]
    pub offset: [f32; 3],
    /// Exponential follow factor per frame
    #[serde(default = "default_camera_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,
}

fn default_camera_offset() -> [f32; 3] {
    [0.0, 15.0, 30.0]
}

fn default_camera_smoothing() -> f32 {
    0.1
}

fn default_fov_degrees() -> f32 {
    75.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: default_camera_offset(),
            smoothing: default_camera_smoothing(),
            fov_degrees: default_fov_degrees(),
        }
    }
}

/// Interaction scanner tuning
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "default_interaction_radius")]
    pub radius: f32,
    /// Popup auto-dismiss delay in seconds
    #[serde(default = "default_popup_seconds")]
    pub popup_seconds: f32,
}

fn default_interaction_radius() -> f32 {
    5.0
}

fn default_popup_seconds() -> f32 {
    5.0
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            radius: default_interaction_radius(),
            popup_seconds: default_popup_seconds(),
        }
    }
}

/// Ambient audio section
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub music: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    0.5
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music: None,
            volume: default_volume(),
        }
    }
}

/// Environment assets: HDR sky and ground texture
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub sky: Option<PathBuf>,
    #[serde(default)]
    pub grass: Option<PathBuf>,
}

/// UI image preload set, tracked separately from engine assets
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub start_screen: Option<PathBuf>,
    #[serde(default)]
    pub controls_card: Option<PathBuf>,
}

/// Collider shape for a static prop
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderSpec {
    Box { half_extents: [f32; 3] },
    Cylinder { radius: f32, height: f32 },
}

/// A static interactable prop placed in the world
#[derive(Debug, Clone, Deserialize)]
pub struct PropConfig {
    pub id: String,
    /// Display name shown in the interaction popup
    pub name: String,
    pub model: PathBuf,
    /// UI card image shown in the interaction popup
    pub card: PathBuf,
    pub position: [f32; 3],
    pub collider: ColliderSpec,
    /// Vertical offset of the physics body relative to the visual origin
    #[serde(default)]
    pub collider_offset: f32,
}

/// World configuration from world.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorldConfig {
    /// Display name of the experience
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub character: CharacterConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub props: Vec<PropConfig>,
}

impl WorldConfig {
    /// Load world configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load world configuration from an experience directory
    /// Looks for world.toml in the given directory
    pub fn from_world_dir(dir: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&dir.join("world.toml"))
    }
}

/// Errors that can occur when loading world configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: WorldConfig = toml::from_str("").unwrap();
        assert_eq!(config.character.settings.max_jumps, 2);
        assert!((config.character.settings.jump_cooldown - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.camera.offset, [0.0, 15.0, 30.0]);
        assert!((config.interaction.radius - 5.0).abs() < f32::EPSILON);
        assert!(config.props.is_empty());
    }

    #[test]
    fn test_prop_collider_shapes_parse() {
        let config: WorldConfig = toml::from_str(
            r#"
            name = "test world"

            [[props]]
            id = "tree"
            name = "Tree"
            model = "assets/models/tree.glb"
            card = "assets/ui/tree_card.jpg"
            position = [20.0, 0.0, -10.0]
            collider_offset = 4.0

            [props.collider]
            shape = "cylinder"
            radius = 1.0
            height = 8.0
        "#,
        )
        .unwrap();

        assert_eq!(config.props.len(), 1);
        let prop = &config.props[0];
        assert_eq!(prop.name, "Tree");
        assert!((prop.collider_offset - 4.0).abs() < f32::EPSILON);
        match prop.collider {
            ColliderSpec::Cylinder { radius, height } => {
                assert!((radius - 1.0).abs() < f32::EPSILON);
                assert!((height - 8.0).abs() < f32::EPSILON);
            }
            ColliderSpec::Box { .. } => panic!("expected a cylinder collider"),
        }
    }

    #[test]
    fn test_character_settings_flatten() {
        let config: WorldConfig = toml::from_str(
            r#"
            [character]
            model = "assets/models/idle.glb"
            jump_impulse = 10.0
            max_jumps = 3
        "#,
        )
        .unwrap();

        assert!(config.character.model.is_some());
        assert!((config.character.settings.jump_impulse - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.character.settings.max_jumps, 3);
        // Unspecified fields fall back to defaults
        assert!((config.character.settings.ground_speed - 8.0).abs() < f32::EPSILON);
    }
}
