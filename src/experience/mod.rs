//! The experience driver: one application-state struct owning every stage,
//! advanced by a fixed-order frame tick.
//!
//! Per frame: drain loader events, physics sub-steps, character controller,
//! animation machine, camera follow, HUD anchors, interaction scan. The
//! external renderer draws after the tick from the scene, animation
//! samples, and HUD model.

pub mod animation;
pub mod audio;
pub mod camera;
pub mod character;
pub mod constants;
pub mod ground;
pub mod hud;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod scene;

use std::collections::HashMap;

use crate::assets::{AssetKind, AssetLoader, AssetPayload, AssetRequest, ClipInfo};
use crate::config::{ColliderSpec, WorldConfig};
use self::animation::{AnimationClip, AnimationMachine, AnimationState, AnimationTrigger};
use self::audio::AmbientAudio;
use self::camera::FollowCamera;
use self::character::{CharacterController, ControllerFrame};
use self::constants::{character as char_consts, hud as hud_consts, physics as phys_consts};
use self::ground::GroundSensor;
use self::hud::{DialogueStep, HudModel, MuteLabel};
use self::input::{ControlKey, InputState};
use self::interaction::{InteractableProp, InteractionScanner};
use self::physics::PhysicsWorld;
use self::scene::{Background, Scene};

/// Stable asset ids shared by the loader, the scene, and the HUD
pub mod asset_ids {
    pub const CHARACTER_MODEL: &str = "character/model";
    pub const CHARACTER_SKIP: &str = "character/skip";
    pub const CHARACTER_DANCE: &str = "character/dance";
    pub const SKY: &str = "environment/sky";
    pub const GRASS: &str = "environment/grass";
    pub const MUSIC: &str = "audio/music";
    pub const UI_START_SCREEN: &str = "ui/start_screen";
    pub const UI_CONTROLS_CARD: &str = "ui/controls_card";

    pub fn prop(id: &str) -> String {
        format!("prop/{id}")
    }

    pub fn card(id: &str) -> String {
        format!("ui/card/{id}")
    }
}

const WELCOME_LINE: &str = "Welcome to the gamified introduction to A-Level Math!";
const SCHOOL_HALL_LINE: &str = "Let's go to the School hall, to learn more about this world!";

pub struct Experience {
    pub config: WorldConfig,
    pub physics: PhysicsWorld,
    pub scene: Scene,
    pub camera: FollowCamera,
    pub input: InputState,
    pub hud: HudModel,
    pub audio: AmbientAudio,
    pub animation: AnimationMachine,
    pub scanner: InteractionScanner,
    pub ground_sensor: GroundSensor,
    /// None until the character model resolves; every stage treats that as
    /// a valid deferred-start state
    pub character: Option<CharacterController>,
    /// One slot per configured prop; a failed load leaves its slot None
    pub props: Vec<Option<InteractableProp>>,
    /// Every resolved asset payload by id, for the external consumers
    pub resources: HashMap<String, AssetPayload>,
    loader: AssetLoader,
    pub started: bool,
    /// Accumulated simulation clock in seconds
    pub clock: f32,
    accumulator: f32,
    pub frame: u64,
}

impl Experience {
    pub fn new(config: WorldConfig, viewport: (u32, u32)) -> Self {
        let mut physics = PhysicsWorld::new(config.world.gravity);
        let mut scene = Scene::new();

        let half = config.world.terrain_size / 2.0;
        physics.add_static_part(
            [0.0, -0.1, 0.0],
            ColliderSpec::Box {
                half_extents: [half, 0.1, half],
            },
        );
        scene.add_node("terrain", None, [0.0, 0.0, 0.0]);

        let camera = FollowCamera::new(&config.camera, viewport);
        let ground_sensor = GroundSensor::new(config.character.settings.height);
        let scanner = InteractionScanner::new(
            config.interaction.radius,
            config.interaction.popup_seconds,
        );
        let props = (0..config.props.len()).map(|_| None).collect();
        let audio = AmbientAudio::new(config.audio.volume);
        let loader = AssetLoader::spawn(asset_requests(&config));

        Self {
            config,
            physics,
            scene,
            camera,
            input: InputState::default(),
            hud: HudModel::new(),
            audio,
            animation: AnimationMachine::new(),
            scanner,
            ground_sensor,
            character: None,
            props,
            resources: HashMap::new(),
            loader,
            started: false,
            clock: 0.0,
            accumulator: 0.0,
            frame: 0,
        }
    }

    /// Key-down handler. `key` is the lowercased key name, `"escape"`
    /// included; unrecognized keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        if key == "escape" {
            if self.scanner.session.is_some() {
                self.scanner.dismiss(&mut self.hud);
            }
            return;
        }

        let Some(control) = ControlKey::from_key(key) else {
            return;
        };
        self.input.set(control, true);

        match control {
            ControlKey::ToggleControls => self.hud.toggle_controls_popup(),
            ControlKey::ToggleMute => self.toggle_mute(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(control) = ControlKey::from_key(key) {
            self.input.set(control, false);
        }
    }

    /// Click on the mute button
    pub fn click_mute_button(&mut self) {
        self.toggle_mute();
    }

    /// Click anywhere on the controls popup dismisses it
    pub fn click_controls_popup(&mut self) {
        if self.hud.controls_popup_visible {
            self.hud.toggle_controls_popup();
        }
    }

    /// Click anywhere on the interaction popup dismisses it
    pub fn click_interaction_popup(&mut self) {
        self.scanner.dismiss(&mut self.hud);
    }

    /// Viewport resize: the camera aspect follows; the renderer resizes its
    /// own surfaces and post-processing buffers
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn loading_complete(&self) -> bool {
        self.loader.is_complete()
    }

    pub fn loading_progress(&self) -> f32 {
        self.loader.progress()
    }

    /// Leaves the start screen: prompts on, music on unless muted, welcome
    /// dialogue scheduled. Ignored until every asset has settled.
    pub fn start(&mut self) {
        if self.started || !self.loader.is_complete() {
            return;
        }
        self.started = true;
        self.hud.start_screen.visible = false;
        self.hud.dance_prompt_visible = true;
        self.hud.controls_prompt_visible = true;
        self.hud.mute_button_visible = true;
        self.audio.start();
        self.hud.begin_dialogue(
            hud_consts::DIALOGUE_DELAY,
            vec![
                DialogueStep::new(WELCOME_LINE, hud_consts::DIALOGUE_HOLD),
                DialogueStep::new(SCHOOL_HALL_LINE, hud_consts::DIALOGUE_HOLD),
            ],
        );
    }

    /// Advances one frame. `dt` is the elapsed wall time of the frame; the
    /// physics world consumes it in fixed sub-steps.
    pub fn tick(&mut self, dt: f32) {
        self.drain_loader();

        self.accumulator = (self.accumulator + dt)
            .min(phys_consts::TIMESTEP * phys_consts::MAX_SUBSTEPS as f32);
        while self.accumulator >= phys_consts::TIMESTEP {
            self.physics.step(phys_consts::TIMESTEP);
            self.accumulator -= phys_consts::TIMESTEP;
        }

        let camera_forward = self.camera.forward();
        let now = self.clock;
        let mut frame = ControllerFrame {
            moving: false,
            jumped: false,
        };
        if let Some(controller) = self.character.as_mut() {
            frame = controller.update(
                &mut self.physics,
                &mut self.scene,
                &self.input,
                &self.ground_sensor,
                camera_forward,
                now,
            );
        }

        self.animation.drive(AnimationTrigger {
            dance_held: self.input.dance,
            moving: frame.moving,
        });
        self.animation.tick(dt);

        if let Some(position) = self.character_position() {
            self.camera.follow(position);

            if self.hud.speech_bubble.visible {
                let anchor = [
                    position[0],
                    position[1] + hud_consts::BUBBLE_HEAD_LIFT,
                    position[2],
                ];
                self.hud.speech_bubble.screen_position = self
                    .camera
                    .world_to_screen(anchor)
                    .map(|(x, y)| (x, y - hud_consts::BUBBLE_SCREEN_LIFT));
            }
        }

        self.hud.tick(dt);

        let character_position = self.character_position();
        self.scanner.update(
            character_position,
            &self.props,
            self.input.interact,
            dt,
            &mut self.hud,
        );

        self.clock += dt;
        self.frame += 1;
    }

    /// The character's visual position (feet), once the model has resolved
    pub fn character_position(&self) -> Option<[f32; 3]> {
        let controller = self.character.as_ref()?;
        self.scene.node(controller.node).map(|node| node.position)
    }

    fn toggle_mute(&mut self) {
        if self.audio.toggle_mute() {
            self.hud.mute_label = if self.audio.muted {
                MuteLabel::Unmute
            } else {
                MuteLabel::Mute
            };
        }
    }

    fn drain_loader(&mut self) {
        for loaded in self.loader.poll() {
            match loaded.payload {
                Ok(payload) => self.integrate_asset(loaded.id, payload),
                // Non-fatal: the feature this asset backs stays absent
                Err(error) => {
                    tracing::warn!(id = %loaded.id, error = %error, "asset unavailable");
                }
            }
        }
        self.hud.start_screen.progress = self.loader.progress();
        self.hud.start_screen.ready = self.loader.is_complete();
    }

    fn integrate_asset(&mut self, id: String, payload: AssetPayload) {
        match &payload {
            AssetPayload::Model(model) => {
                if id == asset_ids::CHARACTER_MODEL {
                    self.attach_character(&model.clips);
                } else if id == asset_ids::CHARACTER_SKIP {
                    self.attach_movement_clip(&model.clips);
                } else if id == asset_ids::CHARACTER_DANCE {
                    self.attach_dance_clip(&model.clips);
                } else if let Some(prop_id) = id.strip_prefix("prop/") {
                    let index = self.config.props.iter().position(|p| p.id == prop_id);
                    if let Some(index) = index {
                        self.attach_prop(index);
                    }
                }
            }
            AssetPayload::Environment(_) => {
                if id == asset_ids::SKY {
                    self.scene.background = Background::Sky { asset: id.clone() };
                }
            }
            AssetPayload::Texture(_) => {
                if id == asset_ids::GRASS {
                    self.scene.terrain_texture = Some(id.clone());
                }
            }
            AssetPayload::Audio(_) => {
                if id == asset_ids::MUSIC {
                    self.audio.attach_buffer(id.clone());
                }
            }
            AssetPayload::UiImage(_) => {}
        }
        self.resources.insert(id, payload);
    }

    /// Creates the character body, its visual node, and the idle clip once
    /// the character model resolves
    pub fn attach_character(&mut self, clips: &[ClipInfo]) {
        if self.character.is_some() {
            return;
        }
        let settings = self.config.character.settings;
        let body = self
            .physics
            .add_character(char_consts::SPAWN_POSITION, &settings);
        let node = self.scene.add_node(
            "character",
            Some(asset_ids::CHARACTER_MODEL.to_string()),
            [0.0, 0.0, 0.0],
        );
        self.character = Some(CharacterController::new(settings, body, node));

        if let Some(clip) = clips.first() {
            self.animation.bind_clip(
                AnimationState::Idle,
                AnimationClip::new(clip.name.clone(), clip.length),
            );
        }
        tracing::info!("character ready");
    }

    /// Binds the movement ("skip") clip from its late-loading model
    pub fn attach_movement_clip(&mut self, clips: &[ClipInfo]) {
        if let Some(clip) = clips.first() {
            self.animation.bind_clip(
                AnimationState::Moving,
                AnimationClip::new(clip.name.clone(), clip.length),
            );
        }
    }

    /// Binds the dance clip from its late-loading model
    pub fn attach_dance_clip(&mut self, clips: &[ClipInfo]) {
        if let Some(clip) = clips.first() {
            self.animation.bind_clip(
                AnimationState::Dance,
                AnimationClip::new(clip.name.clone(), clip.length),
            );
        }
    }

    /// Creates the body, node, and interactable slot for a configured prop
    pub fn attach_prop(&mut self, index: usize) {
        let Some(prop) = self.config.props.get(index).cloned() else {
            return;
        };
        if self.props.get(index).map_or(true, |slot| slot.is_some()) {
            return;
        }

        let body_position = [
            prop.position[0],
            prop.position[1] + prop.collider_offset,
            prop.position[2],
        ];
        let body = self.physics.add_static_part(body_position, prop.collider);
        let node = self.scene.add_node(
            prop.name.clone(),
            Some(asset_ids::prop(&prop.id)),
            prop.position,
        );
        self.props[index] = Some(InteractableProp {
            id: prop.id.clone(),
            name: prop.name,
            card_image: asset_ids::card(&prop.id),
            node,
            body,
            position: prop.position,
        });
        tracing::debug!(prop = %prop.id, "prop placed");
    }
}

/// Builds the full request manifest: engine assets plus the separately
/// tracked UI preload set
fn asset_requests(config: &WorldConfig) -> Vec<AssetRequest> {
    let mut requests = Vec::new();
    let mut push = |id: String, kind: AssetKind, path: Option<&std::path::PathBuf>| {
        if let Some(path) = path {
            requests.push(AssetRequest {
                id,
                kind,
                path: path.clone(),
            });
        }
    };

    push(
        asset_ids::CHARACTER_MODEL.into(),
        AssetKind::Model,
        config.character.model.as_ref(),
    );
    push(
        asset_ids::CHARACTER_SKIP.into(),
        AssetKind::Model,
        config.character.skip_animation.as_ref(),
    );
    push(
        asset_ids::CHARACTER_DANCE.into(),
        AssetKind::Model,
        config.character.dance_animation.as_ref(),
    );
    push(
        asset_ids::GRASS.into(),
        AssetKind::Texture,
        config.environment.grass.as_ref(),
    );
    push(
        asset_ids::SKY.into(),
        AssetKind::Environment,
        config.environment.sky.as_ref(),
    );
    push(
        asset_ids::MUSIC.into(),
        AssetKind::Audio,
        config.audio.music.as_ref(),
    );
    push(
        asset_ids::UI_START_SCREEN.into(),
        AssetKind::UiImage,
        config.ui.start_screen.as_ref(),
    );
    push(
        asset_ids::UI_CONTROLS_CARD.into(),
        AssetKind::UiImage,
        config.ui.controls_card.as_ref(),
    );

    for prop in &config.props {
        requests.push(AssetRequest {
            id: asset_ids::prop(&prop.id),
            kind: AssetKind::Model,
            path: prop.model.clone(),
        });
        requests.push(AssetRequest {
            id: asset_ids::card(&prop.id),
            kind: AssetKind::UiImage,
            path: prop.card.clone(),
        });
    }

    requests
}
