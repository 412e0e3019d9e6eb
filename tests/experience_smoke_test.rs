//! End-to-end smoke test: a real asset manifest on disk, the async loader,
//! the start flow, and the welcome dialogue.

use std::io::Cursor;
use std::time::{Duration, Instant};

use schoolyard::config::WorldConfig;
use schoolyard::experience::{asset_ids, Experience};
use schoolyard::experience::scene::{Background, FALLBACK_COLOR};

const DT: f32 = 1.0 / 60.0;

fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn wait_for_loading(experience: &mut Experience) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !experience.loading_complete() {
        assert!(Instant::now() < deadline, "loading never settled");
        experience.tick(DT);
        std::thread::sleep(Duration::from_millis(2));
    }
    experience.tick(DT);
}

#[test]
fn loads_start_flow_and_dialogue() {
    let dir = tempfile::tempdir().unwrap();
    let start_screen = dir.path().join("start_screen.png");
    std::fs::write(&start_screen, png_bytes()).unwrap();
    let controls_card = dir.path().join("controls_card.png");
    std::fs::write(&controls_card, png_bytes()).unwrap();
    let music = dir.path().join("music.mp3");
    std::fs::write(&music, b"opaque audio").unwrap();
    let broken_model = dir.path().join("idle.glb");
    std::fs::write(&broken_model, b"not a gltf document").unwrap();

    let mut config = WorldConfig::default();
    config.name = "smoke world".into();
    config.ui.start_screen = Some(start_screen);
    config.ui.controls_card = Some(controls_card);
    config.audio.music = Some(music);
    // Corrupt character model: loading still completes, movement stays off
    config.character.model = Some(broken_model);
    // Missing HDR: the background keeps its flat-color fallback
    config.environment.sky = Some(dir.path().join("missing_sky.hdr"));

    let mut experience = Experience::new(config, (1280, 720));
    assert!(experience.hud.start_screen.visible);

    wait_for_loading(&mut experience);
    assert!((experience.loading_progress() - 1.0).abs() < f32::EPSILON);
    assert!((experience.hud.start_screen.progress - 1.0).abs() < f32::EPSILON);
    assert!(experience.hud.start_screen.ready);

    // Failures were terminal for their own assets only
    assert!(experience.character.is_none());
    assert_eq!(experience.scene.background, Background::FlatColor(FALLBACK_COLOR));
    assert!(experience.resources.contains_key(asset_ids::UI_START_SCREEN));
    assert!(experience.resources.contains_key(asset_ids::UI_CONTROLS_CARD));
    assert!(experience.resources.contains_key(asset_ids::MUSIC));
    assert_eq!(experience.audio.buffer.as_deref(), Some(asset_ids::MUSIC));

    // Start: screen down, prompts up, music on
    experience.start();
    assert!(experience.started);
    assert!(!experience.hud.start_screen.visible);
    assert!(experience.hud.dance_prompt_visible);
    assert!(experience.hud.controls_prompt_visible);
    assert!(experience.hud.mute_button_visible);
    assert!(experience.audio.playing);

    // The character model arriving late would have bound everything; here
    // we stand it up directly and let the bubble anchor to it
    experience.attach_character(&[]);
    assert!(experience.scene.nodes().count() >= 2, "terrain + character");
    assert!((experience.audio.volume - 0.5).abs() < f32::EPSILON);
    assert!(experience.audio.looped);

    // Welcome dialogue begins five seconds after start
    experience.tick(4.0);
    assert!(!experience.hud.speech_bubble.visible);
    experience.tick(1.1);
    assert!(experience.hud.speech_bubble.visible);
    experience.tick(2.0);
    assert!(experience
        .hud
        .speech_bubble
        .visible_text()
        .starts_with("Welcome to the gamified"));
    assert!(experience.hud.speech_bubble.screen_position.is_some());

    // Second line, then the bubble goes away
    experience.tick(3.5);
    assert!(experience
        .hud
        .speech_bubble
        .visible_text()
        .starts_with("Let's go to the School hall"));
    experience.tick(5.1);
    assert!(!experience.hud.speech_bubble.visible);

    // Mute toggle flips playback and the button label
    experience.key_down("t");
    experience.key_up("t");
    assert!(!experience.audio.playing);
    assert!(experience.audio.muted);
    assert_eq!(experience.hud.mute_label.text(), "Press T to Unmute");

    experience.click_mute_button();
    assert!(experience.audio.playing);
    assert_eq!(experience.hud.mute_label.text(), "Press T to Mute");

    // Resize recomputes the camera aspect for HUD projection
    experience.resize(640, 480);
    assert!((experience.camera.aspect() - 640.0 / 480.0).abs() < 1e-6);
}

#[test]
fn start_is_gated_on_loading() {
    let dir = tempfile::tempdir().unwrap();
    // A config with a pending asset: a file large enough not to settle
    // instantly is hard to fake, so gate on the unstarted state instead
    let mut config = WorldConfig::default();
    config.audio.music = Some(dir.path().join("missing.mp3"));

    let mut experience = Experience::new(config, (1280, 720));
    // Whether or not the loader has settled yet, ticking before start keeps
    // the start screen up
    experience.tick(DT);
    assert!(!experience.started);
    assert!(experience.hud.start_screen.visible);

    wait_for_loading(&mut experience);
    experience.start();
    assert!(experience.started);
}
