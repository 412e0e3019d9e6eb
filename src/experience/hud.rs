//! HUD model: everything the external DOM/overlay layer renders. Prompts,
//! popups, the start screen, and the speech bubble are plain state here;
//! the frame loop mutates it and the frontend reads it after each tick.

use super::constants::hud as consts;

/// Typewriter effect revealing one character per fixed interval, driven by
/// the frame clock
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    revealed: usize,
    carry: f32,
}

impl Typewriter {
    fn new(text: String) -> Self {
        Self {
            text,
            revealed: 0,
            carry: 0.0,
        }
    }

    fn tick(&mut self, dt: f32) {
        let total = self.text.chars().count();
        self.carry += dt;
        while self.carry >= consts::TYPEWRITER_CHAR_SECONDS && self.revealed < total {
            self.revealed += 1;
            self.carry -= consts::TYPEWRITER_CHAR_SECONDS;
        }
        if self.revealed >= total {
            self.carry = 0.0;
        }
    }

    pub fn visible_text(&self) -> String {
        self.text.chars().take(self.revealed).collect()
    }
}

/// Speech bubble state anchored above the character's head
#[derive(Debug, Clone, Default)]
pub struct SpeechBubble {
    pub visible: bool,
    typewriter: Option<Typewriter>,
    /// Pixel anchor computed by projecting the character's head position;
    /// None while the anchor is off screen
    pub screen_position: Option<(f32, f32)>,
}

impl SpeechBubble {
    /// Shows the bubble and restarts the typewriter. Restarting stops any
    /// previous effect outright.
    pub fn say(&mut self, text: impl Into<String>) {
        self.typewriter = Some(Typewriter::new(text.into()));
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.typewriter = None;
        self.screen_position = None;
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(typewriter) = self.typewriter.as_mut() {
            typewriter.tick(dt);
        }
    }

    pub fn visible_text(&self) -> String {
        self.typewriter
            .as_ref()
            .map(Typewriter::visible_text)
            .unwrap_or_default()
    }
}

/// One step of a scripted dialogue: text plus how long it stays up after
/// being spoken
#[derive(Debug, Clone)]
pub struct DialogueStep {
    pub text: String,
    pub hold: f32,
}

impl DialogueStep {
    pub fn new(text: impl Into<String>, hold: f32) -> Self {
        Self {
            text: text.into(),
            hold,
        }
    }
}

#[derive(Debug, Clone)]
enum DialoguePhase {
    Waiting { remaining: f32 },
    Speaking { remaining: f32 },
}

/// Sequential dialogue driven by the frame clock. The whole script is one
/// unit: replacing or dropping it cancels every pending step at once.
#[derive(Debug, Clone)]
pub struct DialogueScript {
    steps: Vec<DialogueStep>,
    index: usize,
    phase: DialoguePhase,
}

impl DialogueScript {
    pub fn new(delay: f32, steps: Vec<DialogueStep>) -> Self {
        Self {
            steps,
            index: 0,
            phase: DialoguePhase::Waiting { remaining: delay },
        }
    }

    /// Advances the script; returns false once it has finished
    fn tick(&mut self, dt: f32, bubble: &mut SpeechBubble) -> bool {
        let advance = match &mut self.phase {
            DialoguePhase::Waiting { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            DialoguePhase::Speaking { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.index += 1;
                    true
                } else {
                    false
                }
            }
        };

        if advance {
            self.speak_current(bubble)
        } else {
            true
        }
    }

    fn speak_current(&mut self, bubble: &mut SpeechBubble) -> bool {
        match self.steps.get(self.index) {
            Some(step) => {
                bubble.say(step.text.clone());
                self.phase = DialoguePhase::Speaking {
                    remaining: step.hold,
                };
                true
            }
            None => {
                bubble.hide();
                false
            }
        }
    }
}

/// Mute button label, kept in sync with the audio state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteLabel {
    Mute,
    Unmute,
}

impl MuteLabel {
    pub fn text(self) -> &'static str {
        match self {
            Self::Mute => "Press T to Mute",
            Self::Unmute => "Press T to Unmute",
        }
    }
}

/// Start screen state: visible until the player starts, ready once every
/// asset has settled
#[derive(Debug, Clone)]
pub struct StartScreen {
    pub visible: bool,
    /// Settled fraction across engine assets and the UI preload set
    pub progress: f32,
    pub ready: bool,
}

/// Interaction popup content mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupCard {
    pub name: String,
    /// Asset id of the UI card image
    pub image: String,
}

pub struct HudModel {
    pub start_screen: StartScreen,
    /// "Press V to Vibe"
    pub dance_prompt_visible: bool,
    /// "Press R for Controls"
    pub controls_prompt_visible: bool,
    pub mute_button_visible: bool,
    pub mute_label: MuteLabel,
    /// "Press E to Interact"
    pub interact_prompt_visible: bool,
    pub controls_popup_visible: bool,
    pub interaction_popup: Option<PopupCard>,
    pub speech_bubble: SpeechBubble,
    dialogue: Option<DialogueScript>,
}

impl HudModel {
    pub fn new() -> Self {
        Self {
            start_screen: StartScreen {
                visible: true,
                progress: 0.0,
                ready: false,
            },
            dance_prompt_visible: false,
            controls_prompt_visible: false,
            mute_button_visible: false,
            mute_label: MuteLabel::Mute,
            interact_prompt_visible: false,
            controls_popup_visible: false,
            interaction_popup: None,
            speech_bubble: SpeechBubble::default(),
            dialogue: None,
        }
    }

    /// Schedules a dialogue script, replacing any script still running
    pub fn begin_dialogue(&mut self, delay: f32, steps: Vec<DialogueStep>) {
        self.dialogue = Some(DialogueScript::new(delay, steps));
    }

    pub fn dialogue_active(&self) -> bool {
        self.dialogue.is_some()
    }

    /// Shows or hides the controls popup, swapping the prompt visibility
    pub fn toggle_controls_popup(&mut self) {
        if self.controls_popup_visible {
            self.controls_popup_visible = false;
            self.controls_prompt_visible = true;
        } else {
            self.controls_popup_visible = true;
            self.controls_prompt_visible = false;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(script) = self.dialogue.as_mut() {
            if !script.tick(dt, &mut self.speech_bubble) {
                self.dialogue = None;
            }
        }
        self.speech_bubble.tick(dt);
    }
}

impl Default for HudModel {
    fn default() -> Self {
        Self::new()
    }
}
