//! Animation state machine: three states driven by the controller output,
//! cross-fading between clip tracks instead of hard-cutting.

use super::constants::animation::CROSSFADE_SECONDS;

/// Discrete animation states. Exactly one is active at a time; which clip
/// plays depends only on the current state (Moore machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Moving,
    Dance,
}

/// A loaded animation clip reference
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Clip duration in seconds
    pub length: f32,
    pub looped: bool,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(0.01),
            looped: true,
        }
    }
}

/// Playback state of one clip: time position plus a weight ramp used for
/// cross-fades
#[derive(Debug, Clone)]
pub struct ClipTrack {
    pub clip: AnimationClip,
    pub time_position: f32,
    pub is_playing: bool,
    pub weight_current: f32,
    fade_from: f32,
    fade_to: f32,
    fade_duration: f32,
    fade_elapsed: f32,
}

impl ClipTrack {
    fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time_position: 0.0,
            is_playing: false,
            weight_current: 0.0,
            fade_from: 0.0,
            fade_to: 0.0,
            fade_duration: 0.0,
            fade_elapsed: 0.0,
        }
    }

    /// Starts playback at full weight with no fade
    fn play(&mut self) {
        self.is_playing = true;
        self.weight_current = 1.0;
        self.fade_duration = 0.0;
        self.fade_elapsed = 0.0;
    }

    /// Resets the clip and ramps the weight up from its current value
    fn fade_in(&mut self, duration: f32) {
        self.time_position = 0.0;
        self.is_playing = true;
        self.begin_fade(1.0, duration);
    }

    /// Ramps the weight down; the track stops once it reaches zero
    fn fade_out(&mut self, duration: f32) {
        self.begin_fade(0.0, duration);
    }

    fn begin_fade(&mut self, target: f32, duration: f32) {
        self.fade_from = self.weight_current;
        self.fade_to = target;
        self.fade_duration = duration.max(f32::EPSILON);
        self.fade_elapsed = 0.0;
    }

    fn tick(&mut self, dt: f32) {
        if !self.is_playing {
            return;
        }

        if self.fade_duration > 0.0 {
            self.fade_elapsed = (self.fade_elapsed + dt).min(self.fade_duration);
            let alpha = self.fade_elapsed / self.fade_duration;
            self.weight_current = self.fade_from + (self.fade_to - self.fade_from) * alpha;
            if self.fade_elapsed >= self.fade_duration {
                self.fade_duration = 0.0;
                self.fade_elapsed = 0.0;
                self.weight_current = self.fade_to;
                if self.weight_current <= 0.0001 {
                    self.is_playing = false;
                    self.time_position = 0.0;
                    return;
                }
            }
        }

        self.time_position += dt;
        if self.clip.looped {
            while self.time_position >= self.clip.length {
                self.time_position -= self.clip.length;
            }
        } else if self.time_position >= self.clip.length {
            self.time_position = self.clip.length;
            self.is_playing = false;
            self.weight_current = 0.0;
        }
    }
}

/// Input sample evaluated every frame to pick the target state
#[derive(Debug, Clone, Copy)]
pub struct AnimationTrigger {
    pub dance_held: bool,
    pub moving: bool,
}

/// A weighted clip sample for the external mixer
#[derive(Debug, Clone)]
pub struct ClipSample {
    pub clip_name: String,
    pub weight: f32,
    pub time_position: f32,
}

/// State machine plus its state-to-track table. Clips bind late as their
/// models resolve; a missing clip is tolerated everywhere.
pub struct AnimationMachine {
    pub state: AnimationState,
    crossfade: f32,
    idle: Option<ClipTrack>,
    moving: Option<ClipTrack>,
    dance: Option<ClipTrack>,
}

impl AnimationMachine {
    pub fn new() -> Self {
        Self {
            state: AnimationState::Idle,
            crossfade: CROSSFADE_SECONDS,
            idle: None,
            moving: None,
            dance: None,
        }
    }

    /// Binds a clip to a state. If the machine already sits in that state
    /// the clip starts immediately, which is how the idle clip begins
    /// playing as soon as the character model resolves.
    pub fn bind_clip(&mut self, state: AnimationState, clip: AnimationClip) {
        let starts_now = state == self.state;
        let slot = self.slot_mut(state);
        let mut track = ClipTrack::new(clip);
        if starts_now {
            track.play();
        }
        *slot = Some(track);
    }

    pub fn has_clip(&self, state: AnimationState) -> bool {
        self.track(state).is_some()
    }

    pub fn track(&self, state: AnimationState) -> Option<&ClipTrack> {
        match state {
            AnimationState::Idle => self.idle.as_ref(),
            AnimationState::Moving => self.moving.as_ref(),
            AnimationState::Dance => self.dance.as_ref(),
        }
    }

    fn slot_mut(&mut self, state: AnimationState) -> &mut Option<ClipTrack> {
        match state {
            AnimationState::Idle => &mut self.idle,
            AnimationState::Moving => &mut self.moving,
            AnimationState::Dance => &mut self.dance,
        }
    }

    /// Picks the target state for this frame's input sample. Priority,
    /// highest first: Dance (key held and clip loaded), Moving (intent
    /// non-zero), Idle.
    pub fn drive(&mut self, trigger: AnimationTrigger) {
        let target = if trigger.dance_held && self.has_clip(AnimationState::Dance) {
            AnimationState::Dance
        } else if trigger.moving {
            AnimationState::Moving
        } else {
            AnimationState::Idle
        };
        self.transition(target);
    }

    /// No-op on the current state. Otherwise fade the previous clip out
    /// while the new one resets, fades in, and plays; when the previous
    /// state had no clip the new one simply fades in.
    fn transition(&mut self, target: AnimationState) {
        if target == self.state {
            return;
        }
        let previous = self.state;
        self.state = target;

        let duration = self.crossfade;
        match (self.has_clip(previous), self.has_clip(target)) {
            (true, true) => {
                if let Some(track) = self.slot_mut(previous).as_mut() {
                    track.fade_out(duration);
                }
                if let Some(track) = self.slot_mut(target).as_mut() {
                    track.fade_in(duration);
                }
            }
            (false, true) => {
                if let Some(track) = self.slot_mut(target).as_mut() {
                    track.fade_in(duration);
                }
            }
            // Target clip not loaded yet: the state advances and whatever
            // was playing keeps playing until a clip arrives
            _ => {}
        }
    }

    /// Advances every track's weight ramp and clock
    pub fn tick(&mut self, dt: f32) {
        for slot in [&mut self.idle, &mut self.moving, &mut self.dance] {
            if let Some(track) = slot.as_mut() {
                track.tick(dt);
            }
        }
    }

    /// Current weighted clips for the external mixer
    pub fn sample(&self) -> Vec<ClipSample> {
        [&self.idle, &self.moving, &self.dance]
            .into_iter()
            .flatten()
            .filter(|track| track.is_playing && track.weight_current > 0.0)
            .map(|track| ClipSample {
                clip_name: track.clip.name.clone(),
                weight: track.weight_current,
                time_position: track.time_position,
            })
            .collect()
    }
}

impl Default for AnimationMachine {
    fn default() -> Self {
        Self::new()
    }
}
