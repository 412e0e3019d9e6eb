//! Keyboard-driven input state.
//!
//! Key handlers are the only writers; every frame stage reads the booleans
//! as an immutable snapshot. The keys are independent, so diagonal movement
//! intent is simply two axes set at once.

/// Control symbols recognized by the experience
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Dance,
    Interact,
    ToggleControls,
    ToggleMute,
}

impl ControlKey {
    /// Maps a lowercased key name (DOM-style: single characters, `" "` for
    /// the space bar) to a control symbol. Unrecognized keys are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(Self::Forward),
            "s" => Some(Self::Back),
            "a" => Some(Self::Left),
            "d" => Some(Self::Right),
            " " => Some(Self::Jump),
            "v" => Some(Self::Dance),
            "e" => Some(Self::Interact),
            "r" => Some(Self::ToggleControls),
            "t" => Some(Self::ToggleMute),
            _ => None,
        }
    }
}

/// Pressed/released state per control symbol
#[derive(Debug, Default, Clone, Copy)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dance: bool,
    pub interact: bool,
    pub toggle_controls: bool,
    pub toggle_mute: bool,
}

impl InputState {
    pub fn set(&mut self, key: ControlKey, pressed: bool) {
        match key {
            ControlKey::Forward => self.forward = pressed,
            ControlKey::Back => self.back = pressed,
            ControlKey::Left => self.left = pressed,
            ControlKey::Right => self.right = pressed,
            ControlKey::Jump => self.jump = pressed,
            ControlKey::Dance => self.dance = pressed,
            ControlKey::Interact => self.interact = pressed,
            ControlKey::ToggleControls => self.toggle_controls = pressed,
            ControlKey::ToggleMute => self.toggle_mute = pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(ControlKey::from_key("w"), Some(ControlKey::Forward));
        assert_eq!(ControlKey::from_key(" "), Some(ControlKey::Jump));
        assert_eq!(ControlKey::from_key("v"), Some(ControlKey::Dance));
        assert_eq!(ControlKey::from_key("e"), Some(ControlKey::Interact));
        assert_eq!(ControlKey::from_key("r"), Some(ControlKey::ToggleControls));
        assert_eq!(ControlKey::from_key("t"), Some(ControlKey::ToggleMute));
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        assert_eq!(ControlKey::from_key("q"), None);
        assert_eq!(ControlKey::from_key("escape"), None);
        assert_eq!(ControlKey::from_key("enter"), None);
    }

    #[test]
    fn test_set_and_release() {
        let mut input = InputState::default();
        input.set(ControlKey::Forward, true);
        input.set(ControlKey::Jump, true);
        assert!(input.forward && input.jump);

        input.set(ControlKey::Forward, false);
        assert!(!input.forward);
        assert!(input.jump);
    }
}
