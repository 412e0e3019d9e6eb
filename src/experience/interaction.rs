//! Interaction scanner: nearest interactable prop, the interact prompt,
//! and the popup session with its cancellable auto-dismiss countdown.

use rapier3d::prelude::RigidBodyHandle;

use super::hud::{HudModel, PopupCard};
use super::scene::NodeId;

/// A static world object eligible for the interaction prompt. Created once
/// its model resolves, immutable afterwards.
#[derive(Debug, Clone)]
pub struct InteractableProp {
    pub id: String,
    pub name: String,
    /// Asset id of the UI card shown in the popup
    pub card_image: String,
    pub node: NodeId,
    pub body: RigidBodyHandle,
    pub position: [f32; 3],
}

/// An open popup. Dropping the session cancels the pending auto-dismiss.
#[derive(Debug, Clone)]
pub struct InteractionSession {
    pub card: PopupCard,
    pub remaining: f32,
}

pub struct InteractionScanner {
    pub radius: f32,
    popup_seconds: f32,
    interact_was_down: bool,
    pub session: Option<InteractionSession>,
}

impl InteractionScanner {
    pub fn new(radius: f32, popup_seconds: f32) -> Self {
        Self {
            radius,
            popup_seconds,
            interact_was_down: false,
            session: None,
        }
    }

    /// Minimum-distance prop strictly inside the radius; the first
    /// encountered wins ties. No hysteresis: at the exact boundary the
    /// prompt can flicker, matching the source behavior. Unloaded slots
    /// are skipped.
    fn nearest_in_range<'a>(
        &self,
        from: [f32; 3],
        props: &'a [Option<InteractableProp>],
    ) -> Option<&'a InteractableProp> {
        let mut best: Option<&InteractableProp> = None;
        let mut best_distance = self.radius;
        for prop in props.iter().flatten() {
            let d = distance(from, prop.position);
            if d < best_distance {
                best_distance = d;
                best = Some(prop);
            }
        }
        best
    }

    /// Runs one frame of the scanner: countdown, fresh-press detection,
    /// prompt visibility, and the popup mirror on the HUD
    pub fn update(
        &mut self,
        character_position: Option<[f32; 3]>,
        props: &[Option<InteractableProp>],
        interact_held: bool,
        dt: f32,
        hud: &mut HudModel,
    ) {
        let expired = match self.session.as_mut() {
            Some(session) => {
                session.remaining -= dt;
                session.remaining <= 0.0
            }
            None => false,
        };
        if expired {
            self.session = None;
        }

        let fresh_press = interact_held && !self.interact_was_down;
        self.interact_was_down = interact_held;

        let nearest = match character_position {
            Some(from) => self.nearest_in_range(from, props),
            // Character not loaded yet: nothing to interact with
            None => None,
        };

        if let Some(prop) = nearest {
            if fresh_press && self.session.is_none() {
                self.session = Some(InteractionSession {
                    card: PopupCard {
                        name: prop.name.clone(),
                        image: prop.card_image.clone(),
                    },
                    remaining: self.popup_seconds,
                });
            }
        }

        hud.interact_prompt_visible = nearest.is_some() && self.session.is_none();
        hud.interaction_popup = self.session.as_ref().map(|s| s.card.clone());
    }

    /// Explicit dismiss (escape key or click). Clears the popup and cancels
    /// the pending auto-dismiss unconditionally.
    pub fn dismiss(&mut self, hud: &mut HudModel) {
        self.session = None;
        hud.interaction_popup = None;
    }
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop_at(id: &str, position: [f32; 3]) -> Option<InteractableProp> {
        Some(InteractableProp {
            id: id.to_string(),
            name: id.to_string(),
            card_image: format!("ui/card/{id}"),
            node: 0,
            body: RigidBodyHandle::invalid(),
            position,
        })
    }

    fn scanner() -> InteractionScanner {
        InteractionScanner::new(5.0, 5.0)
    }

    #[test]
    fn test_nearest_in_range_selection() {
        let props = vec![
            prop_at("near", [3.0, 0.0, 0.0]),
            prop_at("edge", [4.9, 0.0, 0.0]),
            prop_at("far", [6.0, 0.0, 0.0]),
        ];
        let scanner = scanner();
        let nearest = scanner.nearest_in_range([0.0, 0.0, 0.0], &props).unwrap();
        assert_eq!(nearest.id, "near");
    }

    #[test]
    fn test_out_of_range_prop_excluded() {
        let props = vec![prop_at("far", [6.0, 0.0, 0.0])];
        let scanner = scanner();
        assert!(scanner.nearest_in_range([0.0, 0.0, 0.0], &props).is_none());
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let props = vec![
            prop_at("first", [3.0, 0.0, 0.0]),
            prop_at("second", [0.0, 0.0, 3.0]),
        ];
        let scanner = scanner();
        let nearest = scanner.nearest_in_range([0.0, 0.0, 0.0], &props).unwrap();
        assert_eq!(nearest.id, "first");
    }

    #[test]
    fn test_unloaded_slots_skipped() {
        let props = vec![None, prop_at("only", [2.0, 0.0, 0.0]), None];
        let scanner = scanner();
        let nearest = scanner.nearest_in_range([0.0, 0.0, 0.0], &props).unwrap();
        assert_eq!(nearest.id, "only");
    }

    #[test]
    fn test_fresh_press_opens_once_while_held() {
        let props = vec![prop_at("bench", [2.0, 0.0, 0.0])];
        let mut scanner = scanner();
        let mut hud = HudModel::new();
        let at = Some([0.0, 0.0, 0.0]);
        let dt = 1.0 / 60.0;

        scanner.update(at, &props, false, dt, &mut hud);
        assert!(hud.interact_prompt_visible);
        assert!(hud.interaction_popup.is_none());

        scanner.update(at, &props, true, dt, &mut hud);
        assert!(hud.interaction_popup.is_some());
        assert!(!hud.interact_prompt_visible);
        let opened_at = scanner.session.as_ref().unwrap().remaining;

        // Still holding: the popup is not re-opened, the countdown runs on
        scanner.update(at, &props, true, dt, &mut hud);
        assert!(scanner.session.as_ref().unwrap().remaining < opened_at);
    }

    #[test]
    fn test_popup_auto_dismisses_after_delay() {
        let props = vec![prop_at("bench", [2.0, 0.0, 0.0])];
        let mut scanner = scanner();
        let mut hud = HudModel::new();
        let at = Some([0.0, 0.0, 0.0]);

        scanner.update(at, &props, true, 1.0 / 60.0, &mut hud);
        assert!(hud.interaction_popup.is_some());

        // Just under five seconds: still open
        scanner.update(at, &props, false, 4.9, &mut hud);
        assert!(hud.interaction_popup.is_some());

        scanner.update(at, &props, false, 0.2, &mut hud);
        assert!(hud.interaction_popup.is_none());
        assert!(hud.interact_prompt_visible);
    }

    #[test]
    fn test_explicit_dismiss_cancels_auto_close() {
        let props = vec![prop_at("bench", [2.0, 0.0, 0.0])];
        let mut scanner = scanner();
        let mut hud = HudModel::new();
        let at = Some([0.0, 0.0, 0.0]);

        scanner.update(at, &props, true, 1.0 / 60.0, &mut hud);
        scanner.update(at, &props, false, 1.0, &mut hud);
        assert!(hud.interaction_popup.is_some());

        // Escape at t = 1 s closes immediately and drops the countdown
        scanner.dismiss(&mut hud);
        assert!(hud.interaction_popup.is_none());
        assert!(scanner.session.is_none());

        // A new popup gets a fresh five-second countdown
        scanner.update(at, &props, true, 1.0 / 60.0, &mut hud);
        assert!(scanner.session.as_ref().unwrap().remaining > 4.9);
    }

    #[test]
    fn test_prompt_hidden_when_out_of_range_or_unloaded() {
        let mut scanner = scanner();
        let mut hud = HudModel::new();
        hud.interact_prompt_visible = true;

        scanner.update(Some([50.0, 0.0, 0.0]), &[], false, 1.0 / 60.0, &mut hud);
        assert!(!hud.interact_prompt_visible);

        // Character not loaded yet
        hud.interact_prompt_visible = true;
        scanner.update(None, &[], false, 1.0 / 60.0, &mut hud);
        assert!(!hud.interact_prompt_visible);
    }
}
