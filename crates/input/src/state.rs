use crate::action::Action;
use crate::gamepad::GamepadAxes;
use glam::Vec2;
use glimmer_camera::Movement;
use std::collections::BTreeSet;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    /// Held for wireframe rendering.
    E,
    Escape,
}

impl Key {
    /// Camera movement bound to this key, if any.
    pub fn movement(self) -> Option<Movement> {
        match self {
            Key::W => Some(Movement::Forward),
            Key::S => Some(Movement::Backward),
            Key::A => Some(Movement::Left),
            Key::D => Some(Movement::Right),
            Key::E | Key::Escape => None,
        }
    }
}

/// Input accumulated between two frames.
///
/// Held keys and the last gamepad reading persist until replaced; pointer
/// and scroll deltas accumulate and are reset by
/// [`InputState::drain_actions`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<Key>,
    pointer_delta: Vec2,
    scroll_delta: f32,
    close_requested: bool,
    gamepad: GamepadAxes,
    wireframe: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release.
    pub fn key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    /// Raw pointer motion in window pixels (`y` grows downward).
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.pointer_delta += Vec2::new(dx, dy);
    }

    pub fn scrolled(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    /// Latest stick positions; `GamepadAxes::default()` when none is connected.
    pub fn set_gamepad(&mut self, axes: GamepadAxes) {
        self.gamepad = axes;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Translate this frame's input into actions and reset the deltas.
    ///
    /// Order: quit, wireframe change, movement, look, zoom. A direction
    /// pushed by both a key and the stick moves once. Pointer `y` is negated
    /// because window coordinates grow downward.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.close_requested || self.is_held(Key::Escape) {
            tracing::debug!("quit requested");
            actions.push(Action::Quit);
        }

        let wireframe = self.is_held(Key::E);
        if wireframe != self.wireframe {
            self.wireframe = wireframe;
            actions.push(Action::Wireframe(wireframe));
        }

        let mut moves: Vec<Movement> = Vec::new();
        let keyed = self.held.iter().filter_map(|key| key.movement());
        for movement in keyed.chain(self.gamepad.movements()) {
            if !moves.contains(&movement) {
                moves.push(movement);
            }
        }
        actions.extend(moves.into_iter().map(Action::Move));

        let pointer = std::mem::take(&mut self.pointer_delta);
        let look = Vec2::new(pointer.x + self.gamepad.look(), -pointer.y);
        if look != Vec2::ZERO {
            actions.push(Action::Look {
                x: look.x,
                y: look.y,
            });
        }
        let scroll = std::mem::take(&mut self.scroll_delta) + self.gamepad.zoom();
        if scroll != 0.0 {
            actions.push(Action::Zoom(scroll));
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_repeat_every_frame() {
        let mut input = InputState::new();
        input.key(Key::W, true);
        assert_eq!(input.drain_actions(), vec![Action::Move(Movement::Forward)]);
        assert_eq!(input.drain_actions(), vec![Action::Move(Movement::Forward)]);
        input.key(Key::W, false);
        assert!(input.drain_actions().is_empty());
    }

    #[test]
    fn pointer_deltas_accumulate_and_reset() {
        let mut input = InputState::new();
        input.pointer_moved(3.0, 4.0);
        input.pointer_moved(1.0, -1.0);
        assert_eq!(input.drain_actions(), vec![Action::Look { x: 4.0, y: -3.0 }]);
        assert!(input.drain_actions().is_empty());
    }

    #[test]
    fn scroll_becomes_zoom() {
        let mut input = InputState::new();
        input.scrolled(2.0);
        input.scrolled(-0.5);
        assert_eq!(input.drain_actions(), vec![Action::Zoom(1.5)]);
    }

    #[test]
    fn escape_and_close_quit_first() {
        let mut input = InputState::new();
        input.key(Key::D, true);
        input.key(Key::Escape, true);
        let actions = input.drain_actions();
        assert_eq!(actions[0], Action::Quit);
        assert!(actions.contains(&Action::Move(Movement::Right)));

        let mut closing = InputState::new();
        closing.request_close();
        assert_eq!(closing.drain_actions(), vec![Action::Quit]);
    }

    #[test]
    fn every_movement_key_is_bound() {
        let bound: Vec<_> = [Key::W, Key::A, Key::S, Key::D]
            .into_iter()
            .filter_map(Key::movement)
            .collect();
        assert_eq!(bound.len(), 4);
        assert_eq!(Key::Escape.movement(), None);
        assert_eq!(Key::E.movement(), None);
    }

    #[test]
    fn wireframe_follows_e_and_reports_changes_once() {
        let mut input = InputState::new();
        assert!(input.drain_actions().is_empty());

        input.key(Key::E, true);
        assert_eq!(input.drain_actions(), vec![Action::Wireframe(true)]);
        assert!(input.drain_actions().is_empty());

        input.key(Key::E, false);
        assert_eq!(input.drain_actions(), vec![Action::Wireframe(false)]);
        assert!(input.drain_actions().is_empty());
    }

    #[test]
    fn gamepad_moves_looks_and_zooms() {
        let mut input = InputState::new();
        input.key(Key::W, true);
        input.set_gamepad(GamepadAxes {
            left_x: 0.9,
            left_y: 0.7,
            right_x: 0.5,
            right_y: -0.4,
        });
        let actions = input.drain_actions();
        assert_eq!(
            actions,
            vec![
                Action::Move(Movement::Forward),
                Action::Move(Movement::Right),
                Action::Look { x: 0.5, y: 0.0 },
                Action::Zoom(-0.4),
            ]
        );
        // The stick reading persists until replaced.
        assert_eq!(input.drain_actions(), actions);

        input.key(Key::W, false);
        input.set_gamepad(GamepadAxes::default());
        assert!(input.drain_actions().is_empty());
    }

    #[test]
    fn stick_look_adds_to_pointer() {
        let mut input = InputState::new();
        input.pointer_moved(2.0, 3.0);
        input.set_gamepad(GamepadAxes {
            right_x: -1.0,
            ..GamepadAxes::default()
        });
        assert_eq!(input.drain_actions(), vec![Action::Look { x: 1.0, y: -3.0 }]);
    }
}
