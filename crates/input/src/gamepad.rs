use glimmer_camera::Movement;

/// Stick deflection below this magnitude is ignored.
pub const STICK_DEADZONE: f32 = 0.15;

/// Stick positions of one gamepad, each axis in [-1, 1] with up and right
/// positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadAxes {
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
}

/// `value` with the deadzone cut out, so small drift reads as zero.
pub fn deadzone(value: f32) -> f32 {
    if value.abs() > STICK_DEADZONE { value } else { 0.0 }
}

impl GamepadAxes {
    /// Movement directions the left stick is pushed towards.
    pub fn movements(&self) -> impl Iterator<Item = Movement> {
        let forward = match deadzone(self.left_y) {
            y if y > 0.0 => Some(Movement::Forward),
            y if y < 0.0 => Some(Movement::Backward),
            _ => None,
        };
        let sideways = match deadzone(self.left_x) {
            x if x > 0.0 => Some(Movement::Right),
            x if x < 0.0 => Some(Movement::Left),
            _ => None,
        };
        forward.into_iter().chain(sideways)
    }

    /// Horizontal look from the right stick.
    pub fn look(&self) -> f32 {
        deadzone(self.right_x)
    }

    /// Zoom from the right stick; pushing up narrows the field of view.
    pub fn zoom(&self) -> f32 {
        deadzone(self.right_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_inside_deadzone_is_ignored() {
        let axes = GamepadAxes {
            left_x: 0.1,
            left_y: -0.15,
            right_x: 0.14,
            right_y: -0.05,
        };
        assert_eq!(axes.movements().count(), 0);
        assert_eq!(axes.look(), 0.0);
        assert_eq!(axes.zoom(), 0.0);
    }

    #[test]
    fn left_stick_maps_to_directions() {
        let axes = GamepadAxes {
            left_x: -0.8,
            left_y: 0.5,
            ..GamepadAxes::default()
        };
        let moves: Vec<_> = axes.movements().collect();
        assert_eq!(moves, vec![Movement::Forward, Movement::Left]);

        let back_right = GamepadAxes {
            left_x: 0.2,
            left_y: -1.0,
            ..GamepadAxes::default()
        };
        let moves: Vec<_> = back_right.movements().collect();
        assert_eq!(moves, vec![Movement::Backward, Movement::Right]);
    }

    #[test]
    fn right_stick_passes_through_outside_deadzone() {
        let axes = GamepadAxes {
            right_x: -0.6,
            right_y: 0.9,
            ..GamepadAxes::default()
        };
        assert_eq!(axes.look(), -0.6);
        assert_eq!(axes.zoom(), 0.9);
    }
}
