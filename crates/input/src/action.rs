use glimmer_camera::Movement;

/// A high-level camera or application action.
///
/// The frame driver consumes actions, never raw window events, so the
/// windowed viewer and the headless simulator share one update path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the camera one step in a direction; scaled by the frame time.
    Move(Movement),
    /// Pointer motion in pixels, positive `y` meaning "look up".
    Look { x: f32, y: f32 },
    /// Scroll amount; positive narrows the field of view.
    Zoom(f32),
    /// Switch between filled and edge-only rendering.
    Wireframe(bool),
    /// Leave the render loop.
    Quit,
}

impl Action {
    pub fn is_quit(&self) -> bool {
        matches!(self, Action::Quit)
    }
}
