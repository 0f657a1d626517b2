//! Window-independent input mapping.
//!
//! The viewer feeds raw key, pointer, scroll and gamepad input into an
//! [`InputState`]; once per frame it is drained into [`Action`]s that the
//! frame driver applies to the camera.
//!
//! # Invariants
//! - Held movement keys produce one `Move` action per frame.
//! - Pointer and scroll deltas are consumed exactly once.

mod action;
mod gamepad;
mod state;

pub use action::Action;
pub use gamepad::{GamepadAxes, STICK_DEADZONE, deadzone};
pub use state::{InputState, Key};
