//! Orientation model for a free-look camera.
//!
//! Converts yaw/pitch and movement input into a position and an orthonormal
//! basis, and produces view/projection matrices from them.
//!
//! # Invariants
//! - `forward`, `right` and `up` are derived from yaw, pitch and world up.
//!   They are recomputed whenever one of those changes and are never set directly.
//! - Pitch stays within `±PITCH_LIMIT` whenever a look is applied with
//!   `constrain_pitch = true`.
//! - Zoom (field of view) stays within `[ZOOM_MIN, ZOOM_MAX]`.

mod camera;

pub use camera::{
    Camera, Movement, FAR_PLANE, NEAR_PLANE, PITCH, PITCH_LIMIT, SENSITIVITY, SPEED, YAW, ZOOM,
    ZOOM_MAX, ZOOM_MIN,
};

pub fn crate_info() -> &'static str {
    "glimmer-camera v0.1.0"
}
