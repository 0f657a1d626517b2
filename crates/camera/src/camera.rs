use glam::{Mat4, Vec3};

/// Default yaw in degrees. -90° looks down the negative Z axis.
pub const YAW: f32 = -90.0;
/// Default pitch in degrees.
pub const PITCH: f32 = 0.0;
/// Default movement speed in units per second.
pub const SPEED: f32 = 2.5;
/// Default look sensitivity (degrees per pointer unit).
pub const SENSITIVITY: f32 = 0.1;
/// Default field of view in degrees.
pub const ZOOM: f32 = 45.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Direction of a translation step, relative to the current orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-look camera with position, yaw, pitch and zoom.
///
/// Angles are stored in degrees. The basis vectors are cached but private:
/// every mutation of yaw, pitch or world up goes through `update_vectors`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Multiplier applied to look offsets before they reach yaw/pitch.
    pub sensitivity: f32,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Camera at `position` with the default orientation and +Y as world up.
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            speed: SPEED,
            sensitivity: SENSITIVITY,
            world_up,
            yaw,
            pitch,
            zoom: ZOOM,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn set_world_up(&mut self, world_up: Vec3) {
        self.world_up = world_up;
        self.update_vectors();
    }

    /// Translate along the forward or right vector by `speed * dt`.
    pub fn apply_movement(&mut self, direction: Movement, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            Movement::Forward => self.position += self.forward * velocity,
            Movement::Backward => self.position -= self.forward * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Accumulate pointer offsets into yaw and pitch.
    ///
    /// Yaw is left unbounded; the trigonometry wraps it.
    pub fn apply_look(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.sensitivity;
        self.pitch += yoffset * self.sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrow (positive delta) or widen (negative delta) the field of view.
    pub fn apply_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        // normalize_or_zero keeps a world up parallel to forward defined
        self.forward = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize_or_zero();
        self.right = self.forward.cross(self.world_up).normalize_or_zero();
        self.up = self.right.cross(self.forward).normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(cam: &Camera) {
        let (f, r, u) = (cam.forward(), cam.right(), cam.up());
        assert!((f.length() - 1.0).abs() < EPS, "forward {f}");
        assert!((r.length() - 1.0).abs() < EPS, "right {r}");
        assert!((u.length() - 1.0).abs() < EPS, "up {u}");
        assert!(f.dot(r).abs() < EPS);
        assert!(f.dot(u).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
        assert_eq!(cam.zoom(), ZOOM);
        assert_eq!(cam.speed, SPEED);
        assert_eq!(cam.sensitivity, SENSITIVITY);
    }

    #[test]
    fn basis_is_orthonormal_for_any_angles() {
        let mut yaw = -720.0;
        while yaw <= 720.0 {
            let mut pitch = -89.0;
            while pitch <= 89.0 {
                let cam = Camera::with_orientation(Vec3::ZERO, Vec3::Y, yaw, pitch);
                assert_orthonormal(&cam);
                pitch += 7.25;
            }
            yaw += 13.5;
        }
    }

    #[test]
    fn basis_stays_orthonormal_after_looks() {
        let mut cam = Camera::default();
        for i in 0..500 {
            let x = ((i * 37) % 200) as f32 - 100.0;
            let y = ((i * 53) % 160) as f32 - 80.0;
            cam.apply_look(x, y, true);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn constrained_pitch_never_leaves_limit() {
        let mut cam = Camera::default();
        for offset in [1.0e6, -3.0e7, 900.0, f32::MAX / 4.0, -1.0, 5000.0] {
            for _ in 0..10 {
                cam.apply_look(0.0, offset, true);
                assert!(cam.pitch() >= -PITCH_LIMIT && cam.pitch() <= PITCH_LIMIT);
            }
        }
    }

    #[test]
    fn unconstrained_pitch_accumulates() {
        let mut cam = Camera::default();
        cam.apply_look(0.0, 1200.0, false);
        assert!((cam.pitch() - 120.0).abs() < EPS);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.apply_zoom(-100.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        cam.apply_zoom(1.0e9);
        assert_eq!(cam.zoom(), ZOOM_MIN);
        cam.apply_zoom(-10.0);
        assert!((cam.zoom() - 11.0).abs() < EPS);
        for delta in [3.0, -7.5, 44.0, -90.0, 0.25, f32::MAX] {
            cam.apply_zoom(delta);
            assert!(cam.zoom() >= ZOOM_MIN && cam.zoom() <= ZOOM_MAX);
        }
    }

    #[test]
    fn view_matrix_is_idempotent() {
        let mut cam = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        cam.apply_look(42.0, -17.0, true);
        assert_eq!(cam.view_matrix(), cam.view_matrix());
    }

    #[test]
    fn forward_then_backward_returns_home() {
        let mut cam = Camera::new(Vec3::new(0.5, -1.0, 2.0));
        cam.apply_look(123.0, 45.0, true);
        let start = cam.position;
        cam.apply_movement(Movement::Forward, 0.75);
        assert!(!cam.position.abs_diff_eq(start, EPS));
        cam.apply_movement(Movement::Backward, 0.75);
        assert!(cam.position.abs_diff_eq(start, EPS));

        cam.apply_movement(Movement::Left, 0.3);
        cam.apply_movement(Movement::Right, 0.3);
        assert!(cam.position.abs_diff_eq(start, EPS));
    }

    #[test]
    fn forward_step_from_default_position() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        cam.apply_movement(Movement::Forward, 1.0);
        assert!(cam.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), EPS));
    }

    #[test]
    fn strafe_moves_along_right() {
        let mut cam = Camera::default();
        cam.apply_movement(Movement::Right, 2.0);
        assert!(cam.position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn world_up_change_recomputes_basis() {
        let mut cam = Camera::default();
        cam.set_world_up(Vec3::new(0.0, 1.0, 1.0).normalize());
        assert_orthonormal(&cam);
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn view_projection_is_finite() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let vp = cam.view_projection(800.0 / 600.0);
        assert!(vp.is_finite());
    }
}
