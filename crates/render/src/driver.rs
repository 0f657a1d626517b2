use crate::clock::FrameClock;
use crate::config::ViewerConfig;
use crate::light::{Lighting, Material};
use glam::Mat4;
use glimmer_assets::Model;
use glimmer_camera::Camera;
use glimmer_gpu::{GpuDevice, PolygonMode, ShaderProgram};
use glimmer_input::Action;
use std::fmt;

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub dt: f32,
    pub meshes_drawn: usize,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dt={:.4}s meshes={}", self.dt, self.meshes_drawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Continue(FrameStats),
    /// A quit action arrived; nothing was drawn.
    Exit,
}

/// Owns the camera, clock and scene lighting, and runs the body of the
/// render loop once per call to [`Driver::frame`].
#[derive(Debug, Clone)]
pub struct Driver {
    camera: Camera,
    clock: FrameClock,
    lighting: Lighting,
    material: Material,
    clear_color: [f32; 4],
    model_matrix: Mat4,
    aspect: f32,
    polygon_mode: PolygonMode,
}

impl Driver {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            camera: config.camera.build(),
            clock: FrameClock::new(),
            lighting: config.lighting.clone(),
            material: config.material,
            clear_color: config.clear_color,
            model_matrix: Mat4::IDENTITY,
            aspect: config.aspect(),
            polygon_mode: PolygonMode::Fill,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    /// Track the framebuffer size. A zero-sized (minimised) window keeps the
    /// previous aspect ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        tracing::debug!(width, height, aspect = self.aspect, "viewport resized");
    }

    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model_matrix = model;
    }

    /// Apply camera actions for a frame of length `dt`. Returns true when a
    /// quit was requested.
    pub fn apply_actions(&mut self, actions: &[Action], dt: f32) -> bool {
        let mut quit = false;
        for action in actions {
            match *action {
                Action::Move(direction) => self.camera.apply_movement(direction, dt),
                Action::Look { x, y } => self.camera.apply_look(x, y, true),
                Action::Zoom(delta) => self.camera.apply_zoom(delta),
                Action::Wireframe(on) => {
                    self.polygon_mode = if on { PolygonMode::Line } else { PolygonMode::Fill };
                    tracing::debug!(mode = ?self.polygon_mode, "polygon mode changed");
                }
                Action::Quit => quit = true,
            }
        }
        quit
    }

    /// Push per-frame uniforms: camera, material, lights, then matrices.
    pub fn push_uniforms(&self, program: &mut dyn ShaderProgram) {
        program.use_program();
        program.set_vec3("view_pos", self.camera.position);
        self.material.apply(program);
        self.lighting.apply(program, &self.camera);
        program.set_mat4("projection", &self.camera.projection_matrix(self.aspect));
        program.set_mat4("view", &self.camera.view_matrix());
        program.set_mat4("model", &self.model_matrix);
    }

    /// One iteration of the render loop.
    ///
    /// `now` is an absolute timestamp in seconds. Uniforms are all written
    /// before the first draw of the frame.
    pub fn frame(
        &mut self,
        now: f64,
        actions: &[Action],
        device: &dyn GpuDevice,
        program: &mut dyn ShaderProgram,
        models: &[Model],
    ) -> FrameOutcome {
        let dt = self.clock.tick(now);
        if self.apply_actions(actions, dt) {
            tracing::info!("quit requested, leaving render loop");
            return FrameOutcome::Exit;
        }

        device.clear(self.clear_color);
        device.set_polygon_mode(self.polygon_mode);
        self.push_uniforms(program);
        let meshes_drawn = models.iter().map(|model| model.draw(program)).sum();

        FrameOutcome::Continue(FrameStats { dt, meshes_drawn })
    }
}
