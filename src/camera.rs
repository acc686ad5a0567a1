use glam::{Mat4, Vec3};

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Simple perspective camera driving the per-frame uniforms.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let aspect = if height > 0 { width as f32 / height as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn info(&self, width: u32, height: u32) -> CameraInfo {
        CameraInfo { view_proj: self.view_projection(width, height), eye: self.position }
    }
}

/// Per-frame camera uniforms: one live instance per frame, read-only to all
/// passes.
#[derive(Debug, Clone, Copy)]
pub struct CameraInfo {
    pub view_proj: Mat4,
    pub eye: Vec3,
}
