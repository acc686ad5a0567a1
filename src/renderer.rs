use crate::camera::CameraInfo;
use crate::cubemap::Cubemap;
use crate::gbuffer::GBuffer;
use crate::lights::SceneLights;
use crate::material::MaterialArray;
use crate::mesh::Mesh;
use anyhow::{Context, Result};
use glam::{Mat4, Vec4};
use std::path::Path;

pub mod geometry_pass;
pub mod lighting_pass;

/// Per-draw constants, supplied fresh for every draw call and never
/// persisted by the passes.
#[derive(Clone, Copy, Debug)]
pub struct DrawParams {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub texture_index: u32,
}

impl DrawParams {
    /// Derives the normal matrix as the inverse-transpose of the model so
    /// non-uniform scales keep normals perpendicular.
    pub fn from_model(model: Mat4, texture_index: u32) -> Self {
        Self { model, normal_matrix: model.inverse().transpose(), texture_index }
    }
}

/// Final-color image the lighting resolver writes into.
#[derive(Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pub pixels: Vec<Vec4>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![Vec4::new(0.0, 0.0, 0.0, 1.0); (width * height) as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut image = image::RgbaImage::new(self.width, self.height);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let color = self.pixel(x, y);
            *pixel = image::Rgba([
                (color.x.clamp(0.0, 1.0) * 255.0).round() as u8,
                (color.y.clamp(0.0, 1.0) * 255.0).round() as u8,
                (color.z.clamp(0.0, 1.0) * 255.0).round() as u8,
                (color.w.clamp(0.0, 1.0) * 255.0).round() as u8,
            ]);
        }
        image.save(path).with_context(|| format!("writing render target to '{}'", path.display()))
    }
}

/// Owns the G-buffer for one viewport and runs the two per-frame passes.
/// The asset-time pipeline (projection, then convolution) stays with the
/// host; its irradiance output arrives here as an optional read-only input.
pub struct DeferredRenderer {
    gbuffer: GBuffer,
}

impl DeferredRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { gbuffer: GBuffer::new(width, height) }
    }

    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.gbuffer.width() != width || self.gbuffer.height() != height {
            self.gbuffer = GBuffer::new(width, height);
        }
    }

    /// Clears the G-buffer for a fresh frame. Nothing survives from the
    /// previous one.
    pub fn begin_frame(&mut self) {
        self.gbuffer.clear();
    }

    pub fn draw(
        &mut self,
        mesh: &Mesh,
        params: &DrawParams,
        materials: &MaterialArray,
        camera: &CameraInfo,
    ) {
        let material = materials.get(params.texture_index);
        geometry_pass::rasterize_mesh(&mut self.gbuffer, mesh, params, material, camera);
    }

    pub fn resolve(
        &self,
        camera: &CameraInfo,
        lights: &SceneLights,
        irradiance: Option<&Cubemap>,
        target: &mut RenderTarget,
    ) {
        lighting_pass::resolve(&self.gbuffer, camera, lights, irradiance, target);
    }

    /// Debug variant replicating raw depth across the color channels.
    pub fn resolve_depth(&self, target: &mut RenderTarget) {
        lighting_pass::resolve_depth(&self.gbuffer, target);
    }
}
