use glam::{Vec2, Vec3, Vec4};

/// Four co-resident attachments plus depth at one resolution. Allocated per
/// viewport size, fully overwritten by the geometry pass each frame, read
/// back by the lighting resolver within that frame.
#[derive(Clone)]
pub struct GBuffer {
    width: u32,
    height: u32,
    pub albedo: Vec<Vec4>,
    pub position: Vec<Vec4>,
    pub normal: Vec<Vec4>,
    pub mra: Vec<Vec4>,
    pub depth: Vec<f32>,
}

/// Surface attributes recovered from one G-buffer pixel.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceSample {
    pub albedo: Vec3,
    pub world_pos: Vec3,
    pub normal: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub ao: f32,
    pub depth: f32,
}

impl GBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        let mut buffer = Self {
            width,
            height,
            albedo: vec![Vec4::ZERO; len],
            position: vec![Vec4::ZERO; len],
            normal: vec![Vec4::ZERO; len],
            mra: vec![Vec4::ZERO; len],
            depth: vec![1.0; len],
        };
        buffer.clear();
        buffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Load-op equivalent: albedo clears to opaque black, the data
    /// attachments to zero, depth to the far plane.
    pub fn clear(&mut self) {
        self.albedo.fill(Vec4::new(0.0, 0.0, 0.0, 1.0));
        self.position.fill(Vec4::ZERO);
        self.normal.fill(Vec4::ZERO);
        self.mra.fill(Vec4::ZERO);
        self.depth.fill(1.0);
    }

    pub fn fetch(&self, x: u32, y: u32) -> SurfaceSample {
        let idx = self.index(x, y);
        let mra = self.mra[idx];
        SurfaceSample {
            albedo: self.albedo[idx].truncate(),
            world_pos: self.position[idx].truncate(),
            normal: self.normal[idx].truncate(),
            metallic: mra.x,
            roughness: mra.y,
            ao: mra.z,
            depth: self.depth[idx],
        }
    }

    /// Fetch at a normalized coordinate, the form the resolver uses.
    pub fn sample(&self, uv: Vec2) -> SurfaceSample {
        let x = ((uv.x * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = ((uv.y * self.height as f32) as u32).min(self.height.saturating_sub(1));
        self.fetch(x, y)
    }
}
