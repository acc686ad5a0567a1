use glam::{Vec2, Vec3, Vec4};

/// Linear RGBA image sampled bilinearly with clamp-to-edge addressing, the
/// one filtering configuration shared by every image read in the pipeline.
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl Texture {
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>) -> Self {
        debug_assert_eq!(texels.len(), (width * height) as usize);
        Self { width, height, texels }
    }

    /// Decodes 8-bit RGBA rows into [0,1] texels. Values are taken as-is;
    /// sRGB decoding, if any, is the host's concern.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Self {
        let texels = data
            .chunks_exact(4)
            .map(|px| {
                Vec4::new(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                )
            })
            .collect();
        Self { width, height, texels }
    }

    pub fn solid(value: Vec4) -> Self {
        Self { width: 1, height: 1, texels: vec![value] }
    }

    /// 1x1 grayscale factor, the stand-in for an unbound metallic/roughness/
    /// AO map.
    pub fn factor(value: f32) -> Self {
        Self::solid(Vec4::new(value, value, value, 1.0))
    }

    /// 1x1 encoded straight-up normal, the stand-in for an unbound normal map.
    pub fn flat_normal() -> Self {
        Self::solid(Vec4::new(0.5, 0.5, 1.0, 1.0))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.texels[(y * self.width + x) as usize]
    }

    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let max_x = self.width - 1;
        let max_y = self.height - 1;
        let ix0 = (x0.max(0.0) as u32).min(max_x);
        let ix1 = ((x0 + 1.0).max(0.0) as u32).min(max_x);
        let iy0 = (y0.max(0.0) as u32).min(max_y);
        let iy1 = ((y0 + 1.0).max(0.0) as u32).min(max_y);
        let c00 = self.texel(ix0, iy0);
        let c10 = self.texel(ix1, iy0);
        let c01 = self.texel(ix0, iy1);
        let c11 = self.texel(ix1, iy1);
        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }
}

/// One material's texture set: albedo, optional normal map, and the three
/// single-channel maps the geometry pass packs together.
#[derive(Clone, Debug)]
pub struct Material {
    pub albedo: Texture,
    pub normal: Option<Texture>,
    pub metallic: Texture,
    pub roughness: Texture,
    pub ao: Texture,
}

impl Material {
    pub fn new(
        albedo: Texture,
        normal: Option<Texture>,
        metallic: Texture,
        roughness: Texture,
        ao: Option<Texture>,
    ) -> Self {
        Self {
            albedo,
            normal,
            metallic,
            roughness,
            ao: ao.unwrap_or_else(|| Texture::factor(1.0)),
        }
    }

    /// Constant metallic/roughness factors instead of full maps.
    pub fn with_factors(
        albedo: Texture,
        normal: Option<Texture>,
        metallic: f32,
        roughness: f32,
        ao: Option<Texture>,
    ) -> Self {
        Self::new(albedo, normal, Texture::factor(metallic), Texture::factor(roughness), ao)
    }

    pub fn solid_color(color: Vec3, metallic: f32, roughness: f32) -> Self {
        Self::with_factors(Texture::solid(color.extend(1.0)), None, metallic, roughness, None)
    }
}

/// Ordered material set; draws select an entry by index.
#[derive(Clone, Debug, Default)]
pub struct MaterialArray {
    materials: Vec<Material>,
}

impl MaterialArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Out-of-range indices are a host contract violation; the first entry
    /// is substituted so the draw still produces defined output.
    pub fn get(&self, index: u32) -> &Material {
        if let Some(material) = self.materials.get(index as usize) {
            material
        } else {
            log::warn!("material index {index} out of range ({} bound); using entry 0", self.len());
            self.materials.first().unwrap_or_else(|| panic!("no materials bound"))
        }
    }
}
