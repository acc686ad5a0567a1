use crate::cubemap::{texel_direction, Cubemap, FACE_COUNT};
use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use image::{DynamicImage, ImageReader};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Angular increment of the irradiance quadrature. Baked per build; the
/// sample count per texel is floor(2pi/delta) * floor((pi/2)/delta).
pub const SAMPLE_DELTA: f32 = 0.025;

const WORLD_UP: Vec3 = Vec3::Y;
const FALLBACK_RIGHT: Vec3 = Vec3::X;

/// Decoded equirectangular panorama in linear space.
#[derive(Clone, Debug)]
pub struct HdrImage {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl HdrImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Bilinear fetch: u wraps around the seam, v clamps at the poles.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let x = uv.x * (self.width as f32 - 1.0);
        let y = uv.y.clamp(0.0, 1.0) * (self.height as f32 - 1.0);
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;

        let ix0 = x0.rem_euclid(self.width as f32) as u32;
        let ix1 = (x0 + 1.0).rem_euclid(self.width as f32) as u32;
        let iy0 = y0.clamp(0.0, (self.height - 1) as f32) as u32;
        let iy1 = (y0 + 1.0).clamp(0.0, (self.height - 1) as f32) as u32;

        let c00 = self.pixel(ix0, iy0);
        let c10 = self.pixel(ix1, iy0);
        let c01 = self.pixel(ix0, iy1);
        let c11 = self.pixel(ix1, iy1);

        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }
}

pub fn load_panorama(path: &str) -> Result<HdrImage> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("opening panorama '{path}'"))?
        .with_guessed_format()
        .with_context(|| format!("probing panorama format for '{path}'"))?;
    let dyn_img = reader.decode().with_context(|| format!("decoding panorama '{path}'"))?;
    Ok(convert_panorama(&dyn_img))
}

fn convert_panorama(image: &DynamicImage) -> HdrImage {
    let rgb = image.to_rgb32f();
    let width = rgb.width();
    let height = rgb.height();
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for pixel in rgb.pixels() {
        let [r, g, b] = pixel.0;
        pixels.push(Vec3::new(r, g, b));
    }
    HdrImage { width, height, pixels }
}

/// Neutral gradient panorama used when no source file is supplied: dark
/// ground in the low rows, brightening sky with a soft sun above.
pub fn generated_default() -> HdrImage {
    let width = 256u32;
    let height = 128u32;
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let v = y as f32 / (height - 1) as f32;
        for x in 0..width {
            let u = x as f32 / (width - 1) as f32;
            let horizon = (1.0 - (2.0 * (v - 0.5)).abs()).clamp(0.0, 1.0);
            let sky = Vec3::new(0.25, 0.35, 0.6) * (1.0 - v) + Vec3::new(0.65, 0.7, 0.9) * v;
            let ground =
                Vec3::new(0.08, 0.07, 0.05) * (1.0 - horizon) + Vec3::new(0.2, 0.18, 0.16) * horizon;
            let sun_offset = Vec2::new(u - 0.3, v - 0.7);
            let sun = (1.0 - sun_offset.length() * 6.0).max(0.0).powf(12.0);
            let mut color = sky * v * (0.6 + 0.4 * horizon) + ground * (1.0 - v);
            color += Vec3::new(1.0, 0.9, 0.75) * sun * 8.0;
            pixels.push(color);
        }
    }
    HdrImage { width, height, pixels }
}

/// Equirectangular uv of a unit direction:
/// u = atan2(x, z) / 2pi + 0.5, v = y / 2 + 0.5.
pub fn equirect_uv(dir: Vec3) -> Vec2 {
    Vec2::new(dir.x.atan2(dir.z) / TAU + 0.5, dir.y * 0.5 + 0.5)
}

/// Projects an equirectangular panorama onto the six cube faces. Pure
/// geometric resampling: one panorama fetch per output texel, finest level.
pub fn project_equirect(panorama: &HdrImage, size: u32) -> Cubemap {
    let mut map = Cubemap::new(size);
    for face in 0..FACE_COUNT {
        for y in 0..size {
            for x in 0..size {
                let dir = texel_direction(face, x, y, size);
                let color = panorama.sample(equirect_uv(dir));
                map.set_texel(face, x, y, color.extend(1.0));
            }
        }
    }
    map
}

/// Cosine-weighted hemispherical irradiance for one normal direction: the
/// per-texel kernel of the convolution pass.
pub fn irradiance_for_normal(source: &Cubemap, normal: Vec3) -> Vec3 {
    let mut right = WORLD_UP.cross(normal);
    if right.length_squared() < 1e-8 {
        right = FALLBACK_RIGHT;
    }
    let right = right.normalize();
    let up = normal.cross(right).normalize();

    let mut sum = Vec3::ZERO;
    let mut samples = 0u32;
    let mut phi = 0.0f32;
    while phi < TAU {
        let mut theta = 0.0f32;
        while theta < FRAC_PI_2 {
            let tangent = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
            let dir = right * tangent.x + up * tangent.y + normal * tangent.z;
            sum += source.sample(dir).truncate() * theta.cos() * theta.sin();
            samples += 1;
            theta += SAMPLE_DELTA;
        }
        phi += SAMPLE_DELTA;
    }
    sum * PI / samples as f32
}

/// Convolves a radiance cube map into a diffuse-irradiance cube map with the
/// fixed-step quadrature of [`irradiance_for_normal`]. Deterministic for a
/// given [`SAMPLE_DELTA`]; cost per texel does not depend on the data.
pub fn convolve_irradiance(source: &Cubemap, size: u32) -> Cubemap {
    let mut map = Cubemap::new(size);
    for face in 0..FACE_COUNT {
        for y in 0..size {
            for x in 0..size {
                let normal = texel_direction(face, x, y, size);
                let irradiance = irradiance_for_normal(source, normal);
                map.set_texel(face, x, y, irradiance.extend(1.0));
            }
        }
    }
    map
}

/// Radiance and irradiance maps for one environment, rebuilt together when
/// the environment changes and read-only afterwards.
#[derive(Clone)]
pub struct EnvironmentMaps {
    pub cubemap: Cubemap,
    pub irradiance: Cubemap,
}

impl EnvironmentMaps {
    pub fn from_panorama(panorama: &HdrImage, cubemap_size: u32, irradiance_size: u32) -> Self {
        let cubemap = project_equirect(panorama, cubemap_size);
        let irradiance = convolve_irradiance(&cubemap, irradiance_size);
        Self { cubemap, irradiance }
    }

    pub fn from_path(path: &str, cubemap_size: u32, irradiance_size: u32) -> Result<Self> {
        let panorama = load_panorama(path)?;
        Ok(Self::from_panorama(&panorama, cubemap_size, irradiance_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn generated_default_has_expected_dimensions() {
        let panorama = generated_default();
        assert_eq!(panorama.width(), 256);
        assert_eq!(panorama.height(), 128);
        assert!(panorama.pixels.iter().all(|p| p.min_element() >= 0.0));
    }

    #[test]
    fn equirect_uv_covers_the_axes() {
        let uv = equirect_uv(Vec3::Z);
        assert!((uv - Vec2::new(0.5, 0.5)).length() < 1e-6);
        let up = equirect_uv(Vec3::Y);
        assert!((up.y - 1.0).abs() < 1e-6);
        let down = equirect_uv(Vec3::NEG_Y);
        assert!(down.y.abs() < 1e-6);
    }

    #[test]
    fn sampling_wraps_horizontally() {
        let panorama = generated_default();
        let left = panorama.sample(Vec2::new(0.0, 0.5));
        let wrapped = panorama.sample(Vec2::new(1.0, 0.5));
        assert!((left - wrapped).length() < 0.05, "seam mismatch: {left:?} vs {wrapped:?}");
    }

    #[test]
    fn load_panorama_reads_png_files() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sky.png");
        let mut img = RgbImage::new(8, 4);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 30) as u8, (y * 60) as u8, 120]);
        }
        img.save(&path).expect("save png");

        let panorama = load_panorama(path.to_str().expect("utf8 path")).expect("load panorama");
        assert_eq!(panorama.width(), 8);
        assert_eq!(panorama.height(), 4);
    }

    #[test]
    fn load_panorama_reports_missing_files() {
        let err = load_panorama("/definitely/not/here.hdr").unwrap_err();
        assert!(err.to_string().contains("opening panorama"));
    }
}
