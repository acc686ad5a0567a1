use glam::{Mat4, Vec2, Vec3, Vec4};
use half::f16;

pub const FACE_COUNT: usize = 6;

// Rows as written map the canonical +Z face basis into each face's frame.
// Face order: +X, -X, +Y, -Y, +Z, -Z.
#[rustfmt::skip]
const FACE_ROTATIONS: [[f32; 16]; FACE_COUNT] = [
    // +X, rot: Y(-PI/2)
    [
        0.0, 0.0, 1.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -1., 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
    // -X, rot: Y(PI/2)
    [
        0.0, 0.0, -1., 0.0,
        0.0, 1.0, 0.0, 0.0,
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
    // +Y, rot: X(-PI/2)
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, -1., 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
    // -Y, rot: X(PI/2)
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, -1., 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
    // +Z, rot: none
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
    // -Z, rot: Y(PI)
    [
        -1., 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, -1., 0.0,
        0.0, 0.0, 0.0, 1.0,
    ],
];

/// Fixed rotation carrying the canonical face basis into `face`'s frame.
pub fn face_rotation(face: usize) -> Mat4 {
    // The table is laid out row-major; glam reads column-major.
    Mat4::from_cols_array(&FACE_ROTATIONS[face]).transpose()
}

/// Unit direction through the center of texel (x, y) on `face`.
pub fn texel_direction(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let u = (x as f32 + 0.5) / size as f32;
    let v = (y as f32 + 0.5) / size as f32;
    face_uv_direction(face, Vec2::new(u, v))
}

/// Unit direction for a normalized position in [0,1]^2 on `face`: the
/// top-left/right/down basis of the canonical face, rotated into place.
pub fn face_uv_direction(face: usize, uv: Vec2) -> Vec3 {
    let local = Vec3::new(2.0 * uv.x - 1.0, 1.0 - 2.0 * uv.y, 1.0);
    (face_rotation(face) * local.extend(0.0)).truncate().normalize()
}

/// Inverse of [`face_uv_direction`]: dominant-axis face selection plus the
/// face-local uv of the intersection with that face's plane.
pub fn direction_to_face_uv(dir: Vec3) -> (usize, Vec2) {
    let abs = dir.abs();
    let face = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x > 0.0 {
            0
        } else {
            1
        }
    } else if abs.y >= abs.z {
        if dir.y > 0.0 {
            2
        } else {
            3
        }
    } else if dir.z > 0.0 {
        4
    } else {
        5
    };
    // Rotations are orthonormal, so the transpose maps world back to face-local.
    let local = (face_rotation(face).transpose() * dir.extend(0.0)).truncate();
    let inv = 1.0 / local.z;
    (face, Vec2::new((local.x * inv + 1.0) * 0.5, (1.0 - local.y * inv) * 0.5))
}

/// Six equal square faces of linear-HDR texels, produced by the environment
/// projector or the irradiance convolver and immutable afterwards.
#[derive(Clone)]
pub struct Cubemap {
    size: u32,
    faces: [Vec<Vec4>; FACE_COUNT],
}

impl Cubemap {
    pub fn new(size: u32) -> Self {
        let len = (size * size) as usize;
        Self { size, faces: std::array::from_fn(|_| vec![Vec4::ZERO; len]) }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn texel(&self, face: usize, x: u32, y: u32) -> Vec4 {
        self.faces[face][(y * self.size + x) as usize]
    }

    pub fn set_texel(&mut self, face: usize, x: u32, y: u32, value: Vec4) {
        self.faces[face][(y * self.size + x) as usize] = value;
    }

    /// Bilinear fetch at a face-local uv, clamped to the face edge.
    pub fn sample_face(&self, face: usize, uv: Vec2) -> Vec4 {
        let size = self.size as f32;
        let x = uv.x * size - 0.5;
        let y = uv.y * size - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;
        let max = self.size - 1;
        let ix0 = (x0.max(0.0) as u32).min(max);
        let ix1 = ((x0 + 1.0).max(0.0) as u32).min(max);
        let iy0 = (y0.max(0.0) as u32).min(max);
        let iy1 = ((y0 + 1.0).max(0.0) as u32).min(max);
        let c00 = self.texel(face, ix0, iy0);
        let c10 = self.texel(face, ix1, iy0);
        let c01 = self.texel(face, ix0, iy1);
        let c11 = self.texel(face, ix1, iy1);
        let c0 = c00 * (1.0 - tx) + c10 * tx;
        let c1 = c01 * (1.0 - tx) + c11 * tx;
        c0 * (1.0 - ty) + c1 * ty
    }

    /// Direction-indexed fetch at the finest (only) level.
    pub fn sample(&self, dir: Vec3) -> Vec4 {
        let (face, uv) = direction_to_face_uv(dir);
        self.sample_face(face, uv)
    }

    /// One face's texels as packed f16 bits, the layout hosts upload.
    pub fn face_f16_bits(&self, face: usize) -> Vec<u16> {
        self.faces[face]
            .iter()
            .flat_map(|texel| texel.to_array().map(|v| f16::from_f32(v).to_bits()))
            .collect()
    }
}
