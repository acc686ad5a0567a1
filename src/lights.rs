use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Per-variant capacity of the light arrays, baked per build. The resolver
/// never reads past it even when a raw active count claims more.
pub const MAX_LIGHTS: usize = 64;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    _padding: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    _padding: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpotLight {
    pub position: [f32; 3],
    _padding: f32,
    pub direction: [f32; 3],
    pub cut_off: f32,
    pub color: [f32; 4],
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec4) -> Self {
        Self { direction: direction.to_array(), _padding: 0.0, color: color.to_array() }
    }
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self { position: position.to_array(), _padding: 0.0, color: color.to_array() }
    }
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3, cut_off: f32, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            _padding: 0.0,
            direction: direction.to_array(),
            cut_off,
            color: color.to_array(),
        }
    }
}

/// Fixed-capacity ordered storage with an explicit active count. Producers
/// validate at write time; consumers iterate [`active`](Self::active), which
/// caps the count at capacity and never exposes stale slots.
#[derive(Clone, Copy)]
pub struct LightArray<T> {
    entries: [T; MAX_LIGHTS],
    count: u32,
}

impl<T: Copy + Pod> LightArray<T> {
    pub fn new() -> Self {
        Self { entries: [T::zeroed(); MAX_LIGHTS], count: 0 }
    }

    /// Takes a pre-filled buffer and its claimed active count, e.g. from a
    /// host that packs light data itself. Counts past capacity are kept as
    /// claimed but never iterated.
    pub fn from_raw(entries: [T; MAX_LIGHTS], count: u32) -> Self {
        if count as usize > MAX_LIGHTS {
            log::warn!("light count {count} exceeds capacity {MAX_LIGHTS}; extra entries ignored");
        }
        Self { entries, count }
    }

    pub fn push(&mut self, light: T) -> bool {
        if (self.count as usize) < MAX_LIGHTS {
            self.entries[self.count as usize] = light;
            self.count += 1;
            true
        } else {
            log::warn!("light budget exceeded (max {MAX_LIGHTS}); entry ignored");
            false
        }
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn active(&self) -> &[T] {
        &self.entries[..(self.count as usize).min(MAX_LIGHTS)]
    }

    /// Active entries prefixed with their count, the uniform layout hosts
    /// upload verbatim.
    pub fn packed_bytes(&self) -> Vec<u8> {
        let active = self.active();
        let mut bytes = Vec::with_capacity(4 + std::mem::size_of_val(active));
        bytes.extend_from_slice(bytemuck::bytes_of(&(active.len() as u32)));
        bytes.extend_from_slice(bytemuck::cast_slice(active));
        bytes
    }
}

impl<T: Copy + Pod> Default for LightArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The three per-frame light arrays. Spot lights are stored and bounded like
/// the others but the resolver has no shading path for them yet.
#[derive(Clone, Copy, Default)]
pub struct SceneLights {
    pub directional: LightArray<DirectionalLight>,
    pub point: LightArray<PointLight>,
    pub spot: LightArray<SpotLight>,
}

impl SceneLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
        self.spot.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_caps_at_capacity() {
        let mut array = LightArray::new();
        for i in 0..MAX_LIGHTS + 4 {
            let accepted =
                array.push(PointLight::new(Vec3::new(i as f32, 0.0, 0.0), Vec4::ONE));
            assert_eq!(accepted, i < MAX_LIGHTS);
        }
        assert_eq!(array.len() as usize, MAX_LIGHTS);
        assert_eq!(array.active().len(), MAX_LIGHTS);
    }

    #[test]
    fn from_raw_never_iterates_past_capacity() {
        let entries = [PointLight::new(Vec3::ZERO, Vec4::ONE); MAX_LIGHTS];
        let array = LightArray::from_raw(entries, MAX_LIGHTS as u32 + 10);
        assert_eq!(array.active().len(), MAX_LIGHTS);
    }

    #[test]
    fn packed_bytes_carries_count_header() {
        let mut array = LightArray::new();
        array.push(DirectionalLight::new(Vec3::NEG_Y, Vec4::ONE));
        array.push(DirectionalLight::new(Vec3::X, Vec4::ONE));
        let bytes = array.packed_bytes();
        assert_eq!(bytes.len(), 4 + 2 * std::mem::size_of::<DirectionalLight>());
        assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 2);
    }

    #[test]
    fn light_layouts_match_the_uniform_stride() {
        assert_eq!(std::mem::size_of::<DirectionalLight>(), 32);
        assert_eq!(std::mem::size_of::<PointLight>(), 32);
        assert_eq!(std::mem::size_of::<SpotLight>(), 48);
    }
}
