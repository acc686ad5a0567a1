use glam::Vec3;
use std::f32::consts::PI;

/// Schlick approximation of the Fresnel reflectance fraction.
///
/// `cos_theta` is clamped to [0, 1] before the exponent so grazing-angle
/// inputs slightly below zero cannot blow up the power term.
pub fn fresnel_schlick(cos_theta: f32, f0: Vec3) -> Vec3 {
    let ct = cos_theta.clamp(0.0, 1.0);
    f0 + (Vec3::ONE - f0) * (1.0 - ct).powi(5)
}

/// Trowbridge-Reitz (GGX) microfacet normal distribution, alpha = roughness^2.
pub fn distribution_ggx(normal: Vec3, halfway: Vec3, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let n_dot_h = normal.dot(halfway).max(0.0);
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Schlick-GGX occlusion for a single direction, k = (roughness + 1)^2 / 8.
pub fn geometry_schlick_ggx(n_dot_v: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = (r * r) * 0.125;
    n_dot_v / (n_dot_v * (1.0 - k) + k)
}

/// Smith's method: shadowing and masking evaluated independently for the
/// view and light directions, then multiplied.
pub fn geometry_smith(normal: Vec3, view: Vec3, light: Vec3, roughness: f32) -> f32 {
    let n_dot_v = normal.dot(view).max(0.0);
    let n_dot_l = normal.dot(light).max(0.0);
    geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness)
}

/// Filmic curve with a 0.004 toe clip, followed by the 2.2 power that takes
/// the curve's output back to linear before presentation.
pub fn filmic_tone_map(color: Vec3) -> Vec3 {
    Vec3::new(filmic_channel(color.x), filmic_channel(color.y), filmic_channel(color.z))
}

fn filmic_channel(channel: f32) -> f32 {
    let x = (channel - 0.004).max(0.0);
    let mapped = (x * (6.2 * x + 0.5)) / (x * (6.2 * x + 1.7) + 0.06);
    mapped.powf(2.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresnel_at_normal_incidence_returns_f0() {
        for f0 in [Vec3::splat(0.04), Vec3::new(1.0, 0.0, 0.5), Vec3::ONE] {
            let f = fresnel_schlick(1.0, f0);
            assert!((f - f0).length() < 1e-6, "fresnel(1, {f0:?}) = {f:?}");
        }
    }

    #[test]
    fn fresnel_at_grazing_incidence_reaches_one() {
        for f0 in [Vec3::ZERO, Vec3::splat(0.04), Vec3::new(0.9, 0.2, 0.6)] {
            let f = fresnel_schlick(0.0, f0);
            assert!((f - Vec3::ONE).length() < 1e-6, "fresnel(0, {f0:?}) = {f:?}");
        }
    }

    #[test]
    fn energy_split_never_exceeds_one() {
        let albedos = [Vec3::splat(0.1), Vec3::new(1.0, 0.8, 0.3), Vec3::ONE];
        for albedo in albedos {
            for metallic in [0.0f32, 0.25, 0.5, 1.0] {
                for cos_theta in [0.0f32, 0.3, 0.7, 1.0] {
                    let f0 = Vec3::splat(0.04).lerp(albedo, metallic);
                    let k_s = fresnel_schlick(cos_theta, f0);
                    let k_d = (Vec3::ONE - k_s) * (1.0 - metallic);
                    let total = k_s + k_d;
                    assert!(total.x <= 1.0 + 1e-6 && total.y <= 1.0 + 1e-6 && total.z <= 1.0 + 1e-6);
                }
            }
        }
    }

    #[test]
    fn tone_map_clips_zero_exactly() {
        assert_eq!(filmic_tone_map(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn tone_map_is_monotonic() {
        let mut previous = filmic_tone_map(Vec3::ZERO);
        let mut value = 0.0f32;
        while value <= 10.0 {
            let mapped = filmic_tone_map(Vec3::splat(value));
            assert!(mapped.x + 1e-6 >= previous.x, "tone map decreased at {value}");
            previous = mapped;
            value += 0.01;
        }
    }

    #[test]
    fn ggx_peaks_along_the_normal_for_smooth_surfaces() {
        let normal = Vec3::Z;
        let aligned = distribution_ggx(normal, normal, 0.05);
        let offset = Vec3::new(0.5, 0.0, 0.866).normalize();
        let off_peak = distribution_ggx(normal, offset, 0.05);
        assert!(aligned > off_peak * 1000.0, "aligned {aligned}, off-peak {off_peak}");
    }

    #[test]
    fn geometry_term_vanishes_at_grazing_incidence() {
        let normal = Vec3::Z;
        let view = Vec3::Z;
        let grazing = Vec3::X;
        assert!(geometry_smith(normal, view, grazing, 0.5) < 1e-6);
        let lit = geometry_smith(normal, view, Vec3::Z, 0.5);
        assert!(lit > 0.5);
    }
}
