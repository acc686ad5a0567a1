use crate::camera::CameraInfo;
use crate::gbuffer::GBuffer;
use crate::material::Material;
use crate::mesh::{Mesh, Vertex};
use crate::renderer::DrawParams;
use glam::{Mat3, Vec2, Vec3, Vec4};

/// Interpolated outputs of the vertex stage. The tangent frame is carried as
/// three vectors and reassembled per pixel.
#[derive(Clone, Copy, Debug)]
pub struct VertexOutput {
    pub clip: Vec4,
    pub world_pos: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
}

impl VertexOutput {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            clip: a.clip.lerp(b.clip, t),
            world_pos: a.world_pos.lerp(b.world_pos, t),
            normal: a.normal.lerp(b.normal, t),
            tangent: a.tangent.lerp(b.tangent, t),
            bitangent: a.bitangent.lerp(b.bitangent, t),
            uv: a.uv.lerp(b.uv, t),
        }
    }
}

/// Transforms one vertex to clip space and builds its world-space tangent
/// frame: normal and tangent through the normal matrix, tangent
/// re-orthogonalized against the normal, bitangent as the negated cross.
pub fn vertex_stage(vertex: &Vertex, params: &DrawParams, camera: &CameraInfo) -> VertexOutput {
    let world = params.model * Vec3::from_array(vertex.position).extend(1.0);
    let clip = camera.view_proj * world;
    let normal = (params.normal_matrix * Vec3::from_array(vertex.normal).extend(0.0))
        .truncate()
        .normalize_or_zero();
    let raw_tangent = (params.normal_matrix * Vec3::from_array(vertex.tangent).extend(0.0))
        .truncate()
        .normalize_or_zero();
    let tangent = (raw_tangent - normal * normal.dot(raw_tangent)).normalize_or_zero();
    let bitangent = -normal.cross(tangent);
    VertexOutput {
        clip,
        world_pos: world.truncate(),
        normal,
        tangent,
        bitangent,
        uv: Vec2::from_array(vertex.uv),
    }
}

/// Sutherland-Hodgman clip against the near plane (z >= -w). Returns at most
/// one extra vertex per crossing edge.
fn clip_near(polygon: &[VertexOutput]) -> Vec<VertexOutput> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let current = &polygon[i];
        let next = &polygon[(i + 1) % polygon.len()];
        let d0 = current.clip.z + current.clip.w;
        let d1 = next.clip.z + next.clip.w;
        if d0 >= 0.0 {
            out.push(*current);
        }
        if (d0 >= 0.0) != (d1 >= 0.0) {
            let t = d0 / (d0 - d1);
            out.push(VertexOutput::lerp(current, next, t));
        }
    }
    out
}

/// Rasterizes every triangle of `mesh` into the G-buffer: back faces culled
/// (CCW front), depth tested less-than, covered pixels overwritten without
/// blending. No lighting happens here.
pub fn rasterize_mesh(
    gbuffer: &mut GBuffer,
    mesh: &Mesh,
    params: &DrawParams,
    material: &Material,
    camera: &CameraInfo,
) {
    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        if tri.iter().any(|&i| i as usize >= mesh.vertices.len()) {
            continue;
        }
        let v0 = vertex_stage(&mesh.vertices[tri[0] as usize], params, camera);
        let v1 = vertex_stage(&mesh.vertices[tri[1] as usize], params, camera);
        let v2 = vertex_stage(&mesh.vertices[tri[2] as usize], params, camera);
        let clipped = clip_near(&[v0, v1, v2]);
        if clipped.len() < 3 {
            continue;
        }
        for i in 1..clipped.len() - 1 {
            raster_triangle(gbuffer, material, &clipped[0], &clipped[i], &clipped[i + 1]);
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn raster_triangle(gbuffer: &mut GBuffer, material: &Material, a: &VertexOutput, b: &VertexOutput, c: &VertexOutput) {
    let inv_w = [1.0 / a.clip.w, 1.0 / b.clip.w, 1.0 / c.clip.w];
    let ndc = [
        a.clip.truncate() * inv_w[0],
        b.clip.truncate() * inv_w[1],
        c.clip.truncate() * inv_w[2],
    ];

    // Counter-clockwise in NDC is front-facing; everything else is culled.
    let signed_area =
        (ndc[1].x - ndc[0].x) * (ndc[2].y - ndc[0].y) - (ndc[1].y - ndc[0].y) * (ndc[2].x - ndc[0].x);
    if signed_area <= 0.0 {
        return;
    }

    let width = gbuffer.width();
    let height = gbuffer.height();
    let screen = |v: Vec3| {
        Vec2::new((v.x + 1.0) * 0.5 * width as f32, (1.0 - v.y) * 0.5 * height as f32)
    };
    let s = [screen(ndc[0]), screen(ndc[1]), screen(ndc[2])];

    let area = edge(s[0], s[1], s[2]);
    if area.abs() < 1e-8 {
        return;
    }

    let min_x = s.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = (s.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil() as u32)
        .min(width.saturating_sub(1));
    let min_y = s.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_y = (s.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil() as u32)
        .min(height.saturating_sub(1));

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let b0 = edge(s[1], s[2], p) / area;
            let b1 = edge(s[2], s[0], p) / area;
            let b2 = edge(s[0], s[1], p) / area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            // NDC depth is affine in screen space; plain barycentrics apply.
            let z_ndc = b0 * ndc[0].z + b1 * ndc[1].z + b2 * ndc[2].z;
            let depth = z_ndc * 0.5 + 0.5;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }
            let idx = gbuffer.index(x, y);
            if depth >= gbuffer.depth[idx] {
                continue;
            }

            // Attributes interpolate perspective-correctly via 1/w.
            let w0 = b0 * inv_w[0];
            let w1 = b1 * inv_w[1];
            let w2 = b2 * inv_w[2];
            let inv_sum = 1.0 / (w0 + w1 + w2);
            let world_pos = (a.world_pos * w0 + b.world_pos * w1 + c.world_pos * w2) * inv_sum;
            let normal = (a.normal * w0 + b.normal * w1 + c.normal * w2) * inv_sum;
            let tangent = (a.tangent * w0 + b.tangent * w1 + c.tangent * w2) * inv_sum;
            let bitangent = (a.bitangent * w0 + b.bitangent * w1 + c.bitangent * w2) * inv_sum;
            let uv = (a.uv * w0 + b.uv * w1 + c.uv * w2) * inv_sum;

            let albedo = material.albedo.sample(uv);
            let shading_normal = match &material.normal {
                Some(map) => {
                    let sampled = map.sample(uv).truncate() * 2.0 - Vec3::ONE;
                    (Mat3::from_cols(tangent, bitangent, normal) * sampled).normalize_or_zero()
                }
                None => normal.normalize_or_zero(),
            };
            let metallic = material.metallic.sample(uv).x;
            let roughness = material.roughness.sample(uv).x;
            let ao = material.ao.sample(uv).x;

            gbuffer.depth[idx] = depth;
            gbuffer.albedo[idx] = albedo.truncate().extend(1.0);
            gbuffer.position[idx] = world_pos.extend(1.0);
            gbuffer.normal[idx] = shading_normal.extend(0.0);
            gbuffer.mra[idx] = Vec4::new(metallic, roughness, ao, 1.0);
        }
    }
}
