use glam::{Vec2, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
            uv: uv.to_array(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn cube(size: f32) -> Self {
        let hs = size * 0.5;
        let positions = [
            Vec3::new(-hs, -hs, -hs),
            Vec3::new(hs, -hs, -hs),
            Vec3::new(hs, hs, -hs),
            Vec3::new(-hs, hs, -hs),
            Vec3::new(-hs, -hs, hs),
            Vec3::new(hs, -hs, hs),
            Vec3::new(hs, hs, hs),
            Vec3::new(-hs, hs, hs),
        ];
        let normals = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];

        let uv_quad = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let mut vertices = Vec::with_capacity(24);
        let mut write_face = |corners: [usize; 4], normal: Vec3| {
            for (i, &corner) in corners.iter().enumerate() {
                vertices.push(Vertex::new(positions[corner], normal, Vec3::X, uv_quad[i]));
            }
        };

        write_face([0, 3, 2, 1], normals[0]); // back
        write_face([4, 5, 6, 7], normals[1]); // front
        write_face([0, 4, 7, 3], normals[2]); // left
        write_face([1, 2, 6, 5], normals[3]); // right
        write_face([3, 7, 6, 2], normals[4]); // top
        write_face([0, 1, 5, 4], normals[5]); // bottom

        let mut indices = Vec::with_capacity(36);
        for face in 0..6 {
            let base = face * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        compute_tangents(&mut vertices, &indices);

        Self::new(vertices, indices)
    }

    /// Ground quad in the XZ plane facing +Y, `size` on a side.
    pub fn plane(size: f32) -> Self {
        let hs = size * 0.5;
        let normal = Vec3::Y;
        let mut vertices = vec![
            Vertex::new(Vec3::new(-hs, 0.0, -hs), normal, Vec3::X, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(-hs, 0.0, hs), normal, Vec3::X, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(hs, 0.0, hs), normal, Vec3::X, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(hs, 0.0, -hs), normal, Vec3::X, Vec2::new(1.0, 0.0)),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        compute_tangents(&mut vertices, &indices);
        Self::new(vertices, indices)
    }
}

pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }
        let a = positions[i0];
        let b = positions[i1];
        let c = positions[i2];
        let normal = (b - a).cross(c - a);
        if normal.length_squared() > 0.0 {
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }
    }
    for normal in &mut normals {
        if normal.length_squared() > 0.0 {
            *normal = normal.normalize();
        } else {
            *normal = Vec3::Y;
        }
    }
    normals
}

pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    if vertices.is_empty() || indices.is_empty() {
        return;
    }
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        let v0 = Vec3::from_array(vertices[i0].position);
        let v1 = Vec3::from_array(vertices[i1].position);
        let v2 = Vec3::from_array(vertices[i2].position);

        let uv0 = Vec2::from_array(vertices[i0].uv);
        let uv1 = Vec2::from_array(vertices[i1].uv);
        let uv2 = Vec2::from_array(vertices[i2].uv);

        let delta_pos1 = v1 - v0;
        let delta_pos2 = v2 - v0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let denom = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if denom.abs() < 1e-8 {
            continue;
        }
        let r = 1.0 / denom;
        let sdir = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;

        accumulated[i0] += sdir;
        accumulated[i1] += sdir;
        accumulated[i2] += sdir;
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let normal = Vec3::from_array(vertex.normal);
        let t = accumulated[i];
        if t.length_squared() > 0.0 {
            let tangent = (t - normal * normal.dot(t)).normalize_or_zero();
            vertex.tangent = tangent.to_array();
        } else {
            vertex.tangent = Vec3::X.to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_one_quad_per_face() {
        let mesh = Mesh::cube(1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for vertex in &mesh.vertices {
            let normal = Vec3::from_array(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn tangents_are_orthogonal_to_normals() {
        let mesh = Mesh::cube(2.0);
        for vertex in &mesh.vertices {
            let normal = Vec3::from_array(vertex.normal);
            let tangent = Vec3::from_array(vertex.tangent);
            assert!(tangent.length_squared() > 0.0);
            assert!(normal.dot(tangent).abs() < 1e-4, "tangent not orthogonal: {vertex:?}");
        }
    }

    #[test]
    fn computed_normals_face_outward_for_a_ccw_triangle() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for normal in normals {
            assert!((normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = Mesh::plane(10.0);
        assert_eq!(mesh.indices.len(), 6);
        for vertex in &mesh.vertices {
            assert_eq!(Vec3::from_array(vertex.normal), Vec3::Y);
        }
    }
}
