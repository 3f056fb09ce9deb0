//! Unit cube with flat per-face normals.

use glam::Vec3;

use crate::{DrawMode, Mesh, Vertex};

const H: f32 = 0.5;

// One entry per face: normal, then the four corners in CCW order as
// seen from outside.
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // +Z
    (
        [0.0, 0.0, 1.0],
        [[-H, -H, H], [H, -H, H], [H, H, H], [-H, H, H]],
    ),
    // -Z
    (
        [0.0, 0.0, -1.0],
        [[H, -H, -H], [-H, -H, -H], [-H, H, -H], [H, H, -H]],
    ),
    // +X
    (
        [1.0, 0.0, 0.0],
        [[H, -H, H], [H, -H, -H], [H, H, -H], [H, H, H]],
    ),
    // -X
    (
        [-1.0, 0.0, 0.0],
        [[-H, -H, -H], [-H, -H, H], [-H, H, H], [-H, H, -H]],
    ),
    // +Y
    (
        [0.0, 1.0, 0.0],
        [[-H, H, H], [H, H, H], [H, H, -H], [-H, H, -H]],
    ),
    // -Y
    (
        [0.0, -1.0, 0.0],
        [[-H, -H, -H], [H, -H, -H], [H, -H, H], [-H, -H, H]],
    ),
];

const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Generate a unit cube (side length 1) centered at `center`.
/// 24 vertices so each face carries its own flat normal, 36 indices.
#[must_use]
pub fn generate(center: Vec3) -> Mesh {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, corners) in FACES {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(CORNER_UVS) {
            let position = center + Vec3::from(*corner);
            vertices.push(Vertex::new(position.to_array(), normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Mesh::new(vertices, indices, DrawMode::Triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts() {
        let mesh = generate(Vec3::ZERO);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.primitive_count(), 12);
    }

    #[test]
    fn center_offset_applies_to_all_vertices() {
        let center = Vec3::new(3.0, -1.0, 2.0);
        let mesh = generate(center);
        for v in &mesh.vertices {
            let local = Vec3::from(v.position) - center;
            assert!((local.abs().max_element() - H).abs() < 1e-6);
        }
    }

    #[test]
    fn face_normals_are_axis_aligned_unit() {
        let mesh = generate(Vec3::ZERO);
        for v in &mesh.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-6);
            // Normal matches the face the vertex sits on.
            let local = Vec3::from(v.position);
            assert!((local.dot(n) - H).abs() < 1e-6);
        }
    }
}
