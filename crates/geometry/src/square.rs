//! Unit quad facing +Z, used as the full-screen background drawable.
//! The background vertex stage stretches it over clip space, so the
//! world-space footprint only matters for non-background uses.

use glam::Vec3;

use crate::{DrawMode, Mesh, Vertex};

const H: f32 = 0.5;

/// Generate a unit quad (side length 1) centered at `center`,
/// facing +Z. 4 vertices, 2 triangles.
#[must_use]
pub fn generate(center: Vec3) -> Mesh {
    let normal = [0.0, 0.0, 1.0];
    let corners = [
        ([-H, -H, 0.0], [0.0, 1.0]),
        ([H, -H, 0.0], [1.0, 1.0]),
        ([H, H, 0.0], [1.0, 0.0]),
        ([-H, H, 0.0], [0.0, 0.0]),
    ];

    let vertices = corners
        .iter()
        .map(|(corner, uv)| {
            let position = center + Vec3::from(*corner);
            Vertex::new(position.to_array(), normal, *uv)
        })
        .collect();

    Mesh::new(vertices, vec![0, 1, 2, 2, 3, 0], DrawMode::Triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_counts() {
        let mesh = generate(Vec3::ZERO);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.primitive_count(), 2);
    }

    #[test]
    fn quad_faces_positive_z() {
        let mesh = generate(Vec3::new(1.0, 2.0, 3.0));
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert!((v.position[2] - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let mesh = generate(Vec3::ZERO);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len()));
    }
}
