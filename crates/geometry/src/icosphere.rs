//! Icosphere generation by recursive icosahedron subdivision.
//!
//! Each pass replaces every triangle with four: the three original
//! corners plus the three edge midpoints, re-projected onto the
//! sphere. Midpoints are deduplicated through a cache keyed by the
//! unordered pair of edge endpoints, so shared edges resolve to a
//! single vertex and the mesh stays manifold.

use std::collections::HashMap;

use glam::Vec3;

use crate::{DrawMode, Mesh, Vertex, MAX_SUBDIVISIONS};

// Golden-ratio icosahedron, normalized onto the unit sphere below.
const T: f32 = 1.618_034;

const BASE_POSITIONS: [[f32; 3]; 12] = [
    [-1.0, T, 0.0],
    [1.0, T, 0.0],
    [-1.0, -T, 0.0],
    [1.0, -T, 0.0],
    [0.0, -1.0, T],
    [0.0, 1.0, T],
    [0.0, -1.0, -T],
    [0.0, 1.0, -T],
    [T, 0.0, -1.0],
    [T, 0.0, 1.0],
    [-T, 0.0, -1.0],
    [-T, 0.0, 1.0],
];

const BASE_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Generate an icosphere of `radius` around `center`.
///
/// `level` 0 yields the base icosahedron; each further level splits
/// every triangle in four. Levels above [`MAX_SUBDIVISIONS`] are
/// clamped.
#[must_use]
pub fn generate(center: Vec3, radius: f32, level: u32) -> Mesh {
    let level = level.min(MAX_SUBDIVISIONS);

    // Unit directions from the sphere center; scaled out at the end.
    let mut dirs: Vec<Vec3> = BASE_POSITIONS
        .iter()
        .map(|p| Vec3::from(*p).normalize())
        .collect();
    let mut faces: Vec<[u32; 3]> = BASE_FACES.to_vec();

    for _ in 0..level {
        faces = subdivide(&mut dirs, &faces);
    }

    let vertices = dirs
        .iter()
        .map(|dir| {
            let position = center + *dir * radius;
            Vertex::new(position.to_array(), dir.to_array(), spherical_uv(*dir))
        })
        .collect();
    let indices = faces.iter().flatten().copied().collect();
    Mesh::new(vertices, indices, DrawMode::Triangles)
}

/// One subdivision pass. `dirs` grows by the new midpoints; the
/// returned face list replaces the old one.
fn subdivide(dirs: &mut Vec<Vec3>, faces: &[[u32; 3]]) -> Vec<[u32; 3]> {
    // Unordered edge (min,max) packed into a u64, to the midpoint's
    // vertex index. Either incident triangle resolves to the same slot.
    let mut midpoints: HashMap<u64, u32> = HashMap::with_capacity(faces.len() * 3 / 2);
    let mut out = Vec::with_capacity(faces.len() * 4);

    for &[a, b, c] in faces {
        let ab = midpoint(dirs, &mut midpoints, a, b);
        let bc = midpoint(dirs, &mut midpoints, b, c);
        let ca = midpoint(dirs, &mut midpoints, c, a);
        out.push([a, ab, ca]);
        out.push([b, bc, ab]);
        out.push([c, ca, bc]);
        out.push([ab, bc, ca]);
    }
    out
}

fn midpoint(dirs: &mut Vec<Vec3>, cache: &mut HashMap<u64, u32>, a: u32, b: u32) -> u32 {
    let key = (u64::from(a.min(b)) << 32) | u64::from(a.max(b));
    if let Some(&index) = cache.get(&key) {
        return index;
    }
    let dir = (dirs[a as usize] + dirs[b as usize]).normalize();
    let index = dirs.len() as u32;
    dirs.push(dir);
    cache.insert(key, index);
    index
}

/// Equirectangular mapping of a unit direction.
fn spherical_uv(dir: Vec3) -> [f32; 2] {
    let u = 0.5 + dir.z.atan2(dir.x) / (2.0 * std::f32::consts::PI);
    let v = 0.5 - dir.y.asin() / std::f32::consts::PI;
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_icosahedron_counts() {
        let mesh = generate(Vec3::ZERO, 1.0, 0);
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 20 * 3);
        assert_eq!(mesh.mode, DrawMode::Triangles);
    }

    #[test]
    fn subdivision_counts_follow_closed_form() {
        for level in 0..=4u32 {
            let mesh = generate(Vec3::ZERO, 1.0, level);
            let tris = 20 * 4usize.pow(level);
            let verts = 10 * 4usize.pow(level) + 2;
            assert_eq!(mesh.indices.len(), tris * 3, "level {level}");
            assert_eq!(mesh.vertices.len(), verts, "level {level}");
        }
    }

    #[test]
    fn vertices_lie_on_sphere() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let mesh = generate(center, 3.0, 2);
        for v in &mesh.vertices {
            let d = (Vec3::from(v.position) - center).length();
            assert!((d - 3.0).abs() < 1e-4, "distance {d}");
        }
    }

    #[test]
    fn normals_point_away_from_center() {
        let center = Vec3::new(0.5, 0.0, -1.0);
        let mesh = generate(center, 2.0, 1);
        for v in &mesh.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            let outward = (Vec3::from(v.position) - center).normalize();
            assert!(n.dot(outward) > 0.999);
        }
    }

    #[test]
    fn level_is_clamped() {
        let clamped = generate(Vec3::ZERO, 1.0, MAX_SUBDIVISIONS + 3);
        let expected = 10 * 4usize.pow(MAX_SUBDIVISIONS) + 2;
        assert_eq!(clamped.vertices.len(), expected);
    }
}
