//! Cross-generator mesh invariants.

use geometry::{cube, icosphere, square, DrawMode, Mesh};
use glam::Vec3;

fn assert_well_formed(mesh: &Mesh) {
    let chunk = match mesh.mode {
        DrawMode::Triangles => 3,
        DrawMode::Lines => 2,
    };
    assert_eq!(mesh.indices.len() % chunk, 0);
    assert!(mesh
        .indices
        .iter()
        .all(|&i| (i as usize) < mesh.vertices.len()));
    for v in &mesh.vertices {
        let len = Vec3::from(v.normal).length();
        assert!((len - 1.0).abs() < 1e-5, "non-unit normal {:?}", v.normal);
    }
}

#[test]
fn all_generators_produce_well_formed_meshes() {
    for level in 0..=3 {
        assert_well_formed(&icosphere::generate(Vec3::ZERO, 1.0, level));
    }
    assert_well_formed(&cube::generate(Vec3::new(0.0, 1.0, 0.0)));
    assert_well_formed(&square::generate(Vec3::ZERO));
}

#[test]
fn generation_is_deterministic() {
    let a = icosphere::generate(Vec3::ZERO, 1.0, 3);
    let b = icosphere::generate(Vec3::ZERO, 1.0, 3);
    assert_eq!(a.vertices, b.vertices);
    assert_eq!(a.indices, b.indices);

    let c = cube::generate(Vec3::ONE);
    let d = cube::generate(Vec3::ONE);
    assert_eq!(c, d);
}

#[test]
fn icosphere_has_no_coincident_vertices() {
    // Midpoint deduplication failing would leave duplicate vertices on
    // shared edges; scan for coincident pairs.
    let mesh = icosphere::generate(Vec3::ZERO, 1.0, 2);
    for (i, a) in mesh.vertices.iter().enumerate() {
        for b in mesh.vertices.iter().skip(i + 1) {
            let d = Vec3::from(a.position).distance(Vec3::from(b.position));
            assert!(d > 1e-5, "coincident vertices at {:?}", a.position);
        }
    }
}

#[test]
fn icosphere_edges_are_shared_by_two_triangles() {
    // Closed manifold: every undirected edge is used by exactly two
    // triangles, so E = 3T/2 and the wireframe has that many segments.
    let mesh = icosphere::generate(Vec3::ZERO, 1.0, 1);
    let tris = mesh.indices.len() / 3;
    let wire = mesh.edges();
    assert_eq!(wire.indices.len() / 2, tris * 3 / 2);
}

#[test]
fn unit_sphere_scenario() {
    // subdivisionLevel = 0, radius = 1: 20 triangles, 12 vertices, all
    // at unit distance from the origin.
    let mesh = icosphere::generate(Vec3::ZERO, 1.0, 0);
    assert_eq!(mesh.indices.len() / 3, 20);
    assert_eq!(mesh.vertices.len(), 12);
    for v in &mesh.vertices {
        assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-6);
    }
}
