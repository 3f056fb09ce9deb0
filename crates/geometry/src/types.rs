use std::collections::HashSet;

/// Single vertex as uploaded to the GPU: position, unit normal and a
/// texture coordinate pair.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Primitive interpretation of the index sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Three indices per triangle.
    Triangles,
    /// Two indices per segment.
    Lines,
}

/// An indexed mesh. Indices always reference `vertices`; generators
/// keep the index count a multiple of 3 for [`DrawMode::Triangles`]
/// and a multiple of 2 for [`DrawMode::Lines`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub mode: DrawMode,
}

impl Mesh {
    #[must_use]
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, mode: DrawMode) -> Self {
        Self {
            vertices,
            indices,
            mode,
        }
    }

    /// Number of primitives described by the index sequence.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        match self.mode {
            DrawMode::Triangles => self.indices.len() / 3,
            DrawMode::Lines => self.indices.len() / 2,
        }
    }

    /// Derive a line-mode wireframe from a triangle mesh. Edges shared
    /// between adjacent triangles appear once. The vertex sequence is
    /// shared with the source mesh unchanged.
    #[must_use]
    pub fn edges(&self) -> Mesh {
        debug_assert_eq!(self.mode, DrawMode::Triangles);
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut indices = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    indices.push(a);
                    indices.push(b);
                }
            }
        }
        Mesh::new(self.vertices.clone(), indices, DrawMode::Lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_pair() -> Mesh {
        // Two triangles sharing the edge (1, 2).
        let vertices = vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
        ];
        Mesh::new(vertices, vec![0, 1, 2, 1, 3, 2], DrawMode::Triangles)
    }

    #[test]
    fn edges_deduplicates_shared_edge() {
        let wire = triangle_pair().edges();
        assert_eq!(wire.mode, DrawMode::Lines);
        // 5 unique edges out of 6 triangle half-edges.
        assert_eq!(wire.indices.len(), 10);
        assert_eq!(wire.indices.len() % 2, 0);
    }

    #[test]
    fn primitive_count_follows_mode() {
        let mesh = triangle_pair();
        assert_eq!(mesh.primitive_count(), 2);
        assert_eq!(mesh.edges().primitive_count(), 5);
    }
}
