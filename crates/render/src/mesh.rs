//! GPU-side mesh: vertex/index buffers uploaded once at construction.
//!
//! Buffers are immutable after upload; regenerating geometry means
//! uploading a fresh instance and dropping the old one.

use wgpu::util::DeviceExt;

use geometry::{DrawMode, Mesh};

pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    mode: DrawMode,
}

impl GpuMesh {
    /// Upload a generated mesh into static GPU buffers.
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        debug_assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len()));

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            mode: mesh.mode,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub(crate) fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub(crate) fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }
}
