//! GPU-compatible uniform definitions shared by both shader programs.
//!
//! The layout must match the `SceneUniforms` struct declared in the
//! WGSL sources field for field, including the trailing padding that
//! rounds the struct to a 16-byte multiple.

use bytemuck::{Pod, Zeroable};

/// Uniform block uploaded once per draw batch. Values persist in the
/// CPU-side staging copy until overwritten, so uniforms survive
/// across frames without re-setting.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    /// Model matrix, identity for the pregenerated scene geometry.
    pub model: [[f32; 4]; 4],
    /// View matrix from the camera.
    pub view: [[f32; 4]; 4],
    /// Projection matrix from the camera.
    pub proj: [[f32; 4]; 4],
    /// Flat geometry color override, normalized RGBA.
    pub geo_color: [f32; 4],
    /// Viewport size in physical pixels.
    pub resolution: [f32; 2],
    /// Frame counter, incremented once per tick.
    pub time: f32,
    /// Noise frequency control.
    pub frequency: f32,
    /// Noise intensity control.
    pub intensity: f32,
    pub _pad: [f32; 3],
}

impl Default for SceneUniforms {
    fn default() -> Self {
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            view: identity,
            proj: identity,
            geo_color: [1.0, 1.0, 1.0, 1.0],
            resolution: [1.0, 1.0],
            time: 0.0,
            frequency: 1.0,
            intensity: 1.0,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_size_matches_wgsl_layout() {
        // 3 mat4 + vec4 + vec2 + 3 scalars + padding = 240 bytes.
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 240);
    }
}
