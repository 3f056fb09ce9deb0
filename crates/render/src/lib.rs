//! Rendering layer for the noisescape viewer: camera, shader
//! programs with a typed uniform contract, GPU mesh upload and the
//! per-frame draw dispatch. Geometry generation lives in the
//! `geometry` crate; windowing and the tick loop live in the binary.

pub mod camera;
pub mod error;
pub mod gpu_types;
pub mod mesh;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use camera::Camera;
pub use error::RenderError;
pub use mesh::GpuMesh;
pub use renderer::Renderer;
pub use shader::{
    CompiledProgram, LinkedProgram, ProgramDesc, ShaderStage, StageKind, UniformSlot, UniformStage,
};
pub use texture::Texture;
