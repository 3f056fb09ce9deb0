//! Procedural mesh generators for the noisescape viewer.
//!
//! Everything in this crate is plain data: generators build a
//! [`Mesh`] (vertices + triangle indices + draw mode) from their
//! construction parameters and never touch the GPU. Uploading the
//! result is the render crate's job.

pub mod cube;
pub mod icosphere;
pub mod square;
mod types;

pub use types::{DrawMode, Mesh, Vertex};

/// Upper bound on icosphere subdivision. Vertex count grows as
/// `O(4^level)`, so level 8 is already ~655k triangles.
pub const MAX_SUBDIVISIONS: u32 = 8;
