//! # noisescape
//!
//! A procedural noise-shaded scene viewer built on WebGPU. An
//! icosphere, generated by recursive icosahedron subdivision, is lit
//! and perturbed by FBM noise in the fragment stage; a full-screen
//! quad paints a time-animated background behind it. Tessellation
//! level, geometry color, noise frequency and noise intensity are
//! live-tunable.
//!
//! ## The crates
//!
//! - **`noisescape`** (this crate): the binary entry point. CLI
//!   parsing, the control panel state with per-field change tracking,
//!   the winit tick loop, shader hot-reloading and background texture
//!   decoding.
//! - **[`geometry`]:** pure procedural mesh generators (icosphere,
//!   cube, quad). Plain data, no GPU dependencies.
//! - **[`render`]:** the rendering layer. Camera with cached
//!   view/projection matrices, shader programs with a typed uniform
//!   contract, GPU mesh upload and the per-frame draw dispatch.

pub mod app;
pub mod controls;
pub mod shaders;
pub mod texload;
pub mod watcher;

pub use geometry;
pub use render;
