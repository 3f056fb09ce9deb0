//! Embedded WGSL sources. These are the canonical stage pairs; in
//! watch mode the same files are re-read from the `shaders/`
//! directory on change.

pub const PRIMARY_VERTEX: &str = include_str!("../shaders/primary.vert.wgsl");
pub const PRIMARY_FRAGMENT: &str = include_str!("../shaders/primary.frag.wgsl");
pub const BACKGROUND_VERTEX: &str = include_str!("../shaders/background.vert.wgsl");
pub const BACKGROUND_FRAGMENT: &str = include_str!("../shaders/background.frag.wgsl");

pub const PRIMARY_VERTEX_FILE: &str = "primary.vert.wgsl";
pub const PRIMARY_FRAGMENT_FILE: &str = "primary.frag.wgsl";
pub const BACKGROUND_VERTEX_FILE: &str = "background.vert.wgsl";
pub const BACKGROUND_FRAGMENT_FILE: &str = "background.frag.wgsl";
