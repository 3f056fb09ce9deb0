use crate::shader::StageKind;

/// Failures of the rendering layer.
///
/// `Compile` and `Link` abort construction of the one shader program
/// they occurred in; other programs and all geometry stay usable.
/// `UnsupportedContext` is fatal at startup, there is no fallback
/// rendering path. Writing an undeclared uniform slot is not an error
/// at all, it logs a warning and the frame continues.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile: {diagnostic}")]
    Compile {
        stage: StageKind,
        diagnostic: String,
    },

    #[error("shader program failed to link: {diagnostic}")]
    Link { diagnostic: String },

    #[error("graphics context unavailable: {reason}")]
    UnsupportedContext { reason: String },

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    /// The surface was lost or outdated; reconfiguring (a resize)
    /// recovers it on the next frame.
    pub fn surface_needs_reconfigure(&self) -> bool {
        matches!(
            self,
            Self::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }

    /// Unrecoverable surface memory exhaustion.
    pub fn surface_out_of_memory(&self) -> bool {
        matches!(self, Self::Surface(wgpu::SurfaceError::OutOfMemory))
    }
}
