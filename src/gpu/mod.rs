//! Device context, compute tessellation, and the render loop

mod compute;
mod context;
mod render;

pub use compute::FaceCompute;
pub use context::{Context, ContextError, Palette};
pub use render::{Renderer, ResizeState};

use thiserror::Error;

use crate::math::{AlignError, MatrixError};

/// Failures surfaced by compute and render orchestration
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Align(#[from] AlignError),
    #[error(transparent)]
    Math(#[from] MatrixError),
}
