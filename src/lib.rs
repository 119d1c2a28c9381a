//! Smileys - click-to-spawn faces on a WebGPU canvas
//!
//! Core modules:
//! - `math`: GPU-alignment-aware vector/matrix primitives
//! - `scene`: colors, circle/semicircle primitives, and the face entity
//! - `gpu`: device context, compute tessellation, and the render loop
//! - `controller`: frame clock and input forwarding
//! - `platform`: browser/native time source
//! - `settings`: user preferences

pub mod controller;
pub mod gpu;
pub mod math;
pub mod platform;
pub mod scene;
pub mod settings;

pub use controller::Controller;
pub use settings::{QualityPreset, Settings};

/// Geometry and timing constants
pub mod consts {
    /// Discrete points computed around each circle's edge
    pub const DIVISIONS: u32 = 128;
    /// Triangle-strip points emitted per division
    pub const POINTS_PER_DIVISION: u32 = 2;
    /// Floats per strip point (x, y)
    pub const FLOATS_PER_POINT: u32 = 2;
    /// Bytes between consecutive vertices in the strip buffer
    pub const VERTEX_STRIDE: u32 = FLOATS_PER_POINT * 4;
    /// Compute kernel workgroup width; each primitive dispatches
    /// DIVISIONS / WORKGROUP_SIZE workgroups
    pub const WORKGROUP_SIZE: u32 = 16;

    /// Face spawn defaults
    pub const DEFAULT_RADIUS: f32 = 100.0;
    pub const DEFAULT_VELOCITY: f32 = 10.0;

    /// Samples per pixel for multisample anti-aliasing
    pub const SAMPLE_COUNT: u32 = 4;

    /// Quiescence window after the last resize event before physics and
    /// spawning resume
    pub const RESIZE_DEBOUNCE_MS: f64 = 250.0;
}

/// Total floats in one primitive's triangle-strip vertex array
#[inline]
pub const fn strip_float_count() -> usize {
    (consts::DIVISIONS * consts::POINTS_PER_DIVISION * consts::FLOATS_PER_POINT) as usize
}
