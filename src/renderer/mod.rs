//! Depth-buffered software rasterizer
//!
//! Triangles flow through: world transform -> backface cull -> near-plane
//! clip -> projection -> viewport clip -> scanline fill. The framebuffer
//! owns the pixel and depth buffers; a `FrameContext` brackets one frame
//! of drawing.

mod clip;
mod math;
mod matrix;
mod render;
mod types;

pub use clip::*;
pub use math::*;
pub use matrix::*;
pub use render::*;
pub use types::*;

/// Screen dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
