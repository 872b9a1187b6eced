//! Windowed presentation backend (winit + wgpu).
//!
//! Feature-gated behind `renderer`; without it this module compiles to
//! nothing and the crate has no GPU or windowing dependencies.
//!
//! The backend keeps a fixed-resolution offscreen texture as the retained
//! frame. Draw passes rasterize canvas calls into colored quads against
//! that texture; every tick blits it to the window surface, so skipping
//! the draw pass still shows the last committed frame. Text goes through
//! the same quad pipeline via 5x7 bitmap glyphs.

pub mod app;
pub mod presentation;
pub mod text;

pub use app::{run_windowed, WindowConfig};
pub use presentation::GpuPresentation;
