//! Presentation
//!
//! The palette is plain color math and builds everywhere. The Canvas 2D
//! renderer only exists in the browser build.

pub mod palette;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
