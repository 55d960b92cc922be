//! Rendering module
//!
//! Scene builders turn game state into a `Frame` display list. On wasm32 the
//! canvas backend replays it on a 2D context; natively frames are inspected by
//! tests and the headless demo.

pub mod commands;
pub mod scene;
pub mod skin;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use commands::{DrawCmd, Frame, Layer, Rgba, TextAlign};
pub use scene::{Backdrop, RenderOptions};
pub use skin::Palette;
