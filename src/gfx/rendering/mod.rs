// src/gfx/rendering/mod.rs
//! Renderer-facing data
//!
//! Per-frame draw lists and the uniform blocks a renderer uploads for them.

pub mod frame;

// Re-export main types
pub use frame::{DrawItem, FrameDescription, FrameInstance, LightUniform, ObjectUniform};
