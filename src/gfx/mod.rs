//! # Graphics Module
//!
//! Asset parsing, GPU resource handling and the editable scene.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - OBJ parsing into flat vertex streams, extents and camera framing
//! - **Resources** ([`resources`]) - Asset fetching, MTL materials, the texture cache and texture upload
//! - **Backend** ([`backend`]) - The [`GpuBackend`] seam and its wgpu implementation
//! - **Scene Management** ([`scene`]) - Placed instances, edits, save/load and the [`SceneEditor`]
//! - **Camera System** ([`camera`]) - Cameras built from the framing frozen at load time
//! - **Rendering** ([`rendering`]) - Per-frame draw lists handed to a renderer
//!
//! Data flows one way: geometry and materials are parsed, uploaded through the
//! backend into parts, kept in the scene, and read back every frame as a
//! [`FrameDescription`].
//!
//! [`GpuBackend`]: backend::GpuBackend
//! [`SceneEditor`]: scene::SceneEditor
//! [`FrameDescription`]: rendering::FrameDescription

pub mod backend;
pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use backend::{GpuBackend, NullBackend, WgpuBackend};
pub use camera::FramedCamera;
pub use rendering::FrameDescription;
