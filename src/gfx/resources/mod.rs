// src/gfx/resources/mod.rs
//! Asset and GPU resource management
//!
//! Handles materials, asset fetching, the decoded-texture cache and texture
//! uploads for rendering.

pub mod asset_source;
pub mod material;
pub mod texture_cache;
pub mod texture_resource;

// Re-export main types
pub use asset_source::{resolve_relative, AssetError, AssetSource, FileSource, MemorySource};
pub use material::{parse_mtl, Material, MaterialLibrary, MaterialUniform, TextureMaps};
pub use texture_cache::{TextureCache, TextureImage};
pub use texture_resource::TextureResource;
