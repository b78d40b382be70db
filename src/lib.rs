// src/lib.rs
//! Diorama
//!
//! Loads Wavefront OBJ/MTL assets into GPU-ready draw batches and keeps an
//! editable, serializable scene of placed instances on top of wgpu.

pub mod config;
pub mod gfx;

// Re-export main types for convenience
pub use config::{CatalogEntry, ConfigError, EditorConfig};
pub use gfx::scene::{SavedScene, Scene, SceneEdit, SceneEditor};

/// Installs `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
