//! GPU backend seam
//!
//! The scene core never draws anything itself. It hands geometry and decoded
//! textures to a [`GpuBackend`], keeps the opaque handles it gets back, and
//! releases them when instances go away. [`WgpuBackend`] is the real
//! implementation; [`NullBackend`] only tracks which handles are alive.

pub mod wgpu_backend;

use std::{cell::{Cell, RefCell}, collections::HashSet};

use thiserror::Error;

use crate::gfx::{geometry::VertexBuffers, resources::TextureImage};

pub use wgpu_backend::{DrawGpuMesh, GpuMesh, WgpuBackend};

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to an uploaded vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) u64);

impl MeshHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Handle to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

impl TextureHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// GPU resource allocation used by the scene loader
pub trait GpuBackend {
    /// Upload one non-indexed triangle list
    fn create_mesh(&self, label: &str, buffers: &VertexBuffers) -> BackendResult<MeshHandle>;

    /// Upload a decoded image as a sampled texture
    fn create_texture(&self, label: &str, image: &TextureImage) -> BackendResult<TextureHandle>;

    fn release_mesh(&self, handle: MeshHandle);

    fn release_texture(&self, handle: TextureHandle);
}

/// Backend that allocates nothing and counts live handles.
///
/// Used headless and in tests to check that every upload is released.
#[derive(Debug, Default)]
pub struct NullBackend {
    next_id: Cell<u64>,
    meshes: RefCell<HashSet<MeshHandle>>,
    textures: RefCell<HashSet<TextureHandle>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn is_mesh_live(&self, handle: MeshHandle) -> bool {
        self.meshes.borrow().contains(&handle)
    }

    pub fn is_texture_live(&self, handle: TextureHandle) -> bool {
        self.textures.borrow().contains(&handle)
    }
}

impl GpuBackend for NullBackend {
    fn create_mesh(&self, label: &str, buffers: &VertexBuffers) -> BackendResult<MeshHandle> {
        if buffers.is_empty() {
            return Err(BackendError::BufferCreationFailed(format!(
                "{}: empty vertex buffer",
                label
            )));
        }
        let handle = MeshHandle(self.next());
        self.meshes.borrow_mut().insert(handle);
        Ok(handle)
    }

    fn create_texture(&self, _label: &str, _image: &TextureImage) -> BackendResult<TextureHandle> {
        let handle = TextureHandle(self.next());
        self.textures.borrow_mut().insert(handle);
        Ok(handle)
    }

    fn release_mesh(&self, handle: MeshHandle) {
        if !self.meshes.borrow_mut().remove(&handle) {
            log::warn!("release of unknown mesh {:?}", handle);
        }
    }

    fn release_texture(&self, handle: TextureHandle) {
        if !self.textures.borrow_mut().remove(&handle) {
            log::warn!("release of unknown texture {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_backend_tracks_live_handles() {
        let backend = NullBackend::new();
        let buffers =
            VertexBuffers::from_streams(vec![0.0; 9], vec![0.0; 9], vec![0.0; 6]).unwrap();

        let mesh = backend.create_mesh("m", &buffers).unwrap();
        let texture = backend
            .create_texture("t", &TextureImage::solid([255; 4]))
            .unwrap();
        assert_eq!((backend.live_meshes(), backend.live_textures()), (1, 1));
        assert_ne!(mesh.id(), texture.id());

        backend.release_mesh(mesh);
        backend.release_texture(texture);
        assert_eq!((backend.live_meshes(), backend.live_textures()), (0, 0));
    }

    #[test]
    fn test_null_backend_rejects_empty_meshes() {
        let backend = NullBackend::new();
        assert!(backend.create_mesh("empty", &VertexBuffers::new()).is_err());
    }
}
