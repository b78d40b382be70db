use std::{
    cell::{Cell, Ref, RefCell},
    collections::HashMap,
    ops::Range,
};

use wgpu::util::DeviceExt;

use super::{BackendError, BackendResult, GpuBackend, MeshHandle, TextureHandle};
use crate::gfx::{
    geometry::VertexBuffers,
    resources::{TextureImage, TextureResource},
};

/// Vertex buffer of one uploaded triangle list
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

/// [`GpuBackend`] over a wgpu device and queue
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_id: Cell<u64>,
    meshes: RefCell<HashMap<MeshHandle, GpuMesh>>,
    textures: RefCell<HashMap<TextureHandle, TextureResource>>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            next_id: Cell::new(0),
            meshes: RefCell::new(HashMap::new()),
            textures: RefCell::new(HashMap::new()),
        }
    }

    /// Create a backend on the default adapter without any surface
    pub async fn headless() -> BackendResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Diorama Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        log::info!("wgpu backend ready on {}", adapter.get_info().name);
        Ok(Self::new(device, queue))
    }

    /// Blocking variant of [`WgpuBackend::headless`] for native callers
    pub fn headless_blocking() -> BackendResult<Self> {
        pollster::block_on(Self::headless())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<Ref<'_, GpuMesh>> {
        Ref::filter_map(self.meshes.borrow(), |meshes| meshes.get(&handle)).ok()
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<Ref<'_, TextureResource>> {
        Ref::filter_map(self.textures.borrow(), |textures| textures.get(&handle)).ok()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl GpuBackend for WgpuBackend {
    fn create_mesh(&self, label: &str, buffers: &VertexBuffers) -> BackendResult<MeshHandle> {
        if buffers.is_empty() {
            return Err(BackendError::BufferCreationFailed(format!(
                "{}: empty vertex buffer",
                label
            )));
        }
        let vertices = buffers.to_vertices();

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let handle = MeshHandle(self.next());
        self.meshes.borrow_mut().insert(
            handle,
            GpuMesh {
                vertex_buffer,
                vertex_count: vertices.len() as u32,
            },
        );
        log::debug!("uploaded mesh '{}' ({} vertices)", label, vertices.len());
        Ok(handle)
    }

    fn create_texture(&self, label: &str, image: &TextureImage) -> BackendResult<TextureHandle> {
        let max = self.device.limits().max_texture_dimension_2d;
        if image.width == 0 || image.height == 0 || image.width > max || image.height > max {
            return Err(BackendError::TextureCreationFailed(format!(
                "{}: unsupported size {}x{}",
                label, image.width, image.height
            )));
        }

        let resource = TextureResource::from_image(&self.device, &self.queue, image, label);
        let handle = TextureHandle(self.next());
        self.textures.borrow_mut().insert(handle, resource);
        Ok(handle)
    }

    fn release_mesh(&self, handle: MeshHandle) {
        match self.meshes.borrow_mut().remove(&handle) {
            Some(mesh) => mesh.vertex_buffer.destroy(),
            None => log::warn!("release of unknown mesh {:?}", handle),
        }
    }

    fn release_texture(&self, handle: TextureHandle) {
        match self.textures.borrow_mut().remove(&handle) {
            Some(resource) => resource.texture.destroy(),
            None => log::warn!("release of unknown texture {:?}", handle),
        }
    }
}

/// Draw helpers for uploaded meshes
pub trait DrawGpuMesh {
    fn draw_gpu_mesh(&mut self, mesh: &GpuMesh);
    fn draw_gpu_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>);
}

impl DrawGpuMesh for wgpu::RenderPass<'_> {
    fn draw_gpu_mesh(&mut self, mesh: &GpuMesh) {
        self.draw_gpu_mesh_instanced(mesh, 0..1);
    }

    fn draw_gpu_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.draw(0..mesh.vertex_count, instances);
    }
}
