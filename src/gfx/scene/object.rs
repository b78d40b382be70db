//! # Scene Instances
//!
//! A [`SceneObject`] is one placed copy of a loaded asset: the uploaded draw
//! batches ([`PartSet`]), the editable [`ObjectTransform`], the texture the
//! user picked and the camera framing computed when it was loaded.

use std::rc::Rc;

use cgmath::{Matrix4, Rad, Vector3};

use crate::gfx::{
    backend::{GpuBackend, MeshHandle, TextureHandle},
    geometry::{CameraFraming, Extents},
    resources::Material,
};

/// Default uniform scale of a freshly placed object
pub const DEFAULT_SCALE: f32 = 1.2;

/// Editable placement of a scene instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    /// Translation applied before scaling, initialised to centre the mesh
    pub offset: Vector3<f32>,
    pub scale: f32,
    /// Yaw about +Y, in radians
    pub rotation: f32,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            offset: Vector3::new(0.0, 0.0, 0.0),
            scale: DEFAULT_SCALE,
            rotation: 0.0,
        }
    }
}

impl ObjectTransform {
    pub fn new(offset: Vector3<f32>, scale: f32, rotation: f32) -> Self {
        Self {
            offset,
            scale,
            rotation,
        }
    }

    /// Default transform for an asset with the given extents
    pub fn centered(extents: &Extents, scale: f32) -> Self {
        Self {
            offset: extents.centering_offset(),
            scale,
            rotation: 0.0,
        }
    }

    /// World matrix: translate by the offset, then scale, then yaw
    pub fn world_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Rad(self.rotation))
            * Matrix4::from_scale(self.scale)
            * Matrix4::from_translation(self.offset)
    }
}

/// One material-tagged draw batch of an instance
#[derive(Debug, Clone)]
pub struct Part {
    pub mesh: MeshHandle,
    pub vertex_count: u32,
    pub material: Rc<Material>,
    /// The material's own diffuse map, drawn when no instance texture is bound
    pub map: Option<TextureHandle>,
}

/// Every draw batch of an instance plus the texture bound to all of them.
///
/// Replaced as a whole when the texture changes, never edited in place. The
/// material maps travel with the parts into the replacement set.
#[derive(Debug, Clone, Default)]
pub struct PartSet {
    pub parts: Vec<Part>,
    pub texture: Option<TextureHandle>,
}

impl PartSet {
    pub fn new(parts: Vec<Part>, texture: Option<TextureHandle>) -> Self {
        Self { parts, texture }
    }

    /// Same meshes and materials bound to another texture
    pub fn with_texture(&self, texture: Option<TextureHandle>) -> Self {
        Self {
            parts: self.parts.clone(),
            texture,
        }
    }

    /// Texture drawn for `part`: the instance texture, else the material map
    pub fn texture_for(&self, part: &Part) -> Option<TextureHandle> {
        self.texture.or(part.map)
    }

    /// Distinct material map textures across all parts
    pub fn maps(&self) -> Vec<TextureHandle> {
        let mut maps: Vec<TextureHandle> = Vec::new();
        for map in self.parts.iter().filter_map(|p| p.map) {
            if !maps.contains(&map) {
                maps.push(map);
            }
        }
        maps
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertex_count as usize).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Release the meshes, the material maps and the texture
    pub fn release<B: GpuBackend + ?Sized>(&self, backend: &B) {
        for part in &self.parts {
            backend.release_mesh(part.mesh);
        }
        for map in self.maps() {
            backend.release_texture(map);
        }
        if let Some(texture) = self.texture {
            backend.release_texture(texture);
        }
    }
}

/// One placed instance of an asset
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Name shown in the selector list
    pub label: String,
    /// Path the asset was loaded from
    pub asset: String,
    pub transform: ObjectTransform,
    /// Path of the chosen texture image
    pub texture: Option<String>,
    pub extents: Extents,
    /// Frozen at load time
    pub framing: CameraFraming,
    parts: Rc<PartSet>,
}

impl SceneObject {
    pub fn new(
        label: impl Into<String>,
        asset: impl Into<String>,
        transform: ObjectTransform,
        texture: Option<String>,
        extents: Extents,
        parts: PartSet,
    ) -> Self {
        Self {
            label: label.into(),
            asset: asset.into(),
            framing: CameraFraming::frame(&extents, transform.scale),
            transform,
            texture,
            extents,
            parts: Rc::new(parts),
        }
    }

    /// Shared handle to the current draw batches
    pub fn parts(&self) -> Rc<PartSet> {
        Rc::clone(&self.parts)
    }

    /// Swap in a new part set, returning the previous one
    pub fn replace_parts(&mut self, parts: PartSet) -> Rc<PartSet> {
        std::mem::replace(&mut self.parts, Rc::new(parts))
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.world_matrix()
    }

    pub fn material_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .parts
            .parts
            .iter()
            .map(|p| p.material.name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Release every GPU resource owned by this instance
    pub fn release<B: GpuBackend + ?Sized>(&self, backend: &B) {
        self.parts.release(backend);
    }
}

/// Display label for an asset path: its file stem
pub fn label_for_asset(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}
