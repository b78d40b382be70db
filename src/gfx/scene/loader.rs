//! # Asset Loading Pipeline
//!
//! Turns an asset path into a ready [`SceneObject`]:
//!
//! 1. fetch and parse the OBJ text,
//! 2. fetch every `mtllib` it names concurrently, parse each and resolve its
//!    texture maps against that MTL file's own location,
//! 3. compute extents over all groups and derive the default transform,
//! 4. fetch the chosen texture through the shared [`TextureCache`], or, when
//!    none is bound, every material's diffuse map through the same cache,
//! 5. upload one mesh per non-empty group and the textures to the backend.
//!
//! A failure at any step before the upload leaves nothing allocated; a failed
//! upload releases whatever was already created.

use std::{collections::HashMap, rc::Rc};

use futures::future::join_all;

use super::object::{label_for_asset, ObjectTransform, Part, PartSet, SceneObject};
use crate::gfx::{
    backend::{BackendError, GpuBackend, TextureHandle},
    geometry::{parse_obj, Extents, ParsedMesh},
    resources::{
        parse_mtl, resolve_relative, AssetError, AssetSource, MaterialLibrary, TextureCache,
    },
};

/// What to place and how
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlacementRequest {
    pub asset: String,
    /// Selector label, the asset's file stem when absent
    pub label: Option<String>,
    /// Texture image bound to every part
    pub texture: Option<String>,
    /// Overrides the centred default transform
    pub transform: Option<ObjectTransform>,
}

impl PlacementRequest {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn with_transform(mut self, transform: ObjectTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// Parsed geometry and materials of one asset, before upload
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub path: String,
    pub mesh: ParsedMesh,
    pub materials: MaterialLibrary,
    pub extents: Extents,
}

pub struct AssetLoader {
    source: Rc<dyn AssetSource>,
    textures: TextureCache,
}

impl AssetLoader {
    pub fn new(source: Rc<dyn AssetSource>) -> Self {
        Self {
            textures: TextureCache::new(Rc::clone(&source)),
            source,
        }
    }

    pub fn source(&self) -> &Rc<dyn AssetSource> {
        &self.source
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Fetch a file and decode it as UTF-8
    pub async fn fetch_text(&self, path: &str) -> Result<String, AssetError> {
        let bytes = self.source.fetch(path).await?;
        String::from_utf8(bytes).map_err(|_| AssetError::NotText(path.to_string()))
    }

    /// Fetch and parse an OBJ file together with all of its material libraries
    pub async fn load_asset(&self, path: &str) -> Result<LoadedAsset, AssetError> {
        let text = self.fetch_text(path).await?;
        let mesh = parse_obj(&text);
        log::debug!(
            "{}: {} groups, {} triangles, {} material libraries",
            path,
            mesh.groups.len(),
            mesh.triangle_count(),
            mesh.material_libs.len()
        );

        let extents = Extents::of_groups(&mesh.groups)
            .ok_or_else(|| AssetError::EmptyGeometry(path.to_string()))?;
        let materials = self.load_materials(path, &mesh.material_libs).await?;

        Ok(LoadedAsset {
            path: path.to_string(),
            mesh,
            materials,
            extents,
        })
    }

    async fn load_materials(
        &self,
        obj_path: &str,
        libraries: &[String],
    ) -> Result<MaterialLibrary, AssetError> {
        let paths: Vec<String> = libraries
            .iter()
            .map(|lib| resolve_relative(obj_path, lib))
            .collect();
        let texts = join_all(paths.iter().map(|p| self.fetch_text(p))).await;

        let mut materials = MaterialLibrary::new();
        for (mtl_path, text) in paths.iter().zip(texts) {
            let mut library = parse_mtl(&text?);
            library.resolve_maps(|map| resolve_relative(mtl_path, map));
            log::debug!("{}: {} materials", mtl_path, library.len());
            materials.extend(library);
        }
        Ok(materials)
    }

    /// Fetch `path` through the cache and upload it for one instance
    pub async fn load_texture<B: GpuBackend + ?Sized>(
        &self,
        backend: &B,
        path: &str,
    ) -> Result<TextureHandle, AssetError> {
        let image = self.textures.load(path).await?;
        backend
            .create_texture(path, &image)
            .map_err(|e| upload_error(path, e))
    }

    /// Upload the diffuse map of every material a non-empty group uses.
    ///
    /// Each distinct map path is fetched once through the cache and uploaded
    /// once for this instance. A map that fails to load is skipped.
    pub async fn load_maps<B: GpuBackend + ?Sized>(
        &self,
        backend: &B,
        asset: &LoadedAsset,
    ) -> HashMap<String, TextureHandle> {
        let mut paths: Vec<String> = Vec::new();
        for group in asset.mesh.groups.iter().filter(|g| !g.is_empty()) {
            let diffuse = asset
                .materials
                .get(&group.material)
                .and_then(|m| m.maps.diffuse.clone());
            if let Some(path) = diffuse {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }

        let handles = join_all(paths.iter().map(|p| self.load_texture(backend, p))).await;

        let mut maps = HashMap::new();
        for (path, handle) in paths.into_iter().zip(handles) {
            match handle {
                Ok(handle) => {
                    maps.insert(path, handle);
                }
                Err(e) => log::warn!("{}: material map skipped: {}", asset.path, e),
            }
        }
        maps
    }

    /// Upload every non-empty group of `asset` and bind `texture` to all parts.
    ///
    /// Each part also carries its material's map from `maps`. On failure only
    /// the meshes created here are released.
    pub fn upload_parts<B: GpuBackend + ?Sized>(
        &self,
        backend: &B,
        asset: &LoadedAsset,
        texture: Option<TextureHandle>,
        maps: &HashMap<String, TextureHandle>,
    ) -> Result<PartSet, AssetError> {
        let mut parts: Vec<Part> = Vec::new();

        for (index, group) in asset.mesh.groups.iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            let label = format!("{} [{}:{}]", asset.path, index, group.material);

            match backend.create_mesh(&label, &group.buffers) {
                Ok(mesh) => {
                    let material = asset.materials.get_or_default(&group.material);
                    let map = material
                        .maps
                        .diffuse
                        .as_ref()
                        .and_then(|path| maps.get(path).copied());
                    parts.push(Part {
                        mesh,
                        vertex_count: group.buffers.vertex_count() as u32,
                        material: Rc::new(material),
                        map,
                    });
                }
                Err(e) => {
                    for part in &parts {
                        backend.release_mesh(part.mesh);
                    }
                    return Err(upload_error(&asset.path, e));
                }
            }
        }

        Ok(PartSet::new(parts, texture))
    }

    /// Run the whole pipeline for one placement
    pub async fn load_object<B: GpuBackend + ?Sized>(
        &self,
        backend: &B,
        request: PlacementRequest,
        default_scale: f32,
    ) -> Result<SceneObject, AssetError> {
        let PlacementRequest {
            asset: path,
            label,
            texture,
            transform,
        } = request;

        let asset = self.load_asset(&path).await?;

        let texture_handle = match &texture {
            Some(texture_path) => match self.load_texture(backend, texture_path).await {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("{}: texture unavailable, drawing untextured: {}", path, e);
                    None
                }
            },
            None => None,
        };

        let maps = match texture_handle {
            Some(_) => HashMap::new(),
            None => self.load_maps(backend, &asset).await,
        };

        let parts = match self.upload_parts(backend, &asset, texture_handle, &maps) {
            Ok(parts) => parts,
            Err(e) => {
                for handle in texture_handle.into_iter().chain(maps.into_values()) {
                    backend.release_texture(handle);
                }
                return Err(e);
            }
        };

        let transform =
            transform.unwrap_or_else(|| ObjectTransform::centered(&asset.extents, default_scale));
        let label = label.unwrap_or_else(|| label_for_asset(&path));

        log::info!(
            "loaded '{}' from {} ({} parts, {} triangles)",
            label,
            path,
            parts.len(),
            parts.triangle_count()
        );
        Ok(SceneObject::new(
            label,
            path,
            transform,
            texture,
            asset.extents,
            parts,
        ))
    }
}

fn upload_error(path: &str, error: BackendError) -> AssetError {
    AssetError::Upload {
        path: path.to_string(),
        message: error.to_string(),
    }
}
