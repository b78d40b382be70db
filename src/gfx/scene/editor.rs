//! # Scene Editor
//!
//! [`SceneEditor`] owns the scene, the asset loader and the GPU backend, and
//! exposes the operations the UI wires its buttons to. Edits always target the
//! selected instance; stale instance ids are logged and ignored.

use std::{path::Path, rc::Rc};

use super::{
    controller::{EditError, EditField, SceneEdit},
    loader::{AssetLoader, PlacementRequest},
    scene::{InstanceId, Scene, SceneStatistics},
    serialization::{DocumentError, SavedScene},
};
use crate::{
    config::EditorConfig,
    gfx::{
        backend::GpuBackend,
        rendering::FrameDescription,
        resources::{AssetError, AssetSource},
    },
};

/// One saved instance that could not be rebuilt
#[derive(Debug, Clone, PartialEq)]
pub struct FailedInstance {
    /// Position in the document
    pub index: usize,
    pub asset: String,
    pub error: AssetError,
}

/// Outcome of [`SceneEditor::load`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: Vec<InstanceId>,
    pub failed: Vec<FailedInstance>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SceneEditor<B: GpuBackend> {
    config: EditorConfig,
    backend: B,
    loader: AssetLoader,
    scene: Scene,
}

impl<B: GpuBackend> SceneEditor<B> {
    pub fn new(config: EditorConfig, source: Rc<dyn AssetSource>, backend: B) -> Self {
        Self {
            config,
            backend,
            loader: AssetLoader::new(source),
            scene: Scene::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Place an asset with the default transform and default texture
    pub async fn place(&mut self, asset: &str) -> Result<InstanceId, AssetError> {
        let mut request = PlacementRequest::new(asset);
        request.texture = self.config.default_texture().map(str::to_string);
        self.place_request(request).await
    }

    /// Place one entry of the configured catalog
    pub async fn place_catalog(&mut self, index: usize) -> Result<InstanceId, AssetError> {
        let entry = self
            .config
            .catalog_entry(index)
            .ok_or(AssetError::UnknownCatalogEntry(index))?;

        let mut request = PlacementRequest::new(entry.path.clone()).with_label(entry.label.clone());
        request.texture = self.config.default_texture().map(str::to_string);
        self.place_request(request).await
    }

    pub async fn place_request(
        &mut self,
        request: PlacementRequest,
    ) -> Result<InstanceId, AssetError> {
        let asset = request.asset.clone();
        let object = self
            .loader
            .load_object(&self.backend, request, self.config.default_scale)
            .await
            .inspect_err(|e| log::error!("failed to place {}: {}", asset, e))?;

        let id = self.scene.push(object);
        log::info!("placed {} as {}", asset, id);
        Ok(id)
    }

    pub fn select(&mut self, id: InstanceId) -> bool {
        self.scene.select(id)
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.scene.selected()
    }

    /// Apply an edit to the selected instance.
    ///
    /// Returns `Ok(false)` when nothing is selected.
    pub async fn apply_edit(&mut self, edit: SceneEdit) -> Result<bool, EditError> {
        match self.scene.selected() {
            Some(id) => self.apply_edit_to(id, edit).await,
            None => {
                log::debug!("edit {:?} with nothing selected", edit);
                Ok(false)
            }
        }
    }

    pub async fn apply_edit_to(
        &mut self,
        id: InstanceId,
        edit: SceneEdit,
    ) -> Result<bool, EditError> {
        match edit {
            SceneEdit::Texture(path) => Ok(self.set_texture(id, &path).await?),
            edit => Ok(self.scene.apply_edit_to(id, &edit)),
        }
    }

    /// Apply a raw control change (`field` name and its string value)
    pub async fn apply_control(&mut self, field: &str, raw: &str) -> Result<bool, EditError> {
        let field: EditField = field.parse()?;
        let edit = SceneEdit::from_control(field, raw)?;
        self.apply_edit(edit).await
    }

    /// Bind another texture image to every part of one instance.
    ///
    /// The new part set is built completely before it replaces the old one.
    /// Returns `Ok(false)` for a stale id.
    pub async fn set_texture(&mut self, id: InstanceId, path: &str) -> Result<bool, AssetError> {
        if !self.scene.contains(id) {
            log::warn!("set_texture {} ignored: no such instance", id);
            return Ok(false);
        }

        let handle = self.loader.load_texture(&self.backend, path).await?;

        let Some(object) = self.scene.get_mut(id) else {
            self.backend.release_texture(handle);
            return Ok(false);
        };
        let parts = object.parts().with_texture(Some(handle));
        let previous = object.replace_parts(parts);
        object.texture = Some(path.to_string());

        if let Some(old) = previous.texture {
            self.backend.release_texture(old);
        }
        log::info!("{} now textured with {}", id, path);
        Ok(true)
    }

    /// Texture one instance with a palette entry
    pub async fn set_palette_texture(
        &mut self,
        id: InstanceId,
        index: usize,
    ) -> Result<bool, AssetError> {
        let path = self
            .config
            .palette_texture(index)
            .ok_or(AssetError::UnknownPaletteEntry(index))?
            .to_string();
        self.set_texture(id, &path).await
    }

    /// Release every instance and empty the scene
    pub fn clear(&mut self) {
        let count = self.scene.len();
        self.scene.clear(&self.backend);
        log::info!("cleared {} instances", count);
    }

    pub fn save(&self) -> SavedScene {
        SavedScene::snapshot(&self.scene)
    }

    pub fn save_json(&self) -> Result<String, DocumentError> {
        self.save().to_json()
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        self.save().save_to_file(path)
    }

    /// Replace the scene with the instances of `document`.
    ///
    /// The old scene is released first. Entries whose asset fails are logged,
    /// reported and skipped; the rest keep their document order.
    pub async fn load(&mut self, document: SavedScene) -> LoadReport {
        self.clear();

        let requests = document.requests();
        let scale = self.config.default_scale;
        let results = futures::future::join_all(
            requests
                .iter()
                .cloned()
                .map(|request| self.loader.load_object(&self.backend, request, scale)),
        )
        .await;

        let mut report = LoadReport::default();
        for (index, (request, result)) in requests.into_iter().zip(results).enumerate() {
            match result {
                Ok(object) => report.loaded.push(self.scene.push(object)),
                Err(error) => {
                    log::error!("skipping saved instance {} ({}): {}", index, request.asset, error);
                    report.failed.push(FailedInstance {
                        index,
                        asset: request.asset,
                        error,
                    });
                }
            }
        }

        log::info!(
            "loaded {} of {} saved instances",
            report.loaded.len(),
            report.loaded.len() + report.failed.len()
        );
        report
    }

    /// Validate a JSON document, then load it.
    ///
    /// An invalid document leaves the current scene untouched.
    pub async fn load_json(&mut self, text: &str) -> Result<LoadReport, DocumentError> {
        let document = SavedScene::from_json(text)?;
        Ok(self.load(document).await)
    }

    pub async fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, DocumentError> {
        let document = SavedScene::load_from_file(path)?;
        Ok(self.load(document).await)
    }

    /// Snapshot for the renderer
    pub fn frame(&self, aspect: f32) -> FrameDescription {
        FrameDescription::build(
            &self.scene,
            self.config.field_of_view_degrees,
            aspect,
            self.config.light_direction,
        )
    }

    pub fn labels(&self) -> Vec<&str> {
        self.scene.labels()
    }

    pub fn statistics(&self) -> SceneStatistics {
        self.scene.statistics()
    }
}
