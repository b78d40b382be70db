//! # Saved Scene Documents
//!
//! A saved scene is the minimal state needed to rebuild every instance by
//! running the asset pipeline again: asset path, label, transform and texture
//! path. GPU handles are never written.
//!
//! ```json
//! {
//!   "version": 1,
//!   "instances": [
//!     {
//!       "asset": "assets/objs/bed.obj",
//!       "label": "bed",
//!       "offset": [-0.5, 0.0, -1.25],
//!       "scale": 1.2,
//!       "rotation": 0.0,
//!       "texture": "assets/objs/texture.png"
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    loader::PlacementRequest,
    object::{ObjectTransform, SceneObject},
    scene::Scene,
};

/// Document format written by [`SavedScene::to_json`]
pub const DOCUMENT_VERSION: u32 = 1;

/// File name offered for downloads and used by the native helpers
pub const DEFAULT_FILE_NAME: &str = "saved_scene.json";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Json(String),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("document has no 'instances' array")]
    MissingInstances,
    #[error("document version {0} is not supported")]
    UnsupportedVersion(u64),
    #[error("instance {index} is invalid: {message}")]
    InvalidInstance { index: usize, message: String },
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

/// One instance as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedInstance {
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub offset: [f32; 3],
    pub scale: f32,
    /// Yaw in radians
    pub rotation: f32,
    #[serde(default)]
    pub texture: Option<String>,
}

impl SavedInstance {
    pub fn from_object(object: &SceneObject) -> Self {
        let transform = &object.transform;
        Self {
            asset: object.asset.clone(),
            label: Some(object.label.clone()),
            offset: transform.offset.into(),
            scale: transform.scale,
            rotation: transform.rotation,
            texture: object.texture.clone(),
        }
    }

    pub fn transform(&self) -> ObjectTransform {
        ObjectTransform::new(Vector3::from(self.offset), self.scale, self.rotation)
    }

    /// Placement that rebuilds this instance with its saved transform
    pub fn to_request(&self) -> PlacementRequest {
        PlacementRequest {
            asset: self.asset.clone(),
            label: self.label.clone(),
            texture: self.texture.clone(),
            transform: Some(self.transform()),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.asset.trim().is_empty() {
            return Err("empty asset path".to_string());
        }
        let mut numbers = self.offset.iter().chain([&self.scale, &self.rotation]);
        if numbers.any(|v| !v.is_finite()) {
            return Err("non-finite transform value".to_string());
        }
        Ok(())
    }
}

/// Snapshot of a whole scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScene {
    pub version: u32,
    pub instances: Vec<SavedInstance>,
}

impl Default for SavedScene {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            instances: Vec::new(),
        }
    }
}

impl SavedScene {
    pub fn snapshot(scene: &Scene) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            instances: scene
                .objects()
                .iter()
                .map(SavedInstance::from_object)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn requests(&self) -> Vec<PlacementRequest> {
        self.instances.iter().map(SavedInstance::to_request).collect()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Json(e.to_string()))
    }

    /// Parse and validate a document.
    ///
    /// The whole document is rejected if the top level is not an object with
    /// an `instances` array, the version is newer than this build understands,
    /// or any entry is malformed. A missing `version` is read as 1.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| DocumentError::Json(e.to_string()))?;
        let object = value.as_object().ok_or(DocumentError::NotAnObject)?;

        let version = match object.get("version") {
            None => u64::from(DOCUMENT_VERSION),
            Some(v) => v.as_u64().ok_or(DocumentError::UnsupportedVersion(0))?,
        };
        if version == 0 || version > u64::from(DOCUMENT_VERSION) {
            return Err(DocumentError::UnsupportedVersion(version));
        }

        let entries = object
            .get("instances")
            .and_then(serde_json::Value::as_array)
            .ok_or(DocumentError::MissingInstances)?;

        let instances = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let instance: SavedInstance = serde_json::from_value(entry.clone())
                    .map_err(|e| DocumentError::InvalidInstance {
                        index,
                        message: e.to_string(),
                    })?;
                instance
                    .validate()
                    .map_err(|message| DocumentError::InvalidInstance { index, message })?;
                Ok(instance)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: DOCUMENT_VERSION,
            instances,
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| io_error(path, e))?;
        log::info!("saved {} instances to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_json(&text)
    }
}

fn io_error(path: &Path, error: std::io::Error) -> DocumentError {
    DocumentError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
