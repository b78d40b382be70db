//! Editor configuration: the asset catalog and texture palette offered by the
//! UI plus a few defaults.
//!
//! Every field falls back to its default when missing from the JSON, so a
//! config file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// One model the UI can place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    pub path: String,
}

impl CatalogEntry {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub catalog: Vec<CatalogEntry>,
    /// Texture images the user can pick; the first is used for new placements
    pub palette: Vec<String>,
    pub default_scale: f32,
    pub field_of_view_degrees: f32,
    pub light_direction: [f32; 3],
}

const CATALOG: [&str; 10] = [
    "barrel_3",
    "bed",
    "bookshelf_1",
    "bowl",
    "candles",
    "flask_2",
    "plate",
    "torch",
    "wine",
    "wood_box",
];

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            catalog: CATALOG
                .iter()
                .map(|name| CatalogEntry::new(*name, format!("assets/objs/{}.obj", name)))
                .collect(),
            palette: vec![
                "assets/objs/texture.png".to_string(),
                "assets/objs/textura2.jpg".to_string(),
                "assets/objs/textura3.jpg".to_string(),
            ],
            default_scale: 1.2,
            field_of_view_degrees: 60.0,
            light_direction: [-1.0, 3.0, 5.0],
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn catalog_entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.catalog.get(index)
    }

    pub fn palette_texture(&self, index: usize) -> Option<&str> {
        self.palette.get(index).map(String::as_str)
    }

    /// Texture bound to newly placed objects
    pub fn default_texture(&self) -> Option<&str> {
        self.palette_texture(0)
    }
}
