//! # Scene Management Module
//!
//! Placed instances of loaded assets and everything that edits them.
//!
//! ## Key Components
//!
//! - [`SceneEditor`] - Entry point for the UI: place, select, edit, texture, clear, save, load
//! - [`Scene`] - Ordered instances plus the current selection
//! - [`SceneObject`] - One placed instance: parts, transform, texture, camera framing
//! - [`AssetLoader`] - OBJ/MTL/texture pipeline producing scene objects
//! - [`SceneEdit`] - Edit messages applied to the selected instance
//! - [`SavedScene`] - JSON snapshot of a scene
//! - [`Vertex3D`] - GPU vertex with position, normal and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use diorama::{
//!     config::EditorConfig,
//!     gfx::{backend::NullBackend, resources::FileSource, scene::{SceneEditor, SceneEdit}},
//! };
//!
//! # futures::executor::block_on(async {
//! let mut editor = SceneEditor::new(
//!     EditorConfig::default(),
//!     Rc::new(FileSource::new(".")),
//!     NullBackend::new(),
//! );
//! let id = editor.place_catalog(1).await.unwrap();
//! editor.select(id);
//! editor.apply_edit(SceneEdit::Scale(2.0)).await.unwrap();
//! let json = editor.save_json().unwrap();
//! # });
//! ```

pub mod controller;
pub mod editor;
pub mod loader;
pub mod object;
pub mod scene;
pub mod serialization;
pub mod vertex;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export main types
pub use controller::{Axis, EditError, EditField, SceneEdit};
pub use editor::{FailedInstance, LoadReport, SceneEditor};
pub use loader::{AssetLoader, LoadedAsset, PlacementRequest};
pub use object::{ObjectTransform, Part, PartSet, SceneObject, DEFAULT_SCALE};
pub use scene::{InstanceId, Scene, SceneStatistics};
pub use serialization::{DocumentError, SavedInstance, SavedScene, DEFAULT_FILE_NAME, DOCUMENT_VERSION};
pub use vertex::Vertex3D;
