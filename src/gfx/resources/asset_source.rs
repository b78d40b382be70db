//! Asset fetching
//!
//! Every OBJ, MTL and image file reaches the loader through an
//! [`AssetSource`]: an asynchronous "GET this path" seam. Paths are plain
//! `/`-separated strings; relative references inside assets are resolved with
//! [`resolve_relative`] the way a browser resolves a relative URL.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use futures::future::{FutureExt, LocalBoxFuture};
use thiserror::Error;

/// Errors raised while fetching, decoding or uploading one asset.
///
/// `Clone` because one in-flight fetch may be awaited by several loaders.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: String, message: String },
    #[error("{0} is not valid UTF-8 text")]
    NotText(String),
    #[error("failed to decode image {path}: {message}")]
    Decode { path: String, message: String },
    #[error("{0} contains no geometry")]
    EmptyGeometry(String),
    #[error("failed to upload {path} to the GPU: {message}")]
    Upload { path: String, message: String },
    #[error("asset catalog has no entry {0}")]
    UnknownCatalogEntry(usize),
    #[error("texture palette has no entry {0}")]
    UnknownPaletteEntry(usize),
}

/// Future returned by [`AssetSource::fetch`]
pub type FetchFuture = LocalBoxFuture<'static, Result<Vec<u8>, AssetError>>;

/// Asynchronous byte source for asset files
pub trait AssetSource {
    /// Start fetching `path`. The returned future owns everything it needs.
    fn fetch(&self, path: &str) -> FetchFuture;
}

/// Resolve `relative` against the location of `base`, like a relative URL.
///
/// ```rust
/// use diorama::gfx::resources::asset_source::resolve_relative;
///
/// assert_eq!(resolve_relative("assets/objs/bed.obj", "bed.mtl"), "assets/objs/bed.mtl");
/// assert_eq!(resolve_relative("assets/objs/bed.obj", "../tex/a.png"), "assets/tex/a.png");
/// ```
pub fn resolve_relative(base: &str, relative: &str) -> String {
    let relative = relative.trim();
    if relative.starts_with('/') || relative.contains("://") {
        return relative.to_string();
    }

    let mut segments: Vec<&str> = base.split('/').collect();
    // Drop the file name of the base
    segments.pop();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if !matches!(last, "" | "." | "..") => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Reads assets from a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, path: &str) -> FetchFuture {
        let full_path = self.full_path(path);
        let path = path.to_string();
        async move {
            log::debug!("reading {}", full_path.display());
            std::fs::read(&full_path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AssetError::NotFound(path),
                _ => AssetError::Fetch {
                    path,
                    message: e.to_string(),
                },
            })
        }
        .boxed_local()
    }
}

/// In-memory asset store that records how often each path was fetched
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RefCell<HashMap<String, Vec<u8>>>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow_mut().remove(path)
    }

    /// Number of `fetch` calls made for `path`, found or not
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.borrow().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> FetchFuture {
        *self
            .fetches
            .borrow_mut()
            .entry(path.to_string())
            .or_insert(0) += 1;

        let result = self
            .files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()));
        futures::future::ready(result).boxed_local()
    }
}
