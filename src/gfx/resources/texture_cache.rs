//! Decoded-image cache keyed by resolved path.
//!
//! The cache stores the *pending* fetch for every path, not only the finished
//! image: a second request for a path that is still downloading joins the first
//! request instead of starting another one.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use super::asset_source::{AssetError, AssetSource};

/// RGBA8 pixels decoded from an image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Decode any format the `image` crate understands
    pub fn decode(path: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let rgba = img.to_rgba8();

        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    /// 1x1 image of a single colour
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }
}

type PendingImage = Shared<LocalBoxFuture<'static, Result<Rc<TextureImage>, AssetError>>>;

pub struct TextureCache {
    source: Rc<dyn AssetSource>,
    entries: RefCell<HashMap<String, PendingImage>>,
}

impl TextureCache {
    pub fn new(source: Rc<dyn AssetSource>) -> Self {
        Self {
            source,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Fetch and decode `path`, sharing any fetch already started for it.
    ///
    /// Failed fetches are evicted so a later request can try again. Only the
    /// failed entry itself is evicted, never a newer fetch for the same path.
    pub async fn load(&self, path: &str) -> Result<Rc<TextureImage>, AssetError> {
        let pending = self.pending(path);
        let result = pending.clone().await;

        if result.is_err() {
            self.evict(path, &pending);
        }
        result
    }

    fn evict(&self, path: &str, failed: &PendingImage) {
        let mut entries = self.entries.borrow_mut();
        if entries
            .get(path)
            .is_some_and(|current| Shared::ptr_eq(current, failed))
        {
            log::debug!("texture cache evict: {}", path);
            entries.remove(path);
        }
    }

    fn pending(&self, path: &str) -> PendingImage {
        if let Some(existing) = self.entries.borrow().get(path) {
            log::debug!("texture cache hit: {}", path);
            return existing.clone();
        }

        log::debug!("texture cache miss: {}", path);
        let fetch = self.source.fetch(path);
        let owned_path = path.to_string();
        let pending = async move {
            let bytes = fetch.await?;
            TextureImage::decode(&owned_path, &bytes).map(Rc::new)
        }
        .boxed_local()
        .shared();

        self.entries
            .borrow_mut()
            .insert(path.to_string(), pending.clone());
        pending
    }

    /// True when `path` has a finished or in-flight entry
    pub fn contains(&self, path: &str) -> bool {
        self.entries.borrow().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
