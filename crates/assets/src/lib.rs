//! Texture loading: a batch of named images decoded into RGBA8, all or nothing.
//!
//! The renderer consumes textures by [`TextureId`], never by file path. A batch
//! either resolves every requested texture or fails as a whole; partial results
//! are never observable.

use fpview_common::TextureId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded texture pixels, tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A 1x1 texture of a single color.
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }
}

/// One entry of a load batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub name: String,
    pub path: PathBuf,
}

impl TextureRequest {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Errors from texture loading. Any one of them fails the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0:?} requested twice in one batch")]
    DuplicateName(String),
    #[error("texture {0:?} has no pixels")]
    EmptyImage(String),
    #[error("no texture named {0:?}")]
    Missing(String),
}

/// Source of decoded textures.
pub trait TextureLoader {
    fn load(&self, request: &TextureRequest) -> Result<TextureData, AssetError>;
}

/// Reads PNG files relative to a root directory.
#[derive(Debug, Clone)]
pub struct PngTextureLoader {
    root: PathBuf,
}

impl PngTextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextureLoader for PngTextureLoader {
    fn load(&self, request: &TextureRequest) -> Result<TextureData, AssetError> {
        let path = self.root.join(&request.path);
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::EmptyImage(request.name.clone()));
        }
        tracing::debug!(name = %request.name, width, height, path = %path.display(), "decoded texture");
        Ok(TextureData {
            name: request.name.clone(),
            width,
            height,
            rgba: decoded.into_raw(),
        })
    }
}

/// Produces 1x1 placeholder textures without touching the filesystem.
///
/// Names listed in `missing` fail with [`AssetError::Missing`], which lets
/// headless runs and tests exercise the failure path.
#[derive(Debug, Clone, Default)]
pub struct SolidTextureLoader {
    colors: BTreeMap<String, [u8; 4]>,
    missing: Vec<String>,
}

impl SolidTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, name: impl Into<String>, rgba: [u8; 4]) -> Self {
        self.colors.insert(name.into(), rgba);
        self
    }

    pub fn failing(mut self, name: impl Into<String>) -> Self {
        self.missing.push(name.into());
        self
    }
}

impl TextureLoader for SolidTextureLoader {
    fn load(&self, request: &TextureRequest) -> Result<TextureData, AssetError> {
        if self.missing.contains(&request.name) {
            return Err(AssetError::Missing(request.name.clone()));
        }
        let color = self
            .colors
            .get(&request.name)
            .copied()
            .unwrap_or([255, 0, 255, 255]);
        Ok(TextureData::solid(request.name.clone(), color))
    }
}

/// Immutable set of loaded textures, shared read-only by every scene object.
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    textures: Vec<Arc<TextureData>>,
    by_name: BTreeMap<String, TextureId>,
}

impl TextureSet {
    /// Id of the texture loaded under `name`.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TextureId) -> Option<&Arc<TextureData>> {
        self.textures.get(id.0 as usize)
    }

    /// Textures in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &Arc<TextureData>)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, t)| (TextureId(i as u32), t))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Load every request or none of them. Ids are assigned in request order.
pub fn load_batch(
    loader: &dyn TextureLoader,
    requests: &[TextureRequest],
) -> Result<TextureSet, AssetError> {
    let _span = tracing::info_span!("load_textures", count = requests.len()).entered();

    let mut set = TextureSet::default();
    for request in requests {
        if set.by_name.contains_key(&request.name) {
            return Err(AssetError::DuplicateName(request.name.clone()));
        }
        let data = loader.load(request)?;
        let id = TextureId(set.textures.len() as u32);
        set.textures.push(Arc::new(data));
        set.by_name.insert(request.name.clone(), id);
    }

    tracing::info!(count = set.len(), "texture batch loaded");
    Ok(set)
}
