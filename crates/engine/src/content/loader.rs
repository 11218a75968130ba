use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::map::{MapDocument, MapParseError};
use super::texture::Texture;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse map {path}: {source}")]
    MapParse {
        path: PathBuf,
        #[source]
        source: MapParseError,
    },
}

/// Turns string asset identifiers into renderable resources. Loaders cache,
/// so repeated requests for the same identifier are cheap.
pub trait ResourceLoader {
    fn load_texture(&mut self, name: &str) -> Result<Texture, ContentError>;

    fn load_map(&mut self, name: &str) -> Result<Arc<MapDocument>, ContentError>;
}

/// Filesystem-backed loader. Identifiers are paths relative to the content
/// root, extension included (`textures/hero.png`, `maps/village.tmx`).
pub struct FsResourceLoader {
    content_root: PathBuf,
    textures: HashMap<String, Texture>,
    maps: HashMap<String, Arc<MapDocument>>,
}

impl FsResourceLoader {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            textures: HashMap::new(),
            maps: HashMap::new(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    fn read_asset(&self, name: &str) -> Result<(PathBuf, Vec<u8>), ContentError> {
        let path = self.content_root.join(name);
        let bytes = fs::read(&path).map_err(|source| ContentError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, bytes))
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load_texture(&mut self, name: &str) -> Result<Texture, ContentError> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(texture.clone());
        }

        let (path, bytes) = self.read_asset(name)?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|source| ContentError::ImageDecode { path, source })?
            .to_rgba8();
        let texture = Texture::from_rgba8(decoded.width(), decoded.height(), decoded.into_raw());

        debug!(
            asset = name,
            width = texture.width(),
            height = texture.height(),
            "texture loaded"
        );
        self.textures.insert(name.to_string(), texture.clone());
        Ok(texture)
    }

    fn load_map(&mut self, name: &str) -> Result<Arc<MapDocument>, ContentError> {
        if let Some(map) = self.maps.get(name) {
            return Ok(Arc::clone(map));
        }

        let (path, bytes) = self.read_asset(name)?;
        let raw = String::from_utf8_lossy(&bytes);
        let map = MapDocument::parse(&raw)
            .map(Arc::new)
            .map_err(|source| ContentError::MapParse { path, source })?;

        debug!(
            asset = name,
            layers = map.layers().len(),
            "map loaded"
        );
        self.maps.insert(name.to_string(), Arc::clone(&map));
        Ok(map)
    }
}
