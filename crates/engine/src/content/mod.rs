mod loader;
mod map;
mod texture;

pub use loader::{ContentError, FsResourceLoader, ResourceLoader};
pub use map::{MapDocument, MapObject, MapParseError, TileLayer, Tileset};
pub use texture::Texture;
