use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use engine::{
    Capabilities, Component, ComponentSet, ComponentValue, ContentError, DrawLayer, EntityKind,
    GameEntity, MapDocument, RectF, ResourceLoader, SpriteBatch, Texture, Vec2,
};
use tracing::{info, warn};

pub(crate) const MAP_ENTITY_ID: &str = "map";
pub(crate) const MAP_COMPONENT: &str = "map";

/// Tile layers whose name carries this prefix draw in front of the actors.
const FOREGROUND_LAYER_PREFIX: &str = "fg";

/// The tile map of the gameplay scene. Owns the parsed document plus one
/// texture per tileset, and draws one tile layer at a time so the scene can
/// interleave actors between background and foreground layers.
pub(crate) struct MapEntity {
    components: ComponentSet,
    source: String,
    tileset_textures: HashMap<String, Texture>,
}

impl MapEntity {
    pub(crate) fn new(source: impl Into<String>) -> Self {
        Self {
            components: ComponentSet::new(),
            source: source.into(),
            tileset_textures: HashMap::new(),
        }
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Points the entity at another map file. Takes effect at the next
    /// content load; until then the previous document keeps drawing.
    pub(crate) fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub(crate) fn document(&self) -> Option<&Arc<MapDocument>> {
        self.components.get(MAP_COMPONENT).and_then(Component::as_map)
    }

    /// Tile layer indices drawn behind the actors, in document order.
    pub(crate) fn background_layers(&self) -> Vec<usize> {
        self.layer_split(false)
    }

    /// Tile layer indices drawn in front of the actors, in document order.
    pub(crate) fn foreground_layers(&self) -> Vec<usize> {
        self.layer_split(true)
    }

    fn layer_split(&self, foreground: bool) -> Vec<usize> {
        let Some(doc) = self.document() else {
            return Vec::new();
        };
        doc.layers()
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.name.starts_with(FOREGROUND_LAYER_PREFIX) == foreground)
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn draw_layer(&self, index: usize, batch: &mut SpriteBatch<'_>) {
        let Some(doc) = self.document() else {
            warn!(entity = MAP_ENTITY_ID, "draw skipped, map not loaded");
            return;
        };
        let Some(layer) = doc.layer(index) else {
            warn!(entity = MAP_ENTITY_ID, index, "draw skipped, no such layer");
            return;
        };
        if !layer.visible {
            return;
        }

        let (columns, _) = doc.size_in_tiles();
        for (cell, &gid) in layer.gids.iter().enumerate() {
            if gid == 0 {
                continue;
            }
            let Some(tileset) = doc.tileset_for_gid(gid) else {
                continue;
            };
            let Some(texture) = self.tileset_textures.get(&tileset.image_source) else {
                continue;
            };
            let column = cell as u32 % columns;
            let row = cell as u32 / columns;
            let dest = doc.tile_bounds(column, row);
            batch.draw_texture(
                texture,
                Vec2::new(dest.x, dest.y),
                Some(tileset.source_rect(gid)),
            );
        }
    }
}

impl GameEntity for MapEntity {
    fn id(&self) -> &str {
        MAP_ENTITY_ID
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Display
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            content_loadable: true,
            updatable: false,
            drawable: true,
        }
    }

    fn components(&self) -> &ComponentSet {
        &self.components
    }

    fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    fn load_content(&mut self, loader: &mut dyn ResourceLoader) -> Result<(), ContentError> {
        let doc = loader.load_map(&self.source)?;
        for tileset in doc.tilesets() {
            let texture = loader.load_texture(&tileset.image_source)?;
            self.tileset_textures
                .insert(tileset.image_source.clone(), texture);
        }
        info!(
            map = self.source.as_str(),
            layers = doc.layers().len(),
            tilesets = doc.tilesets().len(),
            "map content loaded"
        );
        self.components
            .insert(Component::new(MAP_COMPONENT, ComponentValue::Map(doc)));
        Ok(())
    }

    fn draw(&self, batch: &mut SpriteBatch<'_>) {
        let layer_count = self.document().map(|doc| doc.layers().len()).unwrap_or(0);
        for index in 0..layer_count {
            self.draw_layer(index, batch);
        }
    }

    fn bounding_rect(&self) -> RectF {
        let Some(doc) = self.document() else {
            return RectF::default();
        };
        let size = doc.size_in_pixels();
        RectF::new(0.0, 0.0, size.width, size.height)
    }

    fn layer(&self) -> DrawLayer {
        DrawLayer::Map
    }

    fn custom_renderer(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use engine::FsResourceLoader;
    use tempfile::TempDir;

    use super::*;

    const MAP_SOURCE: &str = r#"<map width="2" height="1" tilewidth="8" tileheight="8">
  <tileset firstgid="1" name="terrain" tilewidth="8" tileheight="8" columns="1">
    <image source="terrain.png" width="8" height="8"/>
  </tileset>
  <layer name="ground" width="2" height="1"><data encoding="csv">1,0</data></layer>
  <layer name="fg_canopy" width="2" height="1"><data encoding="csv">0,1</data></layer>
</map>"#;

    fn write_assets(dir: &Path) {
        fs::write(dir.join("level.tmx"), MAP_SOURCE).expect("write map");
        let image = image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 50, 50, 255]));
        image.save(dir.join("terrain.png")).expect("save png");
    }

    fn loaded_map(temp: &TempDir) -> MapEntity {
        write_assets(temp.path());
        let mut loader = FsResourceLoader::new(temp.path());
        let mut map = MapEntity::new("level.tmx");
        map.load_content(&mut loader).expect("load");
        map
    }

    #[test]
    fn layers_split_on_the_foreground_prefix() {
        let temp = TempDir::new().expect("temp");
        let map = loaded_map(&temp);

        assert_eq!(map.background_layers(), vec![0]);
        assert_eq!(map.foreground_layers(), vec![1]);
    }

    #[test]
    fn draw_layer_blits_only_non_empty_cells() {
        let temp = TempDir::new().expect("temp");
        let map = loaded_map(&temp);

        let mut frame = vec![0u8; 16 * 8 * 4];
        let mut batch = SpriteBatch::new(&mut frame, 16, 8);
        batch.begin(None);
        map.draw_layer(0, &mut batch);
        batch.end();

        // Layer 0 fills only the left tile.
        assert_eq!(&frame[0..4], &[200, 50, 50, 255]);
        assert_eq!(&frame[8 * 4..8 * 4 + 4], &[0, 0, 0, 0]);
    }

    #[test]
    fn map_bounds_cover_the_pixel_extent() {
        let temp = TempDir::new().expect("temp");
        let map = loaded_map(&temp);

        assert_eq!(map.bounding_rect(), RectF::new(0.0, 0.0, 16.0, 8.0));
    }

    #[test]
    fn unloaded_map_draws_nothing() {
        let map = MapEntity::new("level.tmx");
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut batch = SpriteBatch::new(&mut frame, 4, 4);
        batch.begin(None);
        map.draw(&mut batch);
        batch.end();

        assert!(frame.iter().all(|&byte| byte == 0));
    }
}
