use std::collections::HashMap;

use roxmltree::{Document, Node};
use thiserror::Error;

use crate::app::{RectF, SizeF, Vec2};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapParseError {
    #[error("malformed map XML at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("root element must be <map>, found <{found}>")]
    InvalidRoot { found: String },
    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: String,
    },
    #[error("attribute '{attribute}' on <{element}> has invalid value '{value}'")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'; only csv is supported")]
    UnsupportedEncoding { layer: String, encoding: String },
    #[error("layer '{layer}' has {found} tile entries, expected {expected}")]
    LayerSizeMismatch {
        layer: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile gid '{value}' in layer '{layer}'")]
    InvalidGid { layer: String, value: String },
}

/// One tile grid. Gids are row-major, 0 meaning empty; drawn in document
/// order unless the owning scene interleaves layers itself.
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub visible: bool,
    pub gids: Vec<u32>,
}

/// Tileset reference: gids at or above `first_gid` sample this sheet.
#[derive(Debug, Clone)]
pub struct Tileset {
    pub first_gid: u32,
    pub columns: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub image_source: String,
}

impl Tileset {
    /// Source sample rectangle for a gid owned by this tileset.
    pub fn source_rect(&self, gid: u32) -> RectF {
        let local = gid - self.first_gid;
        let column = local % self.columns;
        let row = local / self.columns;
        RectF::new(
            (column * self.tile_width) as f32,
            (row * self.tile_height) as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }
}

/// An object from a named object layer with its string property bag.
#[derive(Debug, Clone)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    pub position: Vec2,
    pub size: SizeF,
    properties: HashMap<String, String>,
}

impl MapObject {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn bounds(&self) -> RectF {
        RectF::new(self.position.x, self.position.y, self.size.width, self.size.height)
    }
}

/// A parsed tile map: tile grid layers, tilesets and named object layers.
#[derive(Debug, Clone)]
pub struct MapDocument {
    size_in_tiles: (u32, u32),
    tile_size: (u32, u32),
    tilesets: Vec<Tileset>,
    layers: Vec<TileLayer>,
    object_layers: HashMap<String, Vec<MapObject>>,
}

impl MapDocument {
    pub fn parse(raw: &str) -> Result<Self, MapParseError> {
        let doc = Document::parse(raw).map_err(|error| MapParseError::Malformed {
            message: error.to_string(),
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "map" {
            return Err(MapParseError::InvalidRoot {
                found: root.tag_name().name().to_string(),
            });
        }

        let width = required_attr_u32(root, "width")?;
        let height = required_attr_u32(root, "height")?;
        let tile_width = required_attr_u32(root, "tilewidth")?;
        let tile_height = required_attr_u32(root, "tileheight")?;

        let mut tilesets = Vec::new();
        let mut layers = Vec::new();
        let mut object_layers = HashMap::new();

        for child in root.children().filter(|node| node.is_element()) {
            match child.tag_name().name() {
                "tileset" => tilesets.push(parse_tileset(child)?),
                "layer" => layers.push(parse_tile_layer(child, width, height)?),
                "objectgroup" => {
                    let name = required_attr(child, "name")?.to_string();
                    object_layers.insert(name, parse_objects(child)?);
                }
                // Editor metadata (properties, imagelayer, ...) is ignored.
                _ => {}
            }
        }

        tilesets.sort_by_key(|tileset| tileset.first_gid);

        Ok(Self {
            size_in_tiles: (width, height),
            tile_size: (tile_width, tile_height),
            tilesets,
            layers,
            object_layers,
        })
    }

    pub fn size_in_tiles(&self) -> (u32, u32) {
        self.size_in_tiles
    }

    pub fn tile_size(&self) -> (u32, u32) {
        self.tile_size
    }

    pub fn size_in_pixels(&self) -> SizeF {
        SizeF::new(
            (self.size_in_tiles.0 * self.tile_size.0) as f32,
            (self.size_in_tiles.1 * self.tile_size.1) as f32,
        )
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// The tileset owning a gid: the one with the largest `first_gid` not
    /// above it.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<&Tileset> {
        self.tilesets
            .iter()
            .rev()
            .find(|tileset| tileset.first_gid <= gid)
    }

    pub fn object_layer(&self, name: &str) -> Option<&[MapObject]> {
        self.object_layers.get(name).map(Vec::as_slice)
    }

    /// World-space rectangle covered by a tile grid cell.
    pub fn tile_bounds(&self, column: u32, row: u32) -> RectF {
        RectF::new(
            (column * self.tile_size.0) as f32,
            (row * self.tile_size.1) as f32,
            self.tile_size.0 as f32,
            self.tile_size.1 as f32,
        )
    }
}

fn required_attr<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, MapParseError> {
    node.attribute(attribute)
        .ok_or_else(|| MapParseError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn required_attr_u32(node: Node<'_, '_>, attribute: &str) -> Result<u32, MapParseError> {
    let value = required_attr(node, attribute)?;
    value
        .parse::<u32>()
        .map_err(|_| MapParseError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}

fn attr_f32(node: Node<'_, '_>, attribute: &str, default: f32) -> Result<f32, MapParseError> {
    match node.attribute(attribute) {
        None => Ok(default),
        Some(value) => value
            .parse::<f32>()
            .map_err(|_| MapParseError::InvalidAttribute {
                element: node.tag_name().name().to_string(),
                attribute: attribute.to_string(),
                value: value.to_string(),
            }),
    }
}

fn parse_tileset(node: Node<'_, '_>) -> Result<Tileset, MapParseError> {
    let image_source = node
        .children()
        .filter(|child| child.is_element())
        .find(|child| child.tag_name().name() == "image")
        .map(|image| required_attr(image, "source").map(str::to_string))
        .transpose()?
        .unwrap_or_default();

    // Tiled emits columns="0" for image-collection tilesets, which have no
    // grid to sample; `source_rect` needs a non-zero column count.
    let columns = required_attr_u32(node, "columns")?;
    if columns == 0 {
        return Err(MapParseError::InvalidAttribute {
            element: "tileset".to_string(),
            attribute: "columns".to_string(),
            value: "0".to_string(),
        });
    }

    Ok(Tileset {
        first_gid: required_attr_u32(node, "firstgid")?,
        columns,
        tile_width: required_attr_u32(node, "tilewidth")?,
        tile_height: required_attr_u32(node, "tileheight")?,
        image_source,
    })
}

fn parse_tile_layer(node: Node<'_, '_>, width: u32, height: u32) -> Result<TileLayer, MapParseError> {
    let name = node.attribute("name").unwrap_or_default().to_string();
    let visible = node.attribute("visible") != Some("0");

    let data = node
        .children()
        .filter(|child| child.is_element())
        .find(|child| child.tag_name().name() == "data")
        .ok_or_else(|| MapParseError::MissingAttribute {
            element: "layer".to_string(),
            attribute: "data".to_string(),
        })?;

    let encoding = data.attribute("encoding").unwrap_or_default();
    if encoding != "csv" {
        return Err(MapParseError::UnsupportedEncoding {
            layer: name,
            encoding: encoding.to_string(),
        });
    }

    let raw = data.text().unwrap_or_default();
    let mut gids = Vec::with_capacity((width * height) as usize);
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let gid = entry.parse::<u32>().map_err(|_| MapParseError::InvalidGid {
            layer: name.clone(),
            value: entry.to_string(),
        })?;
        gids.push(gid);
    }

    let expected = (width * height) as usize;
    if gids.len() != expected {
        return Err(MapParseError::LayerSizeMismatch {
            layer: name,
            expected,
            found: gids.len(),
        });
    }

    Ok(TileLayer {
        name,
        visible,
        gids,
    })
}

fn parse_objects(group: Node<'_, '_>) -> Result<Vec<MapObject>, MapParseError> {
    let mut objects = Vec::new();
    for node in group.children().filter(|child| child.is_element()) {
        if node.tag_name().name() != "object" {
            continue;
        }

        let mut properties = HashMap::new();
        if let Some(bag) = node
            .children()
            .filter(|child| child.is_element())
            .find(|child| child.tag_name().name() == "properties")
        {
            for property in bag.children().filter(|child| child.is_element()) {
                if property.tag_name().name() != "property" {
                    continue;
                }
                let key = required_attr(property, "name")?.to_string();
                let value = property
                    .attribute("value")
                    .map(str::to_string)
                    .or_else(|| property.text().map(str::to_string))
                    .unwrap_or_default();
                properties.insert(key, value);
            }
        }

        objects.push(MapObject {
            id: required_attr_u32(node, "id")?,
            name: node.attribute("name").unwrap_or_default().to_string(),
            position: Vec2::new(attr_f32(node, "x", 0.0)?, attr_f32(node, "y", 0.0)?),
            size: SizeF::new(attr_f32(node, "width", 0.0)?, attr_f32(node, "height", 0.0)?),
            properties,
        });
    }
    Ok(objects)
}
