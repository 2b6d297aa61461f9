//! Typed in-memory model of a Tiled level document.
//!
//! A [`LevelDocument`] is produced once by [`parse_level`](crate::parser::parse_level) and is
//! read-only afterwards. Layer and object group `draw_index` values share a single counter
//! assigned in document order, so consumers can composite them without re-reading the source.

use core::str::FromStr;

use bevy::prelude::*;

use crate::error::{GidOutOfRange, ParseError};

/// Tile-to-world projection family of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Square grid, tiles laid out along the axes.
    Orthogonal,
    /// Diamond grid, tiles laid out along the screen diagonals.
    Isometric,
}

impl Orientation {
    /// The exact string used for this orientation in level files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
        }
    }
}

impl FromStr for Orientation {
    type Err = ParseError;

    /// Case-sensitive: only `orthogonal` and `isometric` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orthogonal" => Ok(Self::Orthogonal),
            "isometric" => Ok(Self::Isometric),
            other => Err(ParseError::UnsupportedOrientation(other.to_string())),
        }
    }
}

/// A custom `name = value` property authored on the map or an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Polygon outline in object-local pixels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectPolygon {
    pub points: Vec<Vec2>,
}

/// An object from an object group (map-level or embedded in a tile).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    /// Tiled `type` (or `class` in newer files).
    pub object_type: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Polygon outlines, preserved verbatim even when unused by collider synthesis.
    pub polygons: Vec<ObjectPolygon>,
    pub properties: Vec<Property>,
}

impl MapObject {
    /// Objects without polygon data are treated as axis-aligned rectangles.
    #[inline]
    pub fn is_rectangle(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding rectangle in the object's own pixel space.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
        )
    }
}

/// A named group of objects.
///
/// Map-level groups carry a `draw_index`; collision groups embedded in tiles always use `0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectGroup {
    pub name: String,
    pub draw_order: String,
    pub objects: Vec<MapObject>,
    pub draw_index: usize,
}

impl ObjectGroup {
    /// Objects that contribute to the simple rectangle collider.
    pub fn rectangles(&self) -> impl Iterator<Item = &MapObject> {
        self.objects.iter().filter(|object| object.is_rectangle())
    }
}

/// Tileset image descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TilesetImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// Per-tile authored data inside a tileset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileMetadata {
    /// Local tile id (0-based, NOT a GID)
    pub local_id: u32,
    /// Embedded collision shapes, if the tile has any.
    pub collision: Option<ObjectGroup>,
}

/// A tileset embedded in the level, owning the gid range `[first_gid, first_gid + tile_count)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tileset {
    pub first_gid: u32,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub image: TilesetImage,
    pub tiles: Vec<TileMetadata>,
}

impl Tileset {
    /// Whether `gid` (flip flags already removed) falls inside this tileset's range.
    #[inline]
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }

    /// Look up authored metadata by local id.
    pub fn metadata(&self, local_id: u32) -> Option<&TileMetadata> {
        self.tiles.iter().find(|tile| tile.local_id == local_id)
    }
}

/// One cell of a tile layer: a global tile id with Tiled's flip flags in the top bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileRef {
    /// Raw value as stored in the file.
    pub raw: u32,
}

impl TileRef {
    pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
    pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
    pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
    const FLIP_MASK: u32 =
        Self::FLIPPED_HORIZONTALLY | Self::FLIPPED_VERTICALLY | Self::FLIPPED_DIAGONALLY;

    pub const EMPTY: Self = Self { raw: 0 };

    #[inline]
    pub fn new(raw: u32) -> Self {
        Self { raw }
    }

    /// Global tile id with flip flags removed. `0` is an empty cell.
    #[inline]
    pub fn global_id(self) -> u32 {
        self.raw & !Self::FLIP_MASK
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.global_id() == 0
    }

    pub fn flipped_horizontally(self) -> bool {
        self.raw & Self::FLIPPED_HORIZONTALLY != 0
    }

    pub fn flipped_vertically(self) -> bool {
        self.raw & Self::FLIPPED_VERTICALLY != 0
    }

    pub fn flipped_diagonally(self) -> bool {
        self.raw & Self::FLIPPED_DIAGONALLY != 0
    }
}

/// A grid of tile references stored row-major: index = y * width + x.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<TileRef>,
    pub draw_index: usize,
}

impl TileLayer {
    /// Tile at `(x, y)`, or `None` outside the layer or past truncated data.
    pub fn tile(&self, x: u32, y: u32) -> Option<TileRef> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Result of resolving a layer cell to its tileset metadata.
///
/// Misses are not errors: collider synthesis treats them as cells without collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileLookup<'a> {
    /// The cell is empty (gid 0) or outside the layer.
    Empty,
    /// The gid is outside every tileset, or its local id has no authored metadata.
    Unresolved { gid: u32 },
    Found {
        tileset: &'a Tileset,
        metadata: &'a TileMetadata,
    },
}

impl<'a> TileLookup<'a> {
    /// Collision group of a resolved tile.
    pub fn collision(&self) -> Option<&'a ObjectGroup> {
        match self {
            Self::Found { metadata, .. } => metadata.collision.as_ref(),
            Self::Empty | Self::Unresolved { .. } => None,
        }
    }
}

/// The parsed level: map header, tilesets, layers and object groups in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDocument {
    pub orientation: Orientation,
    /// Map width in cells
    pub width: u32,
    /// Map height in cells
    pub height: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    pub properties: Vec<Property>,
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<TileLayer>,
    pub object_groups: Vec<ObjectGroup>,
    /// Names of tile layers and object groups in document order.
    pub layer_names: Vec<String>,
}

impl LevelDocument {
    /// Map dimensions in cells.
    pub fn map_size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Tile dimensions in pixels.
    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.tile_width as f32, self.tile_height as f32)
    }

    /// Index of the tileset owning `gid`.
    ///
    /// When ranges overlap, the **last** matching tileset in document order wins.
    /// `0` and ids outside every range report [`GidOutOfRange`].
    pub fn tileset_index(&self, gid: u32) -> Result<usize, GidOutOfRange> {
        if gid == 0 {
            return Err(GidOutOfRange(gid));
        }
        self.tilesets
            .iter()
            .rposition(|tileset| tileset.contains_gid(gid))
            .ok_or(GidOutOfRange(gid))
    }

    /// Tileset owning `gid`, using the same last-match rule as [`Self::tileset_index`].
    pub fn tileset_for(&self, gid: u32) -> Option<&Tileset> {
        self.tileset_index(gid).ok().map(|index| &self.tilesets[index])
    }

    /// Resolve the cell `(x, y)` of `layer` to its tileset metadata.
    pub fn tile_metadata<'a>(&'a self, x: u32, y: u32, layer: &TileLayer) -> TileLookup<'a> {
        let Some(tile) = layer.tile(x, y) else {
            return TileLookup::Empty;
        };
        let gid = tile.global_id();
        if gid == 0 {
            return TileLookup::Empty;
        }
        let Some(tileset) = self.tileset_for(gid) else {
            return TileLookup::Unresolved { gid };
        };
        match tileset.metadata(gid - tileset.first_gid) {
            Some(metadata) => TileLookup::Found { tileset, metadata },
            None => TileLookup::Unresolved { gid },
        }
    }

    /// First map-level object group with the given name.
    pub fn object_group(&self, name: &str) -> Option<&ObjectGroup> {
        self.object_groups.iter().find(|group| group.name == name)
    }

    /// Map-level property value by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| property.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(first_gid: u32, tile_count: u32, name: &str) -> Tileset {
        Tileset {
            first_gid,
            name: name.to_string(),
            tile_width: 16,
            tile_height: 16,
            tile_count,
            ..default()
        }
    }

    fn document(tilesets: Vec<Tileset>) -> LevelDocument {
        LevelDocument {
            orientation: Orientation::Orthogonal,
            width: 2,
            height: 2,
            tile_width: 16,
            tile_height: 16,
            properties: Vec::new(),
            tilesets,
            layers: Vec::new(),
            object_groups: Vec::new(),
            layer_names: Vec::new(),
        }
    }

    #[test]
    fn test_orientation_is_case_sensitive() {
        assert_eq!("orthogonal".parse::<Orientation>().ok(), Some(Orientation::Orthogonal));
        assert_eq!("isometric".parse::<Orientation>().ok(), Some(Orientation::Isometric));
        assert!(matches!(
            "Isometric".parse::<Orientation>(),
            Err(ParseError::UnsupportedOrientation(_))
        ));
        assert!("hexagonal".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_tileset_index_covers_each_range() {
        let doc = document(vec![tileset(1, 4, "a"), tileset(5, 10, "b")]);
        for gid in 1..5 {
            assert_eq!(doc.tileset_index(gid), Ok(0));
        }
        for gid in 5..15 {
            assert_eq!(doc.tileset_index(gid), Ok(1));
        }
        assert_eq!(doc.tileset_index(0), Err(GidOutOfRange(0)));
        assert_eq!(doc.tileset_index(15), Err(GidOutOfRange(15)));
    }

    #[test]
    fn test_tileset_index_prefers_last_overlapping_match() {
        let doc = document(vec![tileset(1, 10, "wide"), tileset(3, 2, "narrow")]);
        assert_eq!(doc.tileset_index(2), Ok(0));
        assert_eq!(doc.tileset_index(3), Ok(1));
        assert_eq!(doc.tileset_index(4), Ok(1));
        assert_eq!(doc.tileset_index(5), Ok(0));
    }

    #[test]
    fn test_flip_flags_are_masked() {
        let tile = TileRef::new(TileRef::FLIPPED_HORIZONTALLY | TileRef::FLIPPED_DIAGONALLY | 7);
        assert_eq!(tile.global_id(), 7);
        assert!(tile.flipped_horizontally());
        assert!(!tile.flipped_vertically());
        assert!(tile.flipped_diagonally());
        assert!(TileRef::EMPTY.is_empty());
    }

    #[test]
    fn test_tile_metadata_misses_are_not_errors() {
        let mut sheet = tileset(1, 4, "a");
        sheet.tiles.push(TileMetadata {
            local_id: 1,
            collision: Some(ObjectGroup::default()),
        });
        let mut doc = document(vec![sheet]);
        let layer = TileLayer {
            name: "ground".into(),
            width: 2,
            height: 2,
            tiles: vec![TileRef::new(0), TileRef::new(2), TileRef::new(3), TileRef::new(99)],
            draw_index: 0,
        };
        doc.layers.push(layer.clone());

        assert_eq!(doc.tile_metadata(0, 0, &layer), TileLookup::Empty);
        assert!(doc.tile_metadata(1, 0, &layer).collision().is_some());
        assert_eq!(doc.tile_metadata(0, 1, &layer), TileLookup::Unresolved { gid: 3 });
        assert_eq!(doc.tile_metadata(1, 1, &layer), TileLookup::Unresolved { gid: 99 });
        assert_eq!(doc.tile_metadata(5, 5, &layer), TileLookup::Empty);
    }

    #[test]
    fn test_truncated_layer_data_reads_as_empty() {
        let layer = TileLayer {
            name: "short".into(),
            width: 2,
            height: 2,
            tiles: vec![TileRef::new(1)],
            draw_index: 0,
        };
        assert_eq!(layer.tile(0, 0), Some(TileRef::new(1)));
        assert_eq!(layer.tile(1, 1), None);
    }

    #[test]
    fn test_tile_index_does_not_overflow_on_huge_layers() {
        let layer = TileLayer {
            name: "huge".into(),
            width: 100_000,
            height: 100_000,
            tiles: vec![TileRef::new(1)],
            draw_index: 0,
        };
        assert_eq!(layer.tile(0, 0), Some(TileRef::new(1)));
        assert_eq!(layer.tile(99_999, 99_999), None);
    }
}
