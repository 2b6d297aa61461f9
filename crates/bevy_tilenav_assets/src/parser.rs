//! TMX level parser.
//!
//! Reads the structural subset of the Tiled `.tmx` format needed for collision and navigation:
//!
//! - `<map orientation width height tilewidth tileheight>`
//! - embedded `<tileset>` elements with an `<image>` and optional per-tile collision groups
//! - `<layer>` elements with XML (`<tile gid=".."/>`) or CSV tile data
//! - `<objectgroup>` elements with rectangle and polygon objects
//!
//! Parsing is all-or-nothing: any error aborts and no document is returned.

use core::str::FromStr;

use bevy::log::{debug, trace};
use bevy::math::Vec2;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::{
    LevelDocument, MapObject, ObjectGroup, ObjectPolygon, Orientation, Property, TileLayer,
    TileMetadata, TileRef, Tileset, TilesetImage,
};
use crate::error::ParseError;

type XmlReader<'a> = Reader<&'a [u8]>;

/// Draw order used when an object group does not declare one (Tiled's default).
const DEFAULT_DRAW_ORDER: &str = "topdown";

/// Parse level text into a [`LevelDocument`].
///
/// # Errors
///
/// - [`ParseError::UnsupportedOrientation`] if the orientation is not exactly
///   `orthogonal` or `isometric`
/// - [`ParseError::MissingAttribute`] / [`ParseError::MissingElement`] for absent required data
/// - [`ParseError::MalformedNumber`] for numeric fields that do not parse
///
/// # Example
///
/// ```
/// use bevy_tilenav_assets::parser::parse_level;
///
/// let doc = parse_level(r#"
///     <map orientation="orthogonal" width="1" height="1" tilewidth="16" tileheight="16">
///       <tileset firstgid="1" name="t" tilewidth="16" tileheight="16" tilecount="1">
///         <image source="t.png" width="16" height="16"/>
///       </tileset>
///       <layer name="ground" width="1" height="1"><data encoding="csv">1</data></layer>
///     </map>"#).unwrap();
/// assert_eq!(doc.layers[0].tiles.len(), 1);
/// ```
pub fn parse_level(text: &str) -> Result<LevelDocument, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    loop {
        let document = match reader.read_event()? {
            Event::Start(start) if start.name().as_ref() == b"map" => {
                parse_map(&mut reader, &start, true)?
            }
            Event::Empty(start) if start.name().as_ref() == b"map" => {
                parse_map(&mut reader, &start, false)?
            }
            Event::Eof => {
                return Err(ParseError::MissingElement {
                    element: "map",
                    context: "level document".to_string(),
                });
            }
            _ => continue,
        };

        debug!(
            "Parsed {} level {}x{} ({}x{} px tiles): {} tilesets, {} tile layers, {} object groups",
            document.orientation.as_str(),
            document.width,
            document.height,
            document.tile_width,
            document.tile_height,
            document.tilesets.len(),
            document.layers.len(),
            document.object_groups.len()
        );
        return Ok(document);
    }
}

/// Where an object group was found; map-level groups are named and drawn.
#[derive(Clone, Copy)]
enum GroupSite {
    Map { draw_index: usize },
    Tile,
}

fn parse_map(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<LevelDocument, ParseError> {
    let orientation = Orientation::from_str(&required(start, "orientation")?)?;

    let mut document = LevelDocument {
        orientation,
        width: required_number(start, "width")?,
        height: required_number(start, "height")?,
        tile_width: required_number(start, "tilewidth")?,
        tile_height: required_number(start, "tileheight")?,
        properties: Vec::new(),
        tilesets: Vec::new(),
        layers: Vec::new(),
        object_groups: Vec::new(),
        layer_names: Vec::new(),
    };

    // Tile layers, object groups and other layer kinds share one draw counter.
    let mut next_draw_index = 0usize;

    for_each_child(reader, has_children, "map", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        match start.name().as_ref() {
            b"tileset" => {
                document
                    .tilesets
                    .push(parse_tileset(reader, &start, has_children)?);
            }
            b"layer" => {
                let layer = parse_tile_layer(reader, &start, has_children, next_draw_index)?;
                next_draw_index += 1;
                document.layer_names.push(layer.name.clone());
                document.layers.push(layer);
            }
            b"objectgroup" => {
                let site = GroupSite::Map {
                    draw_index: next_draw_index,
                };
                let group = parse_object_group(reader, &start, has_children, site)?;
                next_draw_index += 1;
                document.layer_names.push(group.name.clone());
                document.object_groups.push(group);
            }
            b"imagelayer" | b"group" => {
                next_draw_index += 1;
                skip_children(reader, &start, has_children)?;
            }
            b"properties" => {
                document.properties = parse_properties(reader, has_children)?;
            }
            _ => skip_children(reader, &start, has_children)?,
        }
        Ok(())
    })?;

    Ok(document)
}

fn parse_tileset(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<Tileset, ParseError> {
    let first_gid: u32 = required_number(start, "firstgid")?;
    let name = required(start, "name")?;
    let tile_width = required_number(start, "tilewidth")?;
    let tile_height = required_number(start, "tileheight")?;
    let tile_count: u32 = required_number(start, "tilecount")?;

    let mut image = None;
    let mut tiles = Vec::new();

    for_each_child(reader, has_children, "tileset", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        match start.name().as_ref() {
            b"image" => {
                image = Some(TilesetImage {
                    source: required(&start, "source")?,
                    width: required_number(&start, "width")?,
                    height: required_number(&start, "height")?,
                });
                skip_children(reader, &start, has_children)
            }
            b"tile" => {
                tiles.push(parse_tile_metadata(reader, &start, has_children)?);
                Ok(())
            }
            _ => skip_children(reader, &start, has_children),
        }
    })?;

    let image = image.ok_or_else(|| ParseError::MissingElement {
        element: "image",
        context: format!("tileset '{name}'"),
    })?;

    trace!(
        "Tileset '{}': gids {}..{}, {} authored tiles",
        name,
        first_gid,
        first_gid.saturating_add(tile_count),
        tiles.len()
    );

    Ok(Tileset {
        first_gid,
        name,
        tile_width,
        tile_height,
        tile_count,
        image,
        tiles,
    })
}

fn parse_tile_metadata(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<TileMetadata, ParseError> {
    let local_id = required_number(start, "id")?;
    let mut collision = None;

    for_each_child(reader, has_children, "tile", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        if start.name().as_ref() == b"objectgroup" {
            let group = parse_object_group(reader, &start, has_children, GroupSite::Tile)?;
            // Only the first collision group of a tile is used.
            if collision.is_none() {
                collision = Some(group);
            }
            Ok(())
        } else {
            skip_children(reader, &start, has_children)
        }
    })?;

    Ok(TileMetadata {
        local_id,
        collision,
    })
}

fn parse_tile_layer(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
    draw_index: usize,
) -> Result<TileLayer, ParseError> {
    let name = required(start, "name")?;
    let width = required_number(start, "width")?;
    let height = required_number(start, "height")?;
    let mut tiles = None;

    for_each_child(reader, has_children, "layer", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        if start.name().as_ref() == b"data" {
            tiles = Some(parse_layer_data(reader, &start, has_children)?);
            Ok(())
        } else {
            skip_children(reader, &start, has_children)
        }
    })?;

    let tiles = tiles.ok_or_else(|| ParseError::MissingElement {
        element: "data",
        context: format!("layer '{name}'"),
    })?;

    Ok(TileLayer {
        name,
        width,
        height,
        tiles,
        draw_index,
    })
}

fn parse_layer_data(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<Vec<TileRef>, ParseError> {
    if let Some(compression) = attribute(start, "compression")? {
        return Err(ParseError::UnsupportedEncoding(compression));
    }

    match attribute(start, "encoding")?.as_deref() {
        None => {
            let mut tiles = Vec::new();
            for_each_child(reader, has_children, "data", |reader, child| {
                let Child::Element { start, has_children } = child else {
                    return Ok(());
                };
                if start.name().as_ref() == b"tile" {
                    // `<tile/>` without a gid is an empty cell.
                    tiles.push(TileRef::new(optional_number(&start, "gid", 0)?));
                }
                skip_children(reader, &start, has_children)
            })?;
            Ok(tiles)
        }
        Some("csv") => {
            let mut csv = String::new();
            for_each_child(reader, has_children, "data", |reader, child| match child {
                Child::Text(text) => {
                    csv.push_str(&text);
                    Ok(())
                }
                Child::Element { start, has_children } => {
                    skip_children(reader, &start, has_children)
                }
            })?;
            parse_csv_tiles(&csv)
        }
        Some(other) => Err(ParseError::UnsupportedEncoding(other.to_string())),
    }
}

fn parse_csv_tiles(csv: &str) -> Result<Vec<TileRef>, ParseError> {
    csv.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<u32>()
                .map(TileRef::new)
                .map_err(|_| ParseError::MalformedNumber {
                    attribute: "data",
                    element: "data".to_string(),
                    value: value.to_string(),
                })
        })
        .collect()
}

fn parse_object_group(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
    site: GroupSite,
) -> Result<ObjectGroup, ParseError> {
    let (name, draw_index) = match site {
        GroupSite::Map { draw_index } => (required(start, "name")?, draw_index),
        GroupSite::Tile => (attribute(start, "name")?.unwrap_or_default(), 0),
    };
    let draw_order =
        attribute(start, "draworder")?.unwrap_or_else(|| DEFAULT_DRAW_ORDER.to_string());
    let mut objects = Vec::new();

    for_each_child(reader, has_children, "objectgroup", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        if start.name().as_ref() == b"object" {
            objects.push(parse_object(reader, &start, has_children)?);
            Ok(())
        } else {
            skip_children(reader, &start, has_children)
        }
    })?;

    Ok(ObjectGroup {
        name,
        draw_order,
        objects,
        draw_index,
    })
}

fn parse_object(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<MapObject, ParseError> {
    let object_type = match attribute(start, "type")? {
        Some(object_type) => object_type,
        None => attribute(start, "class")?.unwrap_or_default(),
    };
    let mut object = MapObject {
        id: required_number(start, "id")?,
        name: attribute(start, "name")?.unwrap_or_default(),
        object_type,
        x: required_number(start, "x")?,
        y: required_number(start, "y")?,
        width: optional_number(start, "width", 0.0)?,
        height: optional_number(start, "height", 0.0)?,
        polygons: Vec::new(),
        properties: Vec::new(),
    };

    for_each_child(reader, has_children, "object", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        match start.name().as_ref() {
            b"polygon" => {
                let points = parse_points(&required(&start, "points")?)?;
                object.polygons.push(ObjectPolygon { points });
                skip_children(reader, &start, has_children)
            }
            b"properties" => {
                object.properties = parse_properties(reader, has_children)?;
                Ok(())
            }
            _ => skip_children(reader, &start, has_children),
        }
    })?;

    Ok(object)
}

/// Parse `"x1,y1 x2,y2 ..."` into points.
fn parse_points(points: &str) -> Result<Vec<Vec2>, ParseError> {
    points
        .split_whitespace()
        .map(|pair| {
            let malformed = || ParseError::MalformedPoint(pair.to_string());
            let (x, y) = pair.split_once(',').ok_or_else(malformed)?;
            let x = x.trim().parse::<f32>().map_err(|_| malformed())?;
            let y = y.trim().parse::<f32>().map_err(|_| malformed())?;
            Ok(Vec2::new(x, y))
        })
        .collect()
}

fn parse_properties(
    reader: &mut XmlReader<'_>,
    has_children: bool,
) -> Result<Vec<Property>, ParseError> {
    let mut properties = Vec::new();

    for_each_child(reader, has_children, "properties", |reader, child| {
        let Child::Element { start, has_children } = child else {
            return Ok(());
        };
        if start.name().as_ref() != b"property" {
            return skip_children(reader, &start, has_children);
        }

        let name = required(&start, "name")?;
        // Multi-line string properties carry their value as element text.
        let mut value = attribute(&start, "value")?.unwrap_or_default();
        for_each_child(reader, has_children, "property", |reader, child| match child {
            Child::Text(text) => {
                value.push_str(&text);
                Ok(())
            }
            Child::Element { start, has_children } => {
                skip_children(reader, &start, has_children)
            }
        })?;
        properties.push(Property { name, value });
        Ok(())
    })?;

    Ok(properties)
}

// ===== EVENT HELPERS =====

/// A direct child of the element currently being read.
enum Child<'a> {
    Element {
        start: BytesStart<'a>,
        has_children: bool,
    },
    Text(String),
}

/// Visit each direct child of an element until its end tag.
///
/// The visitor must consume the subtree of every `Child::Element` with `has_children`
/// (parse it or call [`skip_children`]). Self-closing parents have no children to visit.
fn for_each_child<'a, F>(
    reader: &mut XmlReader<'a>,
    has_children: bool,
    parent: &str,
    mut visit: F,
) -> Result<(), ParseError>
where
    F: FnMut(&mut XmlReader<'a>, Child<'a>) -> Result<(), ParseError>,
{
    if !has_children {
        return Ok(());
    }

    loop {
        match reader.read_event()? {
            Event::Start(start) => visit(
                reader,
                Child::Element {
                    start,
                    has_children: true,
                },
            )?,
            Event::Empty(start) => visit(
                reader,
                Child::Element {
                    start,
                    has_children: false,
                },
            )?,
            Event::Text(text) => visit(reader, Child::Text(text.unescape()?.into_owned()))?,
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ParseError::UnexpectedEof(parent.to_string())),
            _ => {}
        }
    }
}

/// Consume and discard an element's subtree.
fn skip_children(
    reader: &mut XmlReader<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<(), ParseError> {
    let name = element_name(start);
    for_each_child(reader, has_children, &name, |reader, child| match child {
        Child::Element { start, has_children } => skip_children(reader, &start, has_children),
        Child::Text(_) => Ok(()),
    })
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Get an optional attribute value.
fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required(start: &BytesStart<'_>, name: &'static str) -> Result<String, ParseError> {
    attribute(start, name)?.ok_or_else(|| ParseError::MissingAttribute {
        attribute: name,
        element: element_name(start),
    })
}

fn number<T: FromStr>(
    start: &BytesStart<'_>,
    name: &'static str,
    value: &str,
) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::MalformedNumber {
        attribute: name,
        element: element_name(start),
        value: value.to_string(),
    })
}

fn required_number<T: FromStr>(start: &BytesStart<'_>, name: &'static str) -> Result<T, ParseError> {
    number(start, name, &required(start, name)?)
}

fn optional_number<T: FromStr>(
    start: &BytesStart<'_>,
    name: &'static str,
    default: T,
) -> Result<T, ParseError> {
    match attribute(start, name)? {
        Some(value) => number(start, name, &value),
        None => Ok(default),
    }
}
