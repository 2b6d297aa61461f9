//! Composite solid collider synthesized from per-tile collision metadata.

use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;

/// An aggregate of axis-aligned solid rectangles under one shared transform.
///
/// Rectangles live in collider space (tile units for synthesized colliders) and are placed in
/// the world by a single affine transform, the same one that places navigation nodes. World
/// queries are mapped back into collider space before testing, so a projected tile covers
/// exactly its own diamond and never the bounding box around it.
///
/// Rectangles are half-open: a point on a `max` edge belongs to the neighboring cell, so a
/// row of full-tile colliders has no gaps and no double coverage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeCollider {
    rects: Vec<Rect>,
    to_world: Affine2,
    to_local: Affine2,
}

impl CompositeCollider {
    /// Collect the rectangle collision objects of every tile in every tile layer.
    ///
    /// For cell `(x, y)`, a tile-local object rectangle is scaled to tile units and offset by
    /// the cell origin. The collider keeps these tile-space rectangles and maps queries through
    /// `instance * tile_to_world`. Polygon objects are ignored.
    ///
    /// Cells whose gid matches no tileset, or whose tile has no authored metadata, are skipped.
    ///
    /// # Arguments
    ///
    /// * `document` - Parsed level
    /// * `tile_to_world` - Projection from tile units to world pixels
    /// * `instance` - Placement of the map instance, applied after the projection
    pub fn build(document: &LevelDocument, tile_to_world: &Affine2, instance: &Affine2) -> Self {
        let tile_size = document.tile_size();
        if tile_size.cmpeq(Vec2::ZERO).any() {
            warn!("Level has a zero tile size, no collider synthesized");
            return Self::default();
        }

        let world = *instance * *tile_to_world;
        if world.matrix2.determinant() == 0.0 || !world.is_finite() {
            warn!("Level transform is not invertible, no collider synthesized");
            return Self::default();
        }

        let mut rects = Vec::new();
        let mut misses = 0usize;

        for layer in &document.layers {
            for y in 0..layer.height {
                for x in 0..layer.width {
                    let group = match document.tile_metadata(x, y, layer) {
                        TileLookup::Empty => continue,
                        TileLookup::Unresolved { gid } => {
                            trace!(
                                "No tile metadata for gid {gid} at ({x}, {y}) in '{}'",
                                layer.name
                            );
                            misses += 1;
                            continue;
                        }
                        TileLookup::Found { metadata, .. } => match &metadata.collision {
                            Some(group) => group,
                            None => continue,
                        },
                    };

                    let origin = Vec2::new(x as f32, y as f32);
                    for object in group.rectangles() {
                        let local = object.rect();
                        rects.push(Rect::from_corners(
                            origin + local.min / tile_size,
                            origin + local.max / tile_size,
                        ));
                    }
                }
            }
        }

        if misses > 0 {
            debug!("{misses} tiles had no collision metadata");
        }
        info!(
            "Synthesized collider: {} rectangles from {} tile layers",
            rects.len(),
            document.layers.len()
        );

        Self::with_transform(rects, world)
    }

    /// Build a collider from world-space rectangles.
    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self::with_transform(rects, Affine2::IDENTITY)
    }

    /// Build a collider from collider-space rectangles placed in the world by `to_world`.
    ///
    /// `to_world` must be invertible.
    pub fn with_transform(rects: Vec<Rect>, to_world: Affine2) -> Self {
        Self {
            rects,
            to_world,
            to_local: to_world.inverse(),
        }
    }

    /// Whether the world-space `point` lies inside any rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        let local = self.to_local.transform_point2(point);
        self.rects.iter().any(|rect| contains_half_open(rect, local))
    }

    /// World-space overlap between `rect` and the solid rectangles, if any has positive area.
    ///
    /// The query is mapped into collider space by its bounds and clipped against every
    /// rectangle; the result is the world bounds of all clipped pieces. Touching edges do not
    /// count as overlap.
    pub fn intersects(&self, rect: Rect) -> Option<Rect> {
        let query = transform_rect(&self.to_local, rect);
        let overlap = self
            .rects
            .iter()
            .map(|solid| solid.intersect(query))
            .filter(|piece| !piece.is_empty())
            .reduce(|bounds, piece| bounds.union(piece))?;

        Some(transform_rect(&self.to_world, overlap))
    }

    /// Rectangles in collider space.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Collider space to world.
    pub fn transform(&self) -> &Affine2 {
        &self.to_world
    }

    /// Axis-aligned world bounds of each rectangle, for debug drawing.
    pub fn world_bounds(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rects
            .iter()
            .map(|rect| transform_rect(&self.to_world, *rect))
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

fn contains_half_open(rect: &Rect, point: Vec2) -> bool {
    point.x >= rect.min.x && point.x < rect.max.x && point.y >= rect.min.y && point.y < rect.max.y
}

/// Axis-aligned bounds of a rectangle after an affine transform.
pub fn transform_rect(transform: &Affine2, rect: Rect) -> Rect {
    let corners = [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ]
    .map(|corner| transform.transform_point2(corner));

    corners[1..]
        .iter()
        .fold(Rect::from_corners(corners[0], corners[0]), |bounds, corner| {
            bounds.union_point(*corner)
        })
}
