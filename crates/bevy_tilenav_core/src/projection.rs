//! Tile-grid to world affine projections.
//!
//! Tile space has one unit per cell with `(0, 0)` at the top-left corner of the map, so the
//! center of cell `(x, y)` is `(x + 0.5, y + 0.5)`. World space is in pixels.

use bevy::math::{Affine2, Mat2};
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;

use crate::error::ProjectionError;

/// Builds a tile→world transform for a tile size in pixels.
type ProjectionStrategy = fn(Vec2) -> Affine2;

fn strategy(orientation: Orientation) -> ProjectionStrategy {
    match orientation {
        Orientation::Orthogonal => orthogonal,
        Orientation::Isometric => isometric,
    }
}

/// Square grid: scale tile units by the tile size.
fn orthogonal(tile_size: Vec2) -> Affine2 {
    Affine2::from_scale(tile_size)
}

/// Diamond grid, built from a rotation, a uniform scale, a shear and a vertical squash.
///
/// The composition is applied right to left, so a tile-space point is squashed first and
/// rotated last. For 64x32 tiles, `(1, 0)` lands on `(32, 16)` and `(0, 1)` on `(-32, 16)`.
fn isometric(tile_size: Vec2) -> Affine2 {
    let theta = (tile_size.y / tile_size.x).atan();
    let shear = (2.0 * theta).tan();
    let scale = (0.25 * tile_size.x * tile_size.x + 0.25 * tile_size.y * tile_size.y).sqrt();

    Affine2::from_angle(theta)
        * Affine2::from_scale(Vec2::splat(scale))
        * Affine2::from_mat2(Mat2::from_cols(
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0 / shear, 1.0),
        ))
        * Affine2::from_scale(Vec2::new(1.0, (2.0 * theta).sin()))
}

/// The tile→world projection of a map.
///
/// # Example
///
/// ```
/// use bevy::math::Affine2;
/// use bevy::prelude::*;
/// use bevy_tilenav_assets::prelude::Orientation;
/// use bevy_tilenav_core::projection::TileProjection;
///
/// let projection = TileProjection::new(Orientation::Orthogonal, Vec2::new(16.0, 16.0)).unwrap();
/// assert_eq!(projection.cell_center(IVec2::new(1, 2)), Vec2::new(24.0, 40.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileProjection {
    pub orientation: Orientation,
    /// Tile size in pixels
    pub tile_size: Vec2,
    pub tile_to_world: Affine2,
}

impl TileProjection {
    /// Build the projection for an orientation and tile size.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::DegenerateTileSize`] if either tile dimension is not positive.
    pub fn new(orientation: Orientation, tile_size: Vec2) -> Result<Self, ProjectionError> {
        if tile_size.x <= 0.0 || tile_size.y <= 0.0 || !tile_size.is_finite() {
            return Err(ProjectionError::DegenerateTileSize {
                width: tile_size.x as u32,
                height: tile_size.y as u32,
            });
        }

        Ok(Self {
            orientation,
            tile_size,
            tile_to_world: strategy(orientation)(tile_size),
        })
    }

    /// Projection for a parsed level.
    pub fn for_document(document: &LevelDocument) -> Result<Self, ProjectionError> {
        Self::new(document.orientation, document.tile_size()).map_err(|_| {
            ProjectionError::DegenerateTileSize {
                width: document.tile_width,
                height: document.tile_height,
            }
        })
    }

    /// Map a tile-space point to world space.
    #[inline]
    pub fn project(&self, tile: Vec2) -> Vec2 {
        self.tile_to_world.transform_point2(tile)
    }

    /// Map a world-space point back to tile space.
    pub fn unproject(&self, world: Vec2) -> Vec2 {
        self.tile_to_world.inverse().transform_point2(world)
    }

    /// World position of the center of a cell.
    #[inline]
    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        self.project(cell_center(cell))
    }
}

/// Tile-space center of a cell.
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2() + Vec2::splat(0.5)
}
