//! One-call synthesis of runtime artifacts from a parsed level.

use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;

use crate::collider::CompositeCollider;
use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::graph::NavGraph;
use crate::navigation::NavGraphBuilder;
use crate::projection::TileProjection;

/// Everything synthesized from one level, handed to the caller read-only.
#[derive(Debug, Clone)]
pub struct LevelArtifacts {
    /// Tile units to world, including the instance transform
    pub tile_to_world: Affine2,
    pub collider: CompositeCollider,
    pub nav_graph: NavGraph,
}

/// Project the level, synthesize its collider, then flood-fill its navigation graph.
///
/// # Errors
///
/// [`SynthesisError::Projection`] if the level's tile size cannot be projected.
///
/// # Example
///
/// ```
/// use bevy_tilenav_assets::prelude::*;
/// use bevy_tilenav_core::prelude::*;
///
/// let doc = parse_level(r#"<map orientation="isometric" width="2" height="2"
///     tilewidth="64" tileheight="32"/>"#).unwrap();
/// let artifacts = synthesize(&doc, &SynthesisConfig::default()).unwrap();
/// assert_eq!(artifacts.nav_graph.node_count(), 4);
/// assert!(artifacts.collider.is_empty());
/// ```
pub fn synthesize(
    document: &LevelDocument,
    config: &SynthesisConfig,
) -> Result<LevelArtifacts, SynthesisError> {
    let projection = TileProjection::for_document(document)?;
    let tile_to_world = config.instance_transform * projection.tile_to_world;

    let collider = CompositeCollider::build(
        document,
        &projection.tile_to_world,
        &config.instance_transform,
    );
    let nav_graph = NavGraphBuilder::new(document, tile_to_world, &collider)
        .with_diagonals(config.link_diagonals)
        .with_pruning(config.prune_edges)
        .build();

    Ok(LevelArtifacts {
        tile_to_world,
        collider,
        nav_graph,
    })
}
