//! Flood-fill navigation graph synthesis.
//!
//! Starting from the first open cell in row-major order, the builder expands outward one
//! batch at a time through the four cardinal neighbors of each frontier node. Every node
//! created in a batch is then linked to whichever of its eight neighbors already exist.
//!
//! Linking is order dependent: a node only sees neighbors assigned before it finished its
//! own expansion step. Batches are processed as an ordered FIFO so the result is
//! deterministic for a given document and transform.

use std::collections::HashMap;

use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;

use crate::collider::CompositeCollider;
use crate::graph::{NavGraph, NavGraphEdge, NavGraphNode};
use crate::projection::cell_center;

/// Neighbor steps in tile units: the four cardinal steps, then the four diagonals.
const NEIGHBOR_STEPS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
];

const CARDINAL_STEPS: usize = 4;

/// A node paired with the cell it stands on.
type Placed = (i32, IVec2);

/// Builds a [`NavGraph`] by flood-filling the open cells of a level.
///
/// # Example
///
/// ```
/// use bevy::math::Affine2;
/// use bevy::prelude::*;
/// use bevy_tilenav_assets::prelude::*;
/// use bevy_tilenav_core::prelude::*;
///
/// let doc = parse_level(r#"<map orientation="orthogonal" width="3" height="3"
///     tilewidth="16" tileheight="16"/>"#).unwrap();
/// let collider = CompositeCollider::default();
/// let graph = NavGraphBuilder::new(&doc, Affine2::from_scale(Vec2::splat(16.0)), &collider)
///     .build();
/// assert_eq!(graph.node_count(), 9);
/// ```
pub struct NavGraphBuilder<'a> {
    document: &'a LevelDocument,
    tile_to_world: Affine2,
    collider: &'a CompositeCollider,
    link_diagonals: bool,
    prune: bool,
}

impl<'a> NavGraphBuilder<'a> {
    /// # Arguments
    ///
    /// * `document` - Level whose `width`/`height` bound the flood fill
    /// * `tile_to_world` - Maps tile units to world positions (projection and placement)
    /// * `collider` - Solid geometry, in the same world space
    pub fn new(
        document: &'a LevelDocument,
        tile_to_world: Affine2,
        collider: &'a CompositeCollider,
    ) -> Self {
        Self {
            document,
            tile_to_world,
            collider,
            link_diagonals: true,
            prune: true,
        }
    }

    /// Link diagonal neighbors as well as cardinal ones (default `true`).
    pub fn with_diagonals(mut self, link_diagonals: bool) -> Self {
        self.link_diagonals = link_diagonals;
        self
    }

    /// Prune dominated edges once the fill completes (default `true`).
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Run the flood fill.
    ///
    /// A level without any open cell yields an empty graph.
    pub fn build(&self) -> NavGraph {
        let mut graph = NavGraph::new();

        let Some(seed) = self.find_seed() else {
            info!(
                "No open cell in {}x{} level, navigation graph is empty",
                self.document.width, self.document.height
            );
            return graph;
        };

        // Cells are keyed before projection, so float error never splits a node.
        let mut assigned: HashMap<IVec2, i32> = HashMap::new();
        let seed_index = graph.add_node(NavGraphNode::new(self.world_center(seed)));
        assigned.insert(seed, seed_index);

        let mut batch: Vec<Placed> = vec![(seed_index, seed)];
        let mut batches = 0usize;

        while !batch.is_empty() {
            let mut next_batch = Vec::new();
            for (_, cell) in batch {
                let created = self.expand(cell, &mut graph, &mut assigned);
                for placed in &created {
                    self.link(*placed, &mut graph, &assigned);
                }
                next_batch.extend(created);
            }
            batch = next_batch;
            batches += 1;
        }

        debug!(
            "Flood fill from cell {seed} finished after {batches} batches: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        if self.prune {
            graph.prune_edges();
        }

        info!(
            "Synthesized navigation graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// First open cell in row-major order.
    fn find_seed(&self) -> Option<IVec2> {
        let size = self.map_size();
        (0..size.y)
            .flat_map(|y| (0..size.x).map(move |x| IVec2::new(x, y)))
            .find(|cell| !self.collider.contains(self.world_center(*cell)))
    }

    /// Create nodes for the open, unassigned cardinal neighbors of `cell`.
    fn expand(
        &self,
        cell: IVec2,
        graph: &mut NavGraph,
        assigned: &mut HashMap<IVec2, i32>,
    ) -> Vec<Placed> {
        let mut created = Vec::new();

        for step in &NEIGHBOR_STEPS[..CARDINAL_STEPS] {
            let neighbor = cell + *step;
            if assigned.contains_key(&neighbor) || !self.in_bounds(neighbor) {
                continue;
            }
            let position = self.world_center(neighbor);
            if self.collider.contains(position) {
                continue;
            }

            let index = graph.add_node(NavGraphNode::new(position));
            assigned.insert(neighbor, index);
            created.push((index, neighbor));
        }

        created
    }

    /// Connect a new node to every already assigned neighbor.
    fn link(&self, (index, cell): Placed, graph: &mut NavGraph, assigned: &HashMap<IVec2, i32>) {
        let steps = if self.link_diagonals {
            &NEIGHBOR_STEPS[..]
        } else {
            &NEIGHBOR_STEPS[..CARDINAL_STEPS]
        };

        for step in steps {
            let Some(&other) = assigned.get(&(cell + *step)) else {
                continue;
            };
            let from = graph.get_node(index).copied();
            let to = graph.get_node(other).copied();
            let (Some(from), Some(to)) = (from, to) else {
                continue;
            };
            graph.add_edge(NavGraphEdge::between(&from, &to));
        }
    }

    /// Cell centers strictly inside the map rectangle.
    fn in_bounds(&self, cell: IVec2) -> bool {
        let size = self.map_size();
        cell.x >= 0 && cell.y >= 0 && cell.x < size.x && cell.y < size.y
    }

    fn map_size(&self) -> IVec2 {
        self.document.map_size().as_ivec2()
    }

    fn world_center(&self, cell: IVec2) -> Vec2 {
        self.tile_to_world.transform_point2(cell_center(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::TileProjection;

    fn open_level(orientation: Orientation, width: u32, height: u32) -> LevelDocument {
        LevelDocument {
            orientation,
            width,
            height,
            tile_width: 16,
            tile_height: 16,
            properties: Vec::new(),
            tilesets: Vec::new(),
            layers: Vec::new(),
            object_groups: Vec::new(),
            layer_names: Vec::new(),
        }
    }

    fn ortho() -> Affine2 {
        Affine2::from_scale(Vec2::splat(16.0))
    }

    fn degree_at(graph: &NavGraph, position: Vec2) -> usize {
        let node = graph
            .nodes()
            .find(|node| node.position.abs_diff_eq(position, 1e-3))
            .unwrap();
        graph.edges_from(node.index).count()
    }

    #[test]
    fn test_open_three_by_three_is_fully_connected() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        let collider = CompositeCollider::default();
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider)
            .with_pruning(false)
            .build();

        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.edge_count(), 20);
        assert_eq!(degree_at(&graph, Vec2::new(24.0, 24.0)), 8);
        for corner in [
            Vec2::new(8.0, 8.0),
            Vec2::new(40.0, 8.0),
            Vec2::new(8.0, 40.0),
            Vec2::new(40.0, 40.0),
        ] {
            assert_eq!(degree_at(&graph, corner), 3);
        }
        for side in [
            Vec2::new(24.0, 8.0),
            Vec2::new(8.0, 24.0),
            Vec2::new(40.0, 24.0),
            Vec2::new(24.0, 40.0),
        ] {
            assert_eq!(degree_at(&graph, side), 5);
        }
    }

    #[test]
    fn test_seed_is_first_open_cell_in_row_major_order() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        // Block the whole first row and the first cell of the second row
        let collider = CompositeCollider::from_rects(vec![
            Rect::new(0.0, 0.0, 48.0, 16.0),
            Rect::new(0.0, 16.0, 16.0, 32.0),
        ]);
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider).build();

        assert_eq!(graph.get_node(0).unwrap().position, Vec2::new(24.0, 24.0));
        assert_eq!(graph.node_count(), 5);
    }

    #[test]
    fn test_pruning_keeps_grid_edges() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        let collider = CompositeCollider::default();
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider).build();
        assert_eq!(graph.edge_count(), 20);
    }

    #[test]
    fn test_without_diagonals_graph_is_four_connected() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        let collider = CompositeCollider::default();
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider)
            .with_diagonals(false)
            .build();

        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.edge_count(), 12);
        assert!(graph.edges().all(|edge| (edge.cost - 16.0).abs() < 1e-4));
    }

    #[test]
    fn test_all_solid_level_has_no_nodes() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        let collider = CompositeCollider::from_rects(vec![Rect::new(0.0, 0.0, 48.0, 48.0)]);
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider).build();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_flood_stops_at_walls() {
        let doc = open_level(Orientation::Orthogonal, 3, 3);
        // Solid middle column splits the level; only the left column is reachable
        let collider = CompositeCollider::from_rects(vec![Rect::new(16.0, 0.0, 32.0, 48.0)]);
        let graph = NavGraphBuilder::new(&doc, ortho(), &collider).build();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.nodes().all(|node| node.position.x == 8.0));
    }

    #[test]
    fn test_build_is_deterministic() {
        let doc = open_level(Orientation::Orthogonal, 6, 4);
        let collider = CompositeCollider::from_rects(vec![Rect::new(32.0, 16.0, 48.0, 48.0)]);
        let builder = NavGraphBuilder::new(&doc, ortho(), &collider);

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.total_cost(), second.total_cost());
        assert!(first.nodes().zip(second.nodes()).all(|(a, b)| a == b));
    }

    #[test]
    fn test_isometric_open_level() {
        let mut doc = open_level(Orientation::Isometric, 3, 3);
        doc.tile_width = 64;
        doc.tile_height = 32;
        let projection = TileProjection::for_document(&doc).unwrap();
        let collider = CompositeCollider::default();
        let graph = NavGraphBuilder::new(&doc, projection.tile_to_world, &collider).build();

        assert_eq!(graph.node_count(), 9);
        assert_eq!(graph.edge_count(), 20);
        let seed = graph.get_node(0).unwrap();
        assert!(seed.position.abs_diff_eq(Vec2::new(0.0, 16.0), 1e-3));
    }

    #[test]
    fn test_isometric_solid_center_blocks_one_cell() {
        let mut doc = open_level(Orientation::Isometric, 3, 3);
        doc.tile_width = 64;
        doc.tile_height = 32;
        let projection = TileProjection::for_document(&doc).unwrap();
        let collider = CompositeCollider::with_transform(
            vec![Rect::new(1.0, 1.0, 2.0, 2.0)],
            projection.tile_to_world,
        );
        let graph = NavGraphBuilder::new(&doc, projection.tile_to_world, &collider).build();

        // A ring of 8 cells: 8 cardinal edges plus the 4 diagonals that skirt the hole
        assert_eq!(graph.node_count(), 8);
        assert_eq!(graph.edge_count(), 12);
        let center = projection.cell_center(IVec2::ONE);
        assert!(graph.nodes().all(|node| !node.position.abs_diff_eq(center, 1e-3)));
        let west = projection.cell_center(IVec2::new(0, 1));
        assert!(graph.nodes().any(|node| node.position.abs_diff_eq(west, 1e-3)));
    }

    #[test]
    fn test_empty_map_has_no_nodes() {
        let doc = open_level(Orientation::Orthogonal, 0, 0);
        let collider = CompositeCollider::default();
        assert!(NavGraphBuilder::new(&doc, ortho(), &collider).build().is_empty());
    }
}
