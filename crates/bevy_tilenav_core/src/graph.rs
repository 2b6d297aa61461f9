//! Navigation graph container.
//!
//! An undirected graph of walkable world positions with Euclidean edge costs, backed by
//! `petgraph`. Node indices are assigned densely from `0` in insertion order and never change.

use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use bevy::prelude::*;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// A walkable world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavGraphNode {
    /// Graph index, or [`NavGraphNode::UNASSIGNED`] before insertion.
    pub index: i32,
    pub position: Vec2,
}

impl NavGraphNode {
    pub const UNASSIGNED: i32 = -1;

    pub fn new(position: Vec2) -> Self {
        Self {
            index: Self::UNASSIGNED,
            position,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.index != Self::UNASSIGNED
    }
}

/// A direct connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavGraphEdge {
    pub from: i32,
    pub to: i32,
    pub cost: f32,
}

impl NavGraphEdge {
    pub fn new(from: i32, to: i32, cost: f32) -> Self {
        Self { from, to, cost }
    }

    /// Edge between two assigned nodes, costed by their Euclidean distance.
    pub fn between(from: &NavGraphNode, to: &NavGraphNode) -> Self {
        Self::new(from.index, to.index, from.position.distance(to.position))
    }
}

/// Walkability graph handed to pathfinding.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    graph: UnGraph<NavGraphNode, NavGraphEdge>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and return its index. The stored node carries the same index.
    pub fn add_node(&mut self, node: NavGraphNode) -> i32 {
        let id = self.graph.add_node(node);
        let index = id.index() as i32;
        self.graph[id].index = index;
        index
    }

    /// Connect two existing nodes.
    ///
    /// Connecting an already connected pair replaces the stored edge, so each pair has at most
    /// one edge. Self-loops and unknown endpoints are rejected and return `false`.
    pub fn add_edge(&mut self, edge: NavGraphEdge) -> bool {
        let (Some(from), Some(to)) = (self.node_id(edge.from), self.node_id(edge.to)) else {
            warn!("Ignoring edge {} -> {}: unknown node", edge.from, edge.to);
            return false;
        };
        if from == to {
            return false;
        }
        self.graph.update_edge(from, to, edge);
        true
    }

    pub fn get_node(&self, index: i32) -> Option<&NavGraphNode> {
        self.node_id(index).map(|id| &self.graph[id])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &NavGraphNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &NavGraphEdge> {
        self.graph.edge_weights()
    }

    /// Edges incident to a node, in either direction.
    pub fn edges_from(&self, index: i32) -> impl Iterator<Item = &NavGraphEdge> {
        self.node_id(index)
            .into_iter()
            .flat_map(move |id| self.graph.edges(id).map(|edge| edge.weight()))
    }

    /// The node closest to a world position, lowest index first on ties.
    pub fn nearest_node(&self, position: Vec2) -> Option<&NavGraphNode> {
        self.nodes().min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
    }

    /// Nodes within `radius` of a world position (inclusive), in index order.
    pub fn nodes_within(&self, position: Vec2, radius: f32) -> impl Iterator<Item = &NavGraphNode> {
        let radius_squared = radius * radius;
        self.nodes()
            .filter(move |node| node.position.distance_squared(position) <= radius_squared)
    }

    /// Sum of all edge costs.
    pub fn total_cost(&self) -> f32 {
        self.edges().map(|edge| edge.cost).sum()
    }

    /// Remove every edge that is strictly longer than some other path between its endpoints.
    ///
    /// Shortest-path distances and reachability are unchanged: an edge that lies on a shortest
    /// path is never strictly dominated. Returns the number of removed edges.
    pub fn prune_edges(&mut self) -> usize {
        let doomed: HashSet<EdgeIndex> = self
            .graph
            .edge_references()
            .filter(|edge| {
                self.shortest_detour(edge.source(), edge.target(), edge.id(), edge.weight().cost)
                    .is_some_and(|detour| detour < edge.weight().cost * (1.0 - PRUNE_TOLERANCE))
            })
            .map(|edge| edge.id())
            .collect();

        if doomed.is_empty() {
            return 0;
        }

        let before = self.graph.edge_count();
        self.graph.retain_edges(|_, edge| !doomed.contains(&edge));
        let removed = before - self.graph.edge_count();
        debug!("Pruned {removed} of {before} navigation edges");
        removed
    }

    fn node_id(&self, index: i32) -> Option<NodeIndex> {
        let index = usize::try_from(index).ok()?;
        (index < self.graph.node_count()).then(|| NodeIndex::new(index))
    }

    /// Cost of the cheapest path from `start` to `goal` that avoids `skip`, if one is shorter
    /// than `limit`.
    fn shortest_detour(
        &self,
        start: NodeIndex,
        goal: NodeIndex,
        skip: EdgeIndex,
        limit: f32,
    ) -> Option<f32> {
        let mut best: HashMap<NodeIndex, f32> = HashMap::from([(start, 0.0)]);
        let mut open = BinaryHeap::from([Visit {
            cost: 0.0,
            node: start,
        }]);

        while let Some(Visit { cost, node }) = open.pop() {
            if node == goal {
                return Some(cost);
            }
            if cost >= limit {
                return None;
            }
            if best.get(&node).is_some_and(|known| cost > *known) {
                continue;
            }

            for edge in self.graph.edges(node) {
                if edge.id() == skip {
                    continue;
                }
                let next = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                let next_cost = cost + edge.weight().cost;
                if best.get(&next).is_none_or(|known| next_cost < *known) {
                    best.insert(next, next_cost);
                    open.push(Visit {
                        cost: next_cost,
                        node: next,
                    });
                }
            }
        }

        None
    }
}

/// Relative slack for float noise when comparing an edge against a detour.
const PRUNE_TOLERANCE: f32 = 1e-5;

/// Min-heap entry for [`NavGraph::shortest_detour`].
#[derive(Clone, Copy, PartialEq)]
struct Visit {
    cost: f32,
    node: NodeIndex,
}

impl Eq for Visit {}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(positions: &[Vec2]) -> NavGraph {
        let mut graph = NavGraph::new();
        for position in positions {
            graph.add_node(NavGraphNode::new(*position));
        }
        graph
    }

    fn link(graph: &mut NavGraph, from: i32, to: i32) -> bool {
        let edge = NavGraphEdge::between(
            graph.get_node(from).unwrap(),
            graph.get_node(to).unwrap(),
        );
        graph.add_edge(edge)
    }

    #[test]
    fn test_add_node_assigns_dense_indices() {
        let mut graph = NavGraph::new();
        assert!(!NavGraphNode::new(Vec2::ZERO).is_assigned());
        assert_eq!(graph.add_node(NavGraphNode::new(Vec2::ZERO)), 0);
        assert_eq!(graph.add_node(NavGraphNode::new(Vec2::X)), 1);
        assert_eq!(graph.get_node(1).unwrap().index, 1);
        assert!(graph.get_node(1).unwrap().is_assigned());
        assert!(graph.get_node(2).is_none());
        assert!(graph.get_node(NavGraphNode::UNASSIGNED).is_none());
    }

    #[test]
    fn test_add_edge_costs_and_collapses_duplicates() {
        let mut graph = graph_with(&[Vec2::ZERO, Vec2::new(3.0, 4.0)]);
        assert!(link(&mut graph, 0, 1));
        assert!(link(&mut graph, 1, 0));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.total_cost(), 5.0);
        assert_eq!(graph.edges_from(0).count(), 1);
        assert_eq!(graph.edges_from(1).count(), 1);

        assert!(!graph.add_edge(NavGraphEdge::new(0, 9, 1.0)));
        assert!(!graph.add_edge(NavGraphEdge::new(1, 1, 0.0)));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_prune_removes_dominated_edge() {
        // 0 -- 1 -- 2 in a line, plus a wasteful direct edge 0 -- 2 costed at 3
        let mut graph = graph_with(&[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]);
        link(&mut graph, 0, 1);
        link(&mut graph, 1, 2);
        graph.add_edge(NavGraphEdge::new(0, 2, 3.0));

        assert_eq!(graph.prune_edges(), 1);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().all(|edge| edge.cost == 1.0));
    }

    #[test]
    fn test_prune_keeps_grid_diagonals() {
        // Unit square with both diagonals: each diagonal (1.41) beats its detour (2.0)
        let mut graph = graph_with(&[Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y]);
        for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)] {
            link(&mut graph, from, to);
        }

        assert_eq!(graph.prune_edges(), 0);
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_prune_keeps_equal_cost_alternatives() {
        let mut graph = graph_with(&[Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]);
        link(&mut graph, 0, 1);
        link(&mut graph, 1, 2);
        graph.add_edge(NavGraphEdge::new(0, 2, 2.0));

        assert_eq!(graph.prune_edges(), 0);
    }

    #[test]
    fn test_nearest_node() {
        let graph = graph_with(&[Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]);
        assert_eq!(graph.nearest_node(Vec2::new(8.0, 1.0)).unwrap().index, 1);
        assert_eq!(graph.nearest_node(Vec2::new(-50.0, -50.0)).unwrap().index, 0);
        // Equidistant from 0 and 1
        assert_eq!(graph.nearest_node(Vec2::new(5.0, 0.0)).unwrap().index, 0);
        assert!(NavGraph::new().nearest_node(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_nodes_within_radius() {
        let graph = graph_with(&[Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]);
        let near: Vec<i32> = graph
            .nodes_within(Vec2::new(10.0, 0.0), 10.0)
            .map(|node| node.index)
            .collect();
        assert_eq!(near, vec![0, 1, 2]);

        let near: Vec<i32> = graph
            .nodes_within(Vec2::new(10.0, 1.0), 2.0)
            .map(|node| node.index)
            .collect();
        assert_eq!(near, vec![1]);
        assert_eq!(graph.nodes_within(Vec2::new(100.0, 100.0), 5.0).count(), 0);
    }

    #[test]
    fn test_empty_graph() {
        let mut graph = NavGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.prune_edges(), 0);
        assert_eq!(graph.total_cost(), 0.0);
        assert_eq!(graph.edges_from(0).count(), 0);
    }
}
