//! # `bevy_tilenav_core`
//!
//! Layer 2 of `bevy_tilenav`: turns a parsed [`LevelDocument`](bevy_tilenav_assets::LevelDocument)
//! into the runtime artifacts gameplay needs.
//!
//! ## Pipeline
//!
//! 1. **Projection** ([`projection`]): tile units → world pixels for orthogonal or isometric maps
//! 2. **Collider** ([`collider`]): tile-space solid rectangles from per-tile collision objects,
//!    queried in world space through the level transform
//! 3. **Navigation** ([`navigation`]): flood fill of open cells into a costed [`graph::NavGraph`]
//! 4. **Pruning** ([`graph::NavGraph::prune_edges`]): drop edges that a shorter detour dominates
//!
//! [`synthesis::synthesize`] runs all of it in one call. The artifacts are built once per level
//! and never mutated afterwards; shortest-path queries are left to the consumer.
//!
//! **This crate does NOT spawn entities or render** - it only produces data.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_tilenav_assets::prelude::*;
//! use bevy_tilenav_core::prelude::*;
//!
//! fn build_level(levels: Res<Assets<LevelAsset>>, config: Res<SynthesisConfig>) {
//!     for (_, level) in levels.iter() {
//!         match synthesize(&level.document, &config) {
//!             Ok(artifacts) => info!("{} walkable nodes", artifacts.nav_graph.node_count()),
//!             Err(err) => error!("{err}"),
//!         }
//!     }
//! }
//! ```

pub mod areas;
pub mod collider;
pub mod config;
pub mod error;
pub mod graph;
pub mod navigation;
pub mod projection;
pub mod synthesis;

pub mod prelude {
    //! Common imports for `bevy_tilenav_core` users.

    pub use crate::areas::{Area, areas_in_group};
    pub use crate::collider::CompositeCollider;
    pub use crate::config::SynthesisConfig;
    pub use crate::error::{ProjectionError, SynthesisError};
    pub use crate::graph::{NavGraph, NavGraphEdge, NavGraphNode};
    pub use crate::navigation::NavGraphBuilder;
    pub use crate::projection::TileProjection;
    pub use crate::synthesis::{LevelArtifacts, synthesize};
}

pub use config::SynthesisConfig;
pub use synthesis::{LevelArtifacts, synthesize};
