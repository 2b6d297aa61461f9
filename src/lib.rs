//! # bevy_tilenav
//!
//! Tiled level parsing with collider and navigation graph synthesis for Bevy.
//!
//! This is a meta-crate that combines the `bevy_tilenav_*` sub-crates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_tilenav::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(BevyTilenavPlugin::default())
//!         .add_systems(Startup, load_level)
//!         .run();
//! }
//!
//! fn load_level(asset_server: Res<AssetServer>) {
//!     let _level: Handle<LevelAsset> = asset_server.load("levels/dungeon.tmx");
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Layer 1** ([`assets`]): `.tmx` parsing into a `LevelDocument`, and the asset loader
//! - **Layer 2** ([`core`]): projection, collider, navigation graph and the `synthesize` pipeline

pub mod plugin;

// Re-export sub-crates for advanced usage
pub use bevy_tilenav_assets as assets;
pub use bevy_tilenav_core as core;

/// Unified prelude for bevy_tilenav
pub mod prelude {
    pub use crate::assets::prelude::*;
    pub use crate::core::prelude::*;

    pub use crate::plugin::BevyTilenavPlugin;
}

pub use plugin::BevyTilenavPlugin;
