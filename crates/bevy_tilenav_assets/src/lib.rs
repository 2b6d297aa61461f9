//! # `bevy_tilenav_assets`
//!
//! Layer 1 of `bevy_tilenav`: reads Tiled `.tmx` levels into a typed [`LevelDocument`].
//!
//! The document keeps everything collider and navigation synthesis needs (map header,
//! embedded tilesets with per-tile collision groups, tile layers and object groups) and
//! nothing about rendering.
//!
//! Parsing works without Bevy's asset server:
//!
//! ```
//! use bevy_tilenav_assets::prelude::*;
//!
//! let doc = parse_level(r#"<map orientation="isometric" width="4" height="4"
//!     tilewidth="64" tileheight="32"/>"#).unwrap();
//! assert_eq!(doc.orientation, Orientation::Isometric);
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod parser;
pub mod plugin;

pub mod prelude {
    //! Common imports for `bevy_tilenav_assets` users.

    pub use crate::document::{
        LevelDocument, MapObject, ObjectGroup, ObjectPolygon, Orientation, Property, TileLayer,
        TileLookup, TileMetadata, TileRef, Tileset, TilesetImage,
    };
    pub use crate::error::{GidOutOfRange, ParseError};
    pub use crate::loader::{LevelAsset, LevelAssetLoader, LevelLoaderError};
    pub use crate::parser::parse_level;
    pub use crate::plugin::TilenavAssetsPlugin;
}

pub use document::LevelDocument;
pub use plugin::TilenavAssetsPlugin;
