use bevy::prelude::*;

use crate::loader::{LevelAsset, LevelAssetLoader};

/// Plugin that registers the level asset type and its `.tmx` loader
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_tilenav_assets::TilenavAssetsPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(TilenavAssetsPlugin)
///     .run();
/// ```
///
/// # What this plugin does NOT do
///
/// - Collider or navigation synthesis (that's Layer 2 - `bevy_tilenav_core`)
/// - Rendering of any kind
///
/// This is a **Layer 1** plugin: pure asset loading with no ECS concerns.
pub struct TilenavAssetsPlugin;

impl Plugin for TilenavAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<LevelAsset>()
            .register_asset_loader(LevelAssetLoader);
    }
}
