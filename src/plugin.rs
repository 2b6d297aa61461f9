//! Unified plugin for bevy_tilenav.

use bevy::prelude::*;

use bevy_tilenav_assets::TilenavAssetsPlugin;
use bevy_tilenav_core::SynthesisConfig;

/// Registers level loading and the synthesis configuration resource.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_tilenav::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         BevyTilenavPlugin::default()
///             .with_synthesis(SynthesisConfig::default().with_link_diagonals(false)),
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct BevyTilenavPlugin {
    /// Inserted as a resource for systems that synthesize loaded levels
    pub synthesis: SynthesisConfig,
}

impl BevyTilenavPlugin {
    pub fn with_synthesis(mut self, config: SynthesisConfig) -> Self {
        self.synthesis = config;
        self
    }
}

impl Plugin for BevyTilenavPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(TilenavAssetsPlugin)
            .insert_resource(self.synthesis);
        info!("bevy_tilenav initialized");
    }
}
