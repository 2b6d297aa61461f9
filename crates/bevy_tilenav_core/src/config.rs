//! Level synthesis configuration.

use bevy::math::Affine2;
use bevy::prelude::*;

/// Controls how collider and navigation artifacts are synthesized from a level.
///
/// # Example
///
/// ```
/// use bevy::math::Affine2;
/// use bevy::prelude::*;
/// use bevy_tilenav_core::config::SynthesisConfig;
///
/// let config = SynthesisConfig::default()
///     .with_instance_transform(Affine2::from_translation(Vec2::new(0.0, 240.0)))
///     .with_link_diagonals(false);
/// assert!(config.prune_edges);
/// ```
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SynthesisConfig {
    /// Placement of the map instance in the world, applied after the tile projection.
    ///
    /// Default: [`Affine2::IDENTITY`]
    pub instance_transform: Affine2,

    /// Remove dominated edges after the flood fill.
    ///
    /// Default: `true`
    pub prune_edges: bool,

    /// Link the four diagonal neighbors in addition to the cardinal ones.
    ///
    /// Default: `true`
    pub link_diagonals: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            instance_transform: Affine2::IDENTITY,
            prune_edges: true,
            link_diagonals: true,
        }
    }
}

impl SynthesisConfig {
    pub fn with_instance_transform(mut self, transform: Affine2) -> Self {
        self.instance_transform = transform;
        self
    }

    pub fn with_prune_edges(mut self, prune: bool) -> Self {
        self.prune_edges = prune;
        self
    }

    pub fn with_link_diagonals(mut self, link: bool) -> Self {
        self.link_diagonals = link;
        self
    }
}
