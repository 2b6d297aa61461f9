//! Synthesizes the collider and navigation graph of a small isometric level.
//!
//! This example shows:
//! - Parsing level text without the asset server
//! - Running the synthesis pipeline with a custom `SynthesisConfig`
//! - Reading nodes, edges and trigger areas from the result

use bevy::log::LogPlugin;
use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;
use bevy_tilenav_core::prelude::*;

const LEVEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="isometric" width="5" height="5" tilewidth="64" tileheight="32">
 <tileset firstgid="1" name="dungeon" tilewidth="64" tileheight="32" tilecount="2">
  <image source="dungeon.png" width="128" height="32"/>
  <tile id="1">
   <objectgroup draworder="index">
    <object id="1" x="0" y="0" width="64" height="32"/>
   </objectgroup>
  </tile>
 </tileset>
 <layer name="floor" width="5" height="5">
  <data encoding="csv">
1,1,1,1,1,
1,2,2,2,1,
1,1,1,2,1,
2,2,1,1,1,
1,1,1,2,1
</data>
 </layer>
 <objectgroup name="Triggers">
  <object id="10" name="stairs" type="exit" x="256" y="128" width="64" height="32"/>
 </objectgroup>
</map>
"#;

fn main() {
    let mut app = App::new();
    app.add_plugins(LogPlugin::default())
        .insert_resource(
            SynthesisConfig::default()
                .with_instance_transform(Affine2::from_translation(Vec2::new(0.0, 64.0))),
        )
        .add_systems(Startup, synthesize_level);
    app.update();
}

fn synthesize_level(config: Res<SynthesisConfig>) {
    let document = match parse_level(LEVEL) {
        Ok(document) => document,
        Err(err) => {
            error!("Failed to parse level: {err}");
            return;
        }
    };

    let artifacts = match synthesize(&document, &config) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            error!("Failed to synthesize level: {err}");
            return;
        }
    };

    info!(
        "{} solid rectangles, {} nodes, {} edges (total cost {:.1})",
        artifacts.collider.len(),
        artifacts.nav_graph.node_count(),
        artifacts.nav_graph.edge_count(),
        artifacts.nav_graph.total_cost()
    );

    for node in artifacts.nav_graph.nodes() {
        let degree = artifacts.nav_graph.edges_from(node.index).count();
        info!("  node {} at {} ({} edges)", node.index, node.position, degree);
    }

    for area in areas_in_group(&document, "Triggers", &config.instance_transform) {
        info!(
            "Trigger '{}' ({}) covers {:?}",
            area.name, area.object_type, area.rect
        );
        if let Some(node) = artifacts.nav_graph.nearest_node(area.rect.center()) {
            info!("  closest node: {} at {}", node.index, node.position);
        }
        if let Some(overlap) = artifacts.collider.intersects(area.rect) {
            warn!("  overlaps solid geometry over {:?}", overlap);
        }
    }
}
