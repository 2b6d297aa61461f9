//! Named object areas (trigger volumes, spawn zones) in world space.

use bevy::math::Affine2;
use bevy::prelude::*;
use bevy_tilenav_assets::prelude::*;

use crate::collider::transform_rect;

/// A map object reduced to its world-space bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: u32,
    pub name: String,
    pub object_type: String,
    pub rect: Rect,
}

/// Every object in every map-level object group called `group_name`, in document order.
///
/// Object rectangles are authored in map pixels; `transform` places them in the world
/// (typically the map instance transform). Polygon objects contribute their bounding rectangle.
pub fn areas_in_group(document: &LevelDocument, group_name: &str, transform: &Affine2) -> Vec<Area> {
    let areas: Vec<Area> = document
        .object_groups
        .iter()
        .filter(|group| group.name == group_name)
        .flat_map(|group| &group.objects)
        .map(|object| Area {
            id: object.id,
            name: object.name.clone(),
            object_type: object.object_type.clone(),
            rect: transform_rect(transform, object.rect()),
        })
        .collect();

    if areas.is_empty() {
        debug!("No objects in group '{group_name}'");
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
<map orientation="orthogonal" width="4" height="4" tilewidth="16" tileheight="16">
 <objectgroup name="Triggers">
  <object id="1" name="exit" type="door" x="0" y="16" width="16" height="32"/>
 </objectgroup>
 <objectgroup name="Spawns">
  <object id="2" name="hero" x="8" y="8"/>
 </objectgroup>
 <objectgroup name="Triggers">
  <object id="3" name="trap" class="hazard" x="32" y="32" width="8" height="8"/>
 </objectgroup>
</map>"#;

    #[test]
    fn test_areas_collect_matching_groups() {
        let doc = parse_level(LEVEL).unwrap();
        let areas = areas_in_group(&doc, "Triggers", &Affine2::IDENTITY);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].name, "exit");
        assert_eq!(areas[0].object_type, "door");
        assert_eq!(areas[0].rect, Rect::new(0.0, 16.0, 16.0, 48.0));
        assert_eq!(areas[1].id, 3);
        assert_eq!(areas[1].object_type, "hazard");
    }

    #[test]
    fn test_areas_follow_transform() {
        let doc = parse_level(LEVEL).unwrap();
        let areas = areas_in_group(&doc, "Spawns", &Affine2::from_translation(Vec2::new(10.0, 0.0)));
        assert_eq!(areas[0].rect, Rect::new(18.0, 8.0, 18.0, 8.0));
        assert!(areas_in_group(&doc, "Missing", &Affine2::IDENTITY).is_empty());
    }
}
