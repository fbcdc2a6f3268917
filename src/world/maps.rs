//! Tiled (TMX) map loading.
//!
//! Only the parts the simulation needs are read: the map size, the
//! `collision` object group, tree placements from `Trees`, and the spawn
//! point plus trigger zones from `Player`. Tile and image layers are left
//! to the renderer.

use bevy::prelude::*;
use roxmltree::{Document, Node};
use std::fs;
use std::path::Path;

use crate::shared::*;

/// Simulation-relevant content of one map file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub width: f32,
    pub height: f32,
    pub collision: Vec<Rect>,
    pub trees: Vec<TreePlacement>,
    /// Top-left of the player sprite from the `Start` object.
    pub start: Option<Vec2>,
    pub zones: Vec<InteractionZone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreePlacement {
    pub kind: TreeKind,
    /// Bottom-left corner of the tree sprite, as Tiled anchors tile objects.
    pub anchor: Vec2,
    /// Size from the map object, when it carries one.
    pub size: Option<Vec2>,
}

impl TreePlacement {
    /// Top-left corner of a sprite of `size` standing on the anchor.
    pub fn top_left(&self, size: Vec2) -> Vec2 {
        Vec2::new(self.anchor.x, self.anchor.y - size.y)
    }
}

pub fn load_tmx(path: &Path) -> Result<MapData, FarmError> {
    let text = fs::read_to_string(path)
        .map_err(|e| FarmError::AssetMissing(format!("{}: {e}", path.display())))?;
    parse_tmx(&text)
}

pub fn parse_tmx(text: &str) -> Result<MapData, FarmError> {
    let doc = Document::parse(text).map_err(|e| FarmError::SceneLoad(format!("bad TMX: {e}")))?;
    let root = doc.root_element();
    if !root.has_tag_name("map") {
        return Err(FarmError::SceneLoad("TMX root is not <map>".into()));
    }

    let tiles_w = attr_f32(root, "width").unwrap_or(0.0);
    let tiles_h = attr_f32(root, "height").unwrap_or(0.0);
    let tile_w = attr_f32(root, "tilewidth").unwrap_or(0.0);
    let tile_h = attr_f32(root, "tileheight").unwrap_or(0.0);

    let mut map = MapData {
        width: tiles_w * tile_w,
        height: tiles_h * tile_h,
        ..default()
    };

    for layer in root
        .children()
        .filter(|n| n.has_tag_name("objectgroup"))
    {
        read_object_group(layer, &mut map);
    }

    Ok(map)
}

fn read_object_group(layer: Node, map: &mut MapData) {
    let layer_name = layer.attribute("name").unwrap_or("");
    let objects = layer.children().filter(|n| n.has_tag_name("object"));

    if layer_name.eq_ignore_ascii_case("collision") {
        for obj in objects {
            let (x, y) = position(obj);
            let w = attr_f32(obj, "width").unwrap_or(0.0);
            let h = attr_f32(obj, "height").unwrap_or(0.0);
            if w > 0.0 && h > 0.0 {
                map.collision.push(rect_xywh(x, y, w, h));
            }
        }
        return;
    }

    match layer_name {
        "Trees" => {
            for obj in objects {
                let name = obj.attribute("name").unwrap_or("Small");
                let Some(kind) = TreeKind::from_name(name) else {
                    warn!("[World] Skipping tree object with unknown kind '{}'", name);
                    continue;
                };
                let (x, y) = position(obj);
                let size = match (attr_f32(obj, "width"), attr_f32(obj, "height")) {
                    (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Vec2::new(w, h)),
                    _ => None,
                };
                map.trees.push(TreePlacement {
                    kind,
                    anchor: Vec2::new(x, y),
                    size,
                });
            }
        }
        "Player" => {
            for obj in objects {
                let name = obj.attribute("name").unwrap_or("").trim();
                let (x, y) = position(obj);
                if name.eq_ignore_ascii_case("start") {
                    map.start = Some(Vec2::new(x, y));
                } else if !name.is_empty() {
                    let w = attr_f32(obj, "width").filter(|w| *w > 0.0).unwrap_or(1.0);
                    let h = attr_f32(obj, "height").filter(|h| *h > 0.0).unwrap_or(1.0);
                    map.zones.push(InteractionZone {
                        name: name.to_string(),
                        rect: rect_xywh(x, y, w, h),
                    });
                }
            }
        }
        _ => {}
    }
}

fn position(node: Node) -> (f32, f32) {
    (
        attr_f32(node, "x").unwrap_or(0.0),
        attr_f32(node, "y").unwrap_or(0.0),
    )
}

fn attr_f32(node: Node, name: &str) -> Option<f32> {
    node.attribute(name).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="50" height="40" tilewidth="64" tileheight="64">
 <imagelayer id="1" name="Ground">
  <image source="graphics/world/ground.png" width="3200" height="2560"/>
 </imagelayer>
 <objectgroup id="2" name="Collision">
  <object id="1" x="0" y="0" width="3200" height="64"/>
  <object id="2" x="10" y="10"/>
 </objectgroup>
 <objectgroup id="3" name="Trees">
  <object id="3" name="Large" gid="12" x="500" y="700" width="96" height="112"/>
  <object id="4" name="Small" gid="13" x="300" y="400"/>
  <object id="5" name="Bush" gid="14" x="1" y="1"/>
 </objectgroup>
 <objectgroup id="4" name="Player">
  <object id="6" name="Start" x="1400" y="1200"/>
  <object id="7" name="Bed" x="1000" y="900" width="80" height="60"/>
  <object id="8" name="" x="0" y="0" width="5" height="5"/>
 </objectgroup>
</map>"#;

    #[test]
    fn reads_size_collision_trees_and_player_layer() {
        let map = parse_tmx(SAMPLE).unwrap();
        assert_eq!((map.width, map.height), (3200.0, 2560.0));
        assert_eq!(map.collision, vec![rect_xywh(0.0, 0.0, 3200.0, 64.0)]);

        assert_eq!(map.trees.len(), 2);
        assert_eq!(map.trees[0].kind, TreeKind::Large);
        assert_eq!(map.trees[0].top_left(Vec2::new(96.0, 112.0)), Vec2::new(500.0, 588.0));
        assert_eq!(map.trees[1].size, None);
        assert_eq!(map.trees[1].top_left(Vec2::new(64.0, 80.0)), Vec2::new(300.0, 320.0));

        assert_eq!(map.start, Some(Vec2::new(1400.0, 1200.0)));
        assert_eq!(map.zones.len(), 1);
        assert_eq!(map.zones[0].name, "Bed");
        assert_eq!(map.zones[0].rect, rect_xywh(1000.0, 900.0, 80.0, 60.0));
    }

    #[test]
    fn rejects_non_map_documents() {
        assert!(matches!(
            parse_tmx("<tileset/>"),
            Err(FarmError::SceneLoad(_))
        ));
        assert!(parse_tmx("not xml").is_err());
    }
}
