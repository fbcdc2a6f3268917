//! Asset provider: scans the graphics folder once at startup and fills
//! `GameAssets`. Anything missing is logged and drawn as a placeholder.

use bevy::prelude::*;
use std::fs;
use std::path::Path;

use crate::config::GameConfig;
use crate::shared::*;

pub struct AssetsPlugin;

impl Plugin for AssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameAssets>()
            .add_systems(Startup, load_game_assets);
    }
}

/// Action suffixes per facing: walk, idle and one per tool.
const ACTION_SUFFIXES: [&str; 5] = ["", "_idle", "_axe", "_hoe", "_water"];

/// Static images: key and path under `graphics/`.
const STATIC_IMAGES: [(&str, &str); 8] = [
    ("tree_small", "objects/tree_small.png"),
    ("tree_large", "objects/tree_medium.png"),
    ("stump_small", "objects/stump_small.png"),
    ("stump_large", "objects/stump_medium.png"),
    ("apple", "fruit/apple.png"),
    ("axe", "overlay/axe.png"),
    ("hoe", "overlay/hoe.png"),
    ("water", "overlay/water.png"),
];

/// What exists on disk, as paths relative to the asset root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetManifest {
    pub animations: Vec<(String, Vec<String>)>,
    pub images: Vec<(String, String)>,
    pub missing: Vec<String>,
}

/// Every character action: `down`, `down_idle`, `down_axe`, ...
pub fn action_names() -> Vec<String> {
    [Facing::Down, Facing::Up, Facing::Left, Facing::Right]
        .iter()
        .flat_map(|facing| {
            ACTION_SUFFIXES
                .iter()
                .map(move |suffix| format!("{}{}", facing.name(), suffix))
        })
        .collect()
}

/// Sorted `.png` names in `dir`, or empty when the folder is unreadable.
fn sorted_pngs(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".png"))
        .collect();
    names.sort();
    names
}

/// Walks `{root}/graphics` for character frames, crop stages and objects.
pub fn scan_assets(root: &Path) -> AssetManifest {
    let mut manifest = AssetManifest::default();

    for action in action_names() {
        let rel = format!("graphics/character/{action}");
        let frames: Vec<String> = sorted_pngs(&root.join(&rel))
            .into_iter()
            .map(|name| format!("{rel}/{name}"))
            .collect();
        if frames.is_empty() {
            manifest.missing.push(action);
        } else {
            manifest.animations.push((action, frames));
        }
    }

    // Crop stages are numbered by sort order: corn_0, corn_1, ...
    for seed in SEED_ORDER {
        let rel = format!("graphics/fruit/{}", seed.keyword());
        let stages = sorted_pngs(&root.join(&rel));
        if stages.is_empty() {
            manifest.missing.push(seed.keyword().to_string());
        }
        for (stage, name) in stages.into_iter().enumerate() {
            manifest
                .images
                .push((format!("{}_{}", seed.keyword(), stage), format!("{rel}/{name}")));
        }
    }

    for (key, path) in STATIC_IMAGES {
        let rel = format!("graphics/{path}");
        if root.join(&rel).is_file() {
            manifest.images.push((key.to_string(), rel));
        } else {
            manifest.missing.push(key.to_string());
        }
    }

    manifest
}

fn load_game_assets(
    asset_server: Option<Res<AssetServer>>,
    config: Res<GameConfig>,
    mut assets: ResMut<GameAssets>,
) {
    let Some(asset_server) = asset_server else {
        warn!("[Assets] No asset server, drawing placeholders only");
        return;
    };
    let manifest = scan_assets(Path::new(&config.session.assets_root));

    for (action, frames) in manifest.animations {
        let handles = frames.into_iter().map(|path| asset_server.load(path)).collect();
        assets.animations.insert(action, handles);
    }
    for (key, path) in manifest.images {
        assets.images.insert(key, asset_server.load(path));
    }

    info!(
        "[Assets] Loaded {} animations, {} images",
        assets.animations.len(),
        assets.images.len()
    );
    if !manifest.missing.is_empty() {
        warn!(
            "[Assets] Missing, using placeholders: {}",
            manifest.missing.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    #[test]
    fn twenty_character_actions() {
        let names = action_names();
        assert_eq!(names.len(), 20);
        assert!(names.contains(&"right_water".to_string()));
        assert!(names.contains(&"up_idle".to_string()));
    }

    #[test]
    fn scan_sorts_frames_and_reports_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "graphics/character/down/1.png");
        touch(root, "graphics/character/down/0.png");
        touch(root, "graphics/character/down/notes.txt");
        touch(root, "graphics/fruit/corn/0.png");
        touch(root, "graphics/fruit/corn/1.png");
        touch(root, "graphics/objects/tree_medium.png");

        let manifest = scan_assets(root);
        assert_eq!(
            manifest.animations,
            vec![(
                "down".to_string(),
                vec![
                    "graphics/character/down/0.png".to_string(),
                    "graphics/character/down/1.png".to_string(),
                ]
            )]
        );
        let keys: Vec<&str> = manifest.images.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["corn_0", "corn_1", "tree_large"]);
        assert!(manifest.missing.contains(&"down_idle".to_string()));
        assert!(manifest.missing.contains(&"tomato".to_string()));
        assert!(manifest.missing.contains(&"apple".to_string()));
    }

    #[test]
    fn missing_root_is_all_placeholders() {
        let manifest = scan_assets(Path::new("definitely/not/here"));
        assert!(manifest.animations.is_empty());
        assert!(manifest.images.is_empty());
        assert_eq!(manifest.missing.len(), 20 + 2 + STATIC_IMAGES.len());
    }
}
