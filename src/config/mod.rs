//! Tunable constants, loaded from `assets/config.ron` at startup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shared::*;

pub const CONFIG_PATH: &str = "assets/config.ron";

#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub environment: EnvironmentConfig,
    pub farming: FarmingConfig,
    pub day_cycle: DayCycleConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub tile_size: f32,
    pub plot_offset: (f32, f32),
    /// Top-left of the player sprite. Overrides the map's `Start` object.
    pub player_spawn: Option<(f32, f32)>,
    /// Hand-authored voids as (x, y, w, h).
    pub obstacle_rects: Vec<(f32, f32, f32, f32)>,
    /// Lower bound on the world size when no map asset is available.
    pub fallback_size: (f32, f32),
    pub map_path: Option<String>,
    /// Flat painted background used for obstacle inference.
    pub background_path: Option<String>,
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Pixels with alpha at or below this count as transparent.
    pub alpha_threshold: u8,
    /// Cells whose opaque ratio is below this become obstacles.
    pub solid_ratio: f32,
    pub margin: f32,
    pub min_cell: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: f32,
    pub speed: f32,
    /// Hitbox shrink as a fraction of the sprite (width, height).
    pub hitbox_shrink: (f32, f32),
    /// Tool target offsets per facing, as fractions of the player size.
    pub tool_offset_up: (f32, f32),
    pub tool_offset_down: (f32, f32),
    pub tool_offset_left: (f32, f32),
    pub tool_offset_right: (f32, f32),
    pub tool_secs: f32,
    pub frame_secs: f32,
    /// Inflation of the hitbox used to pick the nearby plot.
    pub reach: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub tree_health: u32,
    pub apple_spawn_chance: f64,
    /// Fruit attach points relative to the tree's top-left corner.
    pub apple_positions_small: Vec<(f32, f32)>,
    pub apple_positions_large: Vec<(f32, f32)>,
    pub tree_size_small: (f32, f32),
    pub tree_size_large: (f32, f32),
    pub stump_size_small: (f32, f32),
    pub stump_size_large: (f32, f32),
    pub apple_size: f32,
    pub fruit_particle_secs: f32,
    pub stump_particle_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmingConfig {
    pub water_increment: u8,
    pub fertilizer_increment: u8,
    /// Simulated hours a Mature crop survives before withering. `None` disables.
    pub wither_after_hours: Option<f64>,
    /// Simulated hours per real second.
    pub hours_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayCycleConfig {
    pub rain_chance: f64,
    pub rain_water: u8,
    pub sleep_hours: f64,
    /// Fade progress per second for each half of the sleep transition.
    pub fade_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub store_path: String,
    pub load_fail_delay_secs: f32,
    pub assets_root: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            plot_offset: (800.0, 1500.0),
            player_spawn: Some((1600.0, 1800.0)),
            obstacle_rects: vec![
                (1350.0, 260.0, 420.0, 260.0),
                (1820.0, 1150.0, 320.0, 320.0),
                (460.0, 1380.0, 520.0, 520.0),
                (0.0, 1950.0, 1100.0, 610.0),
                (2050.0, 520.0, 320.0, 260.0),
            ],
            fallback_size: (3200.0, 2560.0),
            map_path: Some("assets/map.tmx".into()),
            background_path: None,
            inference: InferenceConfig::default(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 10,
            solid_ratio: 0.2,
            margin: 4.0,
            min_cell: 16,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 128.0,
            speed: 200.0,
            hitbox_shrink: (0.35, 0.5),
            tool_offset_up: (0.0, -0.70),
            tool_offset_down: (0.0, 0.90),
            tool_offset_left: (-0.9, 0.10),
            tool_offset_right: (0.9, 0.10),
            tool_secs: 0.35,
            frame_secs: 0.15,
            reach: 40.0,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tree_health: 5,
            apple_spawn_chance: 0.8,
            apple_positions_small: vec![
                (18.0, 17.0),
                (30.0, 37.0),
                (12.0, 50.0),
                (30.0, 45.0),
                (20.0, 30.0),
                (30.0, 10.0),
            ],
            apple_positions_large: vec![
                (30.0, 24.0),
                (60.0, 65.0),
                (50.0, 50.0),
                (16.0, 40.0),
                (45.0, 50.0),
                (42.0, 70.0),
            ],
            tree_size_small: (64.0, 80.0),
            tree_size_large: (96.0, 112.0),
            stump_size_small: (40.0, 24.0),
            stump_size_large: (56.0, 32.0),
            apple_size: 12.0,
            fruit_particle_secs: 0.3,
            stump_particle_secs: 0.4,
        }
    }
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            water_increment: 30,
            fertilizer_increment: 20,
            wither_after_hours: Some(48.0),
            hours_per_second: 1.0 / 60.0,
        }
    }
}

impl Default for DayCycleConfig {
    fn default() -> Self {
        Self {
            rain_chance: 0.35,
            rain_water: 25,
            sleep_hours: 8.0,
            fade_speed: 1.5,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: "saves/farm.json".into(),
            load_fail_delay_secs: 0.8,
            assets_root: "assets".into(),
        }
    }
}

impl PlayerConfig {
    /// Tool target offset in world pixels, truncated toward zero.
    pub fn tool_offset(&self, facing: Facing) -> Vec2 {
        let (rx, ry) = match facing {
            Facing::Up => self.tool_offset_up,
            Facing::Down => self.tool_offset_down,
            Facing::Left => self.tool_offset_left,
            Facing::Right => self.tool_offset_right,
        };
        Vec2::new((rx * self.size).trunc(), (ry * self.size).trunc())
    }
}

impl EnvironmentConfig {
    pub fn tree_size(&self, kind: TreeKind) -> Vec2 {
        let (w, h) = match kind {
            TreeKind::Small => self.tree_size_small,
            TreeKind::Large => self.tree_size_large,
        };
        Vec2::new(w, h)
    }

    pub fn stump_size(&self, kind: TreeKind) -> Vec2 {
        let (w, h) = match kind {
            TreeKind::Small => self.stump_size_small,
            TreeKind::Large => self.stump_size_large,
        };
        Vec2::new(w, h)
    }

    pub fn apple_positions(&self, kind: TreeKind) -> &[(f32, f32)] {
        match kind {
            TreeKind::Small => &self.apple_positions_small,
            TreeKind::Large => &self.apple_positions_large,
        }
    }
}

impl GameConfig {
    /// Parses RON text. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Reads `path`, falling back to defaults when it is absent or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => match Self::from_ron(&text) {
                Ok(config) => {
                    info!("[Config] Loaded {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("[Config] Invalid {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("[Config] No {} found, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults_for_missing_fields() {
        let config = GameConfig::from_ron("(day_cycle: (rain_chance: 1.0))").unwrap();
        assert_eq!(config.day_cycle.rain_chance, 1.0);
        assert_eq!(config.day_cycle.rain_water, 25);
        assert_eq!(config.world.tile_size, 64.0);
        assert_eq!(config.player.speed, 200.0);
    }

    #[test]
    fn tool_offsets_are_truncated_player_fractions() {
        let player = PlayerConfig::default();
        assert_eq!(player.tool_offset(Facing::Up), Vec2::new(0.0, -89.0));
        assert_eq!(player.tool_offset(Facing::Down), Vec2::new(0.0, 115.0));
        assert_eq!(player.tool_offset(Facing::Left), Vec2::new(-115.0, 12.0));
        assert_eq!(player.tool_offset(Facing::Right), Vec2::new(115.0, 12.0));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load_or_default("does/not/exist.ron");
        assert_eq!(config, GameConfig::default());
    }
}
