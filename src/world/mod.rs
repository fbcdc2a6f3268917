//! World domain plugin for Farmstead.
//!
//! Responsible for:
//! - The static farm geometry (`WorldGrid`): bounds, obstacles, plot rects
//! - Loading TMX maps and inferring obstacles from a painted background
//! - Trees, fruit drops and their fading particles

use bevy::prelude::*;
use std::path::Path;

use crate::config::GameConfig;
use crate::shared::*;

pub mod inference;
pub mod maps;
pub mod objects;

use maps::MapData;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldGrid>()
            .add_systems(OnEnter(GameState::Playing), objects::spawn_trees)
            .add_systems(
                Update,
                (objects::tick_particles, objects::collect_tree_items)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (objects::sync_tree_sprites, objects::sync_particle_sprites)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// QUERIES
// ═══════════════════════════════════════════════════════════════════════

impl WorldGrid {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    /// World rectangle of a plot: offset + grid coordinate × tile size.
    pub fn plot_rect(&self, plot: &Plot) -> Rect {
        let min = self.plot_offset + Vec2::new(plot.x as f32, plot.y as f32) * self.tile_size;
        Rect::from_corners(min, min + Vec2::splat(self.tile_size))
    }

    /// Intersection of `rect` with the world bounds.
    pub fn clamp_to_world(&self, rect: Rect) -> Rect {
        rect.intersect(self.bounds())
    }

    /// First trigger zone overlapping `hitbox`.
    pub fn zone_touching(&self, hitbox: Rect) -> Option<&InteractionZone> {
        self.zones.iter().find(|z| rects_overlap(z.rect, hitbox))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTRUCTION
// ═══════════════════════════════════════════════════════════════════════

/// Geometry inputs gathered by the farm loader.
#[derive(Debug, Default)]
pub struct WorldSources<'a> {
    pub map: Option<&'a MapData>,
    /// Size of the painted background, when one was decoded.
    pub background_size: Option<Vec2>,
    pub inferred: Vec<Rect>,
}

/// Builds the world for a farm.
///
/// The size is the largest of the plot extents, the configured fallback,
/// the map and the background. Obstacles are the map's collision rects,
/// the hand-authored voids and inferred cells, clipped to the world; empty
/// leftovers are dropped. Tree hitboxes change when a tree falls, so the
/// movement resolver reads them live.
pub fn build_world_grid(config: &GameConfig, plots: &[Plot], sources: WorldSources) -> WorldGrid {
    let world = &config.world;
    let tile = world.tile_size;
    let offset = Vec2::new(world.plot_offset.0, world.plot_offset.1);

    let (cols, rows) = if plots.is_empty() {
        (3, 3)
    } else {
        (
            plots.iter().map(|p| p.x).max().unwrap_or(0) + 1,
            plots.iter().map(|p| p.y).max().unwrap_or(0) + 1,
        )
    };
    let mut size = offset + Vec2::new(cols as f32, rows as f32) * tile;
    size = size.max(Vec2::new(world.fallback_size.0, world.fallback_size.1));
    if let Some(map) = sources.map {
        size = size.max(Vec2::new(map.width, map.height));
    }
    if let Some(background) = sources.background_size {
        size = size.max(background);
    }

    let bounds = Rect::new(0.0, 0.0, size.x, size.y);
    let configured = world
        .obstacle_rects
        .iter()
        .map(|&(x, y, w, h)| rect_xywh(x, y, w, h));
    let map_rects = sources.map.map(|m| m.collision.clone()).unwrap_or_default();
    let obstacles: Vec<Rect> = map_rects
        .into_iter()
        .chain(configured)
        .chain(sources.inferred)
        .map(|r| r.intersect(bounds))
        .filter(|r| !r.is_empty())
        .collect();

    let player = Vec2::splat(config.player.size);
    let requested = world
        .player_spawn
        .map(|(x, y)| Vec2::new(x, y))
        .or_else(|| sources.map.and_then(|m| m.start))
        .unwrap_or(size / 2.0);
    let spawn = requested.clamp(Vec2::ZERO, (size - player).max(Vec2::ZERO));

    WorldGrid {
        tile_size: tile,
        width: size.x,
        height: size.y,
        plot_offset: offset,
        obstacles,
        spawn,
        zones: sources.map.map(|m| m.zones.clone()).unwrap_or_default(),
    }
}

/// Loads the configured map, if any. A missing file is not an error.
pub fn load_map(config: &GameConfig) -> Result<Option<MapData>, FarmError> {
    let Some(path) = config.world.map_path.as_deref() else {
        return Ok(None);
    };
    let path = Path::new(path);
    if !path.exists() {
        warn!("[World] Map {} not found, using configured geometry", path.display());
        return Ok(None);
    }
    maps::load_tmx(path).map(Some)
}
