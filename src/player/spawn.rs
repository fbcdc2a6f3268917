use bevy::prelude::*;

use crate::config::GameConfig;
use crate::shared::*;

/// Spawn the player at the world's spawn point.
/// Runs once on `OnEnter(GameState::Playing)`.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn if returning to Playing state.
    if !existing.is_empty() {
        return;
    }

    let body = PlayerBody::spawn_at(grid.spawn, &config.player);
    info!("[Player] Spawned at ({}, {})", body.pos.x, body.pos.y);
    commands.spawn((
        Player,
        Sprite::from_color(Color::srgb(0.2, 0.5, 0.8), body.sprite.size()),
        Transform::from_translation(world_to_render(body.sprite.center(), Z_MAIN + 0.5)),
        body,
        PlayerControl::default(),
        PlayerAnimation::new(config.player.frame_secs),
        SessionEntity,
    ));
}
