use bevy::prelude::*;

use crate::config::GameConfig;
use crate::shared::*;

/// Top-left of the view: player centred, clamped to the map. A map smaller
/// than the screen on an axis is centred on that axis (negative offset).
pub fn camera_offset(player_center: Vec2, map: Vec2, screen: Vec2) -> Vec2 {
    let axis = |center: f32, map: f32, screen: f32| -> f32 {
        if map < screen {
            (-(screen - map) / 2.0).floor()
        } else {
            (center - screen / 2.0).clamp(0.0, map - screen)
        }
    };
    Vec2::new(
        axis(player_center.x, map.x, screen.x),
        axis(player_center.y, map.y, screen.y),
    )
}

pub fn update_camera_offset(
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    player: Query<&PlayerBody, With<Player>>,
    mut offset: ResMut<CameraOffset>,
) {
    let Ok(body) = player.get_single() else {
        return;
    };
    let screen = Vec2::new(config.screen.width, config.screen.height);
    let next = camera_offset(
        body.sprite.center(),
        Vec2::new(grid.width, grid.height),
        screen,
    );
    offset.set_if_neq(CameraOffset(next));
}

/// Moves the 2D camera so the offset's view lands on screen.
pub fn follow_camera_offset(
    config: Res<GameConfig>,
    offset: Res<CameraOffset>,
    mut camera: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut transform) = camera.get_single_mut() else {
        return;
    };
    let screen = Vec2::new(config.screen.width, config.screen.height);
    let center = offset.0 + screen / 2.0;
    let z = transform.translation.z;
    transform.translation = world_to_render(center, z);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1024.0, 768.0);

    #[test]
    fn centres_on_the_player_inside_the_map() {
        let offset = camera_offset(Vec2::new(1600.0, 1200.0), Vec2::new(3200.0, 2560.0), SCREEN);
        assert_eq!(offset, Vec2::new(1088.0, 816.0));
    }

    #[test]
    fn clamps_at_the_map_edges() {
        let map = Vec2::new(3200.0, 2560.0);
        assert_eq!(camera_offset(Vec2::new(10.0, 10.0), map, SCREEN), Vec2::ZERO);
        assert_eq!(
            camera_offset(Vec2::new(3190.0, 2550.0), map, SCREEN),
            Vec2::new(3200.0 - 1024.0, 2560.0 - 768.0)
        );
    }

    #[test]
    fn small_maps_are_centred() {
        let offset = camera_offset(Vec2::new(100.0, 100.0), Vec2::new(800.0, 600.0), SCREEN);
        assert_eq!(offset, Vec2::new(-112.0, -84.0));
    }
}
