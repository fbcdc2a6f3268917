use bevy::prelude::*;
use crate::shared::*;

/// Marker for the full-screen sleep fade.
#[derive(Component)]
pub struct ScreenFadeOverlay;

/// Spawn the fade overlay (always present, transparent when idle).
pub fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        ScreenFadeOverlay,
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::NONE),
        GlobalZIndex(100), // on top of everything
        PickingBehavior::IGNORE,
    ));
}

/// Mirrors the sleep fade level onto the overlay.
pub fn update_fade(
    fade: Res<SleepFade>,
    mut query: Query<&mut BackgroundColor, With<ScreenFadeOverlay>>,
) {
    if !fade.is_changed() {
        return;
    }
    let alpha = if fade.active { fade.level.clamp(0.0, 1.0) } else { 0.0 };
    for mut bg in &mut query {
        *bg = BackgroundColor(Color::srgba(0.0, 0.0, 0.0, alpha));
    }
}
