use bevy::prelude::*;
use crate::session::{LoadFailure, SelectScreen};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct SelectScreenRoot;

#[derive(Component)]
pub struct SelectListText;

#[derive(Component)]
pub struct LoadingScreenRoot;

#[derive(Component)]
pub struct LoadingStatusText;

// ═══════════════════════════════════════════════════════════════════════
// TEXT
// ═══════════════════════════════════════════════════════════════════════

/// Player list with the highlighted entry marked, then its farms.
pub fn select_lines(screen: &SelectScreen) -> String {
    if screen.players.is_empty() {
        return "No active players.".to_string();
    }
    let mut lines: Vec<String> = screen
        .players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let marker = if i == screen.index { ">" } else { " " };
            format!("{marker} {} (Lv.{})", player.name, player.level)
        })
        .collect();
    lines.push(String::new());
    match screen.farms.first() {
        Some(farm) => lines.push(format!("Farm: {} | Soil Quality: {}", farm.name, farm.soil_quality)),
        None => lines.push("No farm yet.".to_string()),
    }
    if let Some(status) = &screen.status {
        lines.push(status.clone());
    }
    lines.join("\n")
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

fn full_screen(color: Color) -> (Node, BackgroundColor) {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(24.0),
            ..default()
        },
        BackgroundColor(color),
    )
}

pub fn spawn_select_screen(mut commands: Commands) {
    commands
        .spawn((SelectScreenRoot, full_screen(Color::srgb(0.12, 0.18, 0.08))))
        .with_children(|parent| {
            parent.spawn((
                Text::new("FARMSTEAD"),
                TextFont {
                    font_size: 52.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.5)),
            ));
            parent.spawn((
                SelectListText,
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                Text::new("[Left/Right] Choose player   [Enter] Enter farm"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.8, 0.6)),
            ));
        });
}

pub fn spawn_loading_screen(mut commands: Commands) {
    commands
        .spawn((LoadingScreenRoot, full_screen(Color::srgb(0.56, 0.93, 0.56))))
        .with_children(|parent| {
            parent.spawn((
                LoadingStatusText,
                Text::new("Loading Farm..."),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::srgb(0.0, 0.39, 0.0)),
            ));
        });
}

pub fn despawn_select_screen(mut commands: Commands, query: Query<Entity, With<SelectScreenRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn despawn_loading_screen(
    mut commands: Commands,
    query: Query<Entity, With<LoadingScreenRoot>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_select_text(
    screen: Res<SelectScreen>,
    mut query: Query<&mut Text, With<SelectListText>>,
) {
    let lines = select_lines(&screen);
    for mut text in &mut query {
        if text.0 != lines {
            text.0 = lines.clone();
        }
    }
}

pub fn update_loading_text(
    failure: Option<Res<LoadFailure>>,
    mut query: Query<&mut Text, With<LoadingStatusText>>,
) {
    let line = match failure {
        Some(failure) => format!("{}\nReturning to selection...", failure.message),
        None => "Loading Farm...".to_string(),
    };
    for mut text in &mut query {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_marks_the_highlighted_player() {
        let mut screen = SelectScreen::default();
        assert_eq!(select_lines(&screen), "No active players.");

        let player = |id, name: &str| PlayerRecord {
            id,
            name: name.into(),
            level: 2,
            active: true,
            ..Default::default()
        };
        screen.players = vec![player(1, "Ada"), player(2, "Rowan")];
        screen.index = 1;
        assert_eq!(
            select_lines(&screen),
            "  Ada (Lv.2)\n> Rowan (Lv.2)\n\nNo farm yet."
        );
    }
}
