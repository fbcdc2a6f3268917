use bevy::prelude::*;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HudStatusText;

#[derive(Component)]
pub struct HudEquipText;

#[derive(Component)]
pub struct HudHintText;

#[derive(Component)]
pub struct HelpPanel;

#[derive(Component)]
pub struct InventoryPanelRoot;

#[derive(Component)]
pub struct InventoryListText;

const HELP_LINES: &[&str] = &[
    "Game Help [H]",
    "Movement: WASD or Arrow Keys",
    "Use Tool: Space",
    "Use Seed: Left Ctrl",
    "Interact / Sleep: Enter",
    "Open Inventory: I",
    "Return to Selection: ESC",
    "",
    "Q/E selects the tool, Z/X the seed.",
    "Hoe improves soil, water irrigates.",
    "Axe harvests, clears or chops trees.",
    "Sleep in bed to start the next day.",
];

// ═══════════════════════════════════════════════════════════════════════
// TEXT
// ═══════════════════════════════════════════════════════════════════════

pub fn status_line(session: &FarmSession, day: u32) -> String {
    format!(
        "Day {} | Player: {} (Lv.{}) | Farm: {} | Soil Quality: {}",
        day, session.player.name, session.player.level, session.farm.name, session.farm.soil_quality
    )
}

pub fn equip_line(control: &PlayerControl) -> String {
    format!(
        "Tool: {} [Q/E] | Seed: {} [Z/X]",
        control.tool().name(),
        control.seed().keyword()
    )
}

/// One line per held item, or a placeholder when the bag is empty.
pub fn inventory_lines(session: &FarmSession) -> String {
    if session.inventory.is_empty() {
        return "Inventory is empty.".to_string();
    }
    session
        .inventory
        .iter()
        .map(|item| format!("{} x{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join("\n")
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

fn text_bundle(text: impl Into<String>, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            // Top bar
            root.spawn((
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(0.0),
                    width: Val::Percent(100.0),
                    padding: UiRect::all(Val::Px(10.0)),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.78)),
            ))
            .with_children(|bar| {
                bar.spawn((HudStatusText, text_bundle("", 18.0, Color::WHITE)));
                bar.spawn((HudEquipText, text_bundle("", 14.0, Color::srgb(0.8, 0.8, 0.8))));
            });

            // Interaction hint
            root.spawn((
                HudHintText,
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(40.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                text_bundle("", 16.0, Color::WHITE),
                TextLayout::new_with_justify(JustifyText::Center),
            ));

            // Help
            root.spawn((
                HelpPanel,
                Node {
                    position_type: PositionType::Absolute,
                    right: Val::Px(20.0),
                    top: Val::Px(100.0),
                    width: Val::Px(400.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.86)),
                BorderColor(Color::BLACK),
            ))
            .with_children(|panel| {
                panel.spawn(text_bundle(HELP_LINES.join("\n"), 14.0, Color::BLACK));
            });

            // Inventory
            root.spawn((
                InventoryPanelRoot,
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Percent(30.0),
                    top: Val::Percent(20.0),
                    width: Val::Percent(40.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(8.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.9)),
                Visibility::Hidden,
            ))
            .with_children(|panel| {
                panel.spawn(text_bundle("Inventory [I]", 20.0, Color::srgb(1.0, 0.9, 0.5)));
                panel.spawn((InventoryListText, text_bundle("", 16.0, Color::WHITE)));
            });
        });
}

pub fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_status_text(
    session: Option<Res<FarmSession>>,
    day: Res<DayCounter>,
    mut query: Query<&mut Text, With<HudStatusText>>,
) {
    let Some(session) = session else {
        return;
    };
    let line = status_line(&session, day.day);
    for mut text in &mut query {
        if text.0 != line {
            text.0 = line.clone();
        }
    }
}

pub fn update_equip_text(
    player: Query<&PlayerControl, (With<Player>, Changed<PlayerControl>)>,
    mut query: Query<&mut Text, With<HudEquipText>>,
) {
    let Ok(control) = player.get_single() else {
        return;
    };
    let line = equip_line(control);
    for mut text in &mut query {
        text.0 = line.clone();
    }
}

pub fn update_hint_text(
    selected: Res<SelectedPlot>,
    mut query: Query<&mut Text, With<HudHintText>>,
) {
    if !selected.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = selected.hint.unwrap_or_default().to_string();
    }
}

pub fn update_panels(
    help: Res<HelpOverlay>,
    panel: Res<InventoryPanel>,
    session: Option<Res<FarmSession>>,
    mut help_query: Query<&mut Visibility, (With<HelpPanel>, Without<InventoryPanelRoot>)>,
    mut inventory_query: Query<&mut Visibility, (With<InventoryPanelRoot>, Without<HelpPanel>)>,
    mut list_query: Query<&mut Text, With<InventoryListText>>,
) {
    let shown = |on: bool| if on { Visibility::Inherited } else { Visibility::Hidden };
    for mut visibility in &mut help_query {
        visibility.set_if_neq(shown(help.visible));
    }
    for mut visibility in &mut inventory_query {
        visibility.set_if_neq(shown(panel.open));
    }
    if !panel.open {
        return;
    }
    let Some(session) = session else {
        return;
    };
    let lines = inventory_lines(&session);
    for mut text in &mut list_query {
        if text.0 != lines {
            text.0 = lines.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;
    use crate::store::MemoryStore;

    #[test]
    fn hud_lines_read_the_session() {
        let store = MemoryStore::new(data::starter_store_data());
        let mut session =
            FarmSession::load(&store, data::STARTER_PLAYER, data::STARTER_FARM).unwrap();
        assert_eq!(
            status_line(&session, 3),
            "Day 3 | Player: Farmer (Lv.1) | Farm: Sunny Acre | Soil Quality: 50"
        );
        assert_eq!(inventory_lines(&session), "Corn Seed x5\nTomato Seed x5");
        session.inventory.clear();
        assert_eq!(inventory_lines(&session), "Inventory is empty.");
        assert_eq!(
            equip_line(&PlayerControl::default()),
            "Tool: hoe [Q/E] | Seed: corn [Z/X]"
        );
    }
}
