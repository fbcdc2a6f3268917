use bevy::prelude::*;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Marker for the toast column (top-center of screen).
#[derive(Component)]
pub struct ToastContainer;

/// One text line per queue entry, by index.
#[derive(Component)]
pub struct ToastLine(pub usize);

// ═══════════════════════════════════════════════════════════════════════
// QUEUE
// ═══════════════════════════════════════════════════════════════════════

impl MessageQueue {
    pub fn push(&mut self, text: impl Into<String>, secs: f32) {
        self.entries.push(Message {
            text: text.into(),
            remaining: secs,
        });
    }

    /// Counts every entry down by `dt` and drops the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for entry in &mut self.entries {
            entry.remaining -= dt;
        }
        self.entries.retain(|entry| entry.remaining > 0.0);
    }
}

impl Message {
    /// Opacity: full until the last second, then fading out.
    pub fn alpha(&self) -> f32 {
        self.remaining.clamp(0.0, 1.0)
    }
}

pub fn queue_toasts(mut events: EventReader<ToastEvent>, mut queue: ResMut<MessageQueue>) {
    for event in events.read() {
        debug!("[UI] Toast: {}", event.message);
        queue.push(event.message.clone(), event.duration_secs);
    }
}

pub fn tick_messages(time: Res<Time>, mut queue: ResMut<MessageQueue>) {
    queue.tick(time.delta_secs());
}

// ═══════════════════════════════════════════════════════════════════════
// RENDER
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_toast_container(mut commands: Commands) {
    commands.spawn((
        ToastContainer,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(80.0),
            width: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(8.0),
            align_items: AlignItems::Center,
            ..default()
        },
        GlobalZIndex(50),
        PickingBehavior::IGNORE,
    ));
}

/// Rebuilds the column whenever the entry count changes, then fades lines.
pub fn sync_toast_lines(
    mut commands: Commands,
    queue: Res<MessageQueue>,
    container: Query<Entity, With<ToastContainer>>,
    mut lines: Query<(Entity, &ToastLine, &mut BackgroundColor, &Children)>,
    mut texts: Query<(&mut Text, &mut TextColor)>,
) {
    let Ok(container) = container.get_single() else {
        return;
    };

    if lines.iter().count() != queue.entries.len() {
        for (entity, ..) in &lines {
            commands.entity(entity).despawn_recursive();
        }
        for (index, entry) in queue.entries.iter().enumerate() {
            let line = commands
                .spawn((
                    ToastLine(index),
                    Node {
                        padding: UiRect::axes(Val::Px(10.0), Val::Px(5.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5 * entry.alpha())),
                    PickingBehavior::IGNORE,
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new(entry.text.clone()),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgba(1.0, 1.0, 1.0, entry.alpha())),
                        PickingBehavior::IGNORE,
                    ));
                })
                .id();
            commands.entity(container).add_child(line);
        }
        return;
    }

    for (_, line, mut background, children) in &mut lines {
        let Some(entry) = queue.entries.get(line.0) else {
            continue;
        };
        background.0 = Color::srgba(0.0, 0.0, 0.0, 0.5 * entry.alpha());
        for &child in children.iter() {
            if let Ok((mut text, mut color)) = texts.get_mut(child) {
                if text.0 != entry.text {
                    text.0 = entry.text.clone();
                }
                color.0 = Color::srgba(1.0, 1.0, 1.0, entry.alpha());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_in_order() {
        let mut queue = MessageQueue::default();
        queue.push("first", 2.0);
        queue.push("second", 3.0);
        queue.tick(1.5);
        assert_eq!(queue.entries.len(), 2);
        assert_eq!(queue.entries[0].alpha(), 0.5);
        queue.tick(0.5);
        assert_eq!(queue.entries.len(), 1);
        assert_eq!(queue.entries[0].text, "second");
        queue.tick(1.0);
        assert!(queue.entries.is_empty());
    }
}
