use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, reset_and_read_input);
    }
}

/// Held direction keys this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Turns held keys into a y-down movement axis and a facing.
///
/// Up beats down and left beats right when both are held. The horizontal
/// pair is read last, so on a diagonal the player faces sideways.
pub fn movement_from_keys(held: HeldDirections) -> (Vec2, Option<Facing>) {
    let mut axis = Vec2::ZERO;
    let mut facing = None;
    if held.up {
        axis.y = -1.0;
        facing = Some(Facing::Up);
    } else if held.down {
        axis.y = 1.0;
        facing = Some(Facing::Down);
    }
    if held.left {
        axis.x = -1.0;
        facing = Some(Facing::Left);
    } else if held.right {
        axis.x = 1.0;
        facing = Some(Facing::Right);
    }
    (axis, facing)
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    state: Res<State<GameState>>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match state.get() {
        GameState::Select => {
            input.select_prev = keys.just_pressed(KeyCode::ArrowLeft);
            input.select_next = keys.just_pressed(KeyCode::ArrowRight);
            input.confirm =
                keys.just_pressed(bindings.interact) || keys.just_pressed(KeyCode::Space);
        }

        // Nothing to drive while the farm builds.
        GameState::LoadingFarm => {}

        GameState::Playing => {
            let held = HeldDirections {
                up: keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp),
                down: keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown),
                left: keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft),
                right: keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight),
            };
            let (axis, facing) = movement_from_keys(held);
            input.move_axis = axis;
            input.facing = facing;

            input.use_tool = keys.just_pressed(bindings.use_tool);
            input.use_seed = keys.just_pressed(bindings.use_seed);
            input.interact = keys.just_pressed(bindings.interact);

            input.tool_next = keys.just_pressed(bindings.tool_next);
            input.tool_prev = keys.just_pressed(bindings.tool_prev);
            input.seed_next = keys.just_pressed(bindings.seed_next);
            input.seed_prev = keys.just_pressed(bindings.seed_prev);

            input.toggle_inventory = keys.just_pressed(bindings.inventory);
            input.toggle_help = keys.just_pressed(bindings.help);
            input.back = keys.just_pressed(bindings.back);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_keys_move_y_down() {
        let (axis, facing) = movement_from_keys(HeldDirections {
            up: true,
            ..default()
        });
        assert_eq!(axis, Vec2::new(0.0, -1.0));
        assert_eq!(facing, Some(Facing::Up));
    }

    #[test]
    fn diagonals_face_sideways() {
        let (axis, facing) = movement_from_keys(HeldDirections {
            down: true,
            right: true,
            ..default()
        });
        assert_eq!(axis, Vec2::new(1.0, 1.0));
        assert_eq!(facing, Some(Facing::Right));
    }

    #[test]
    fn opposite_keys_prefer_up_and_left() {
        let (axis, facing) = movement_from_keys(HeldDirections {
            up: true,
            down: true,
            left: true,
            right: true,
        });
        assert_eq!(axis, Vec2::new(-1.0, -1.0));
        assert_eq!(facing, Some(Facing::Left));
    }

    #[test]
    fn nothing_held_keeps_facing() {
        assert_eq!(movement_from_keys(HeldDirections::default()), (Vec2::ZERO, None));
    }
}
