use bevy::prelude::*;

use crate::config::{GameConfig, PlayerConfig};
use crate::shared::*;

/// Cycle the equipped tool (Q/E) and seed (Z/X). Local index rotation only.
pub fn tool_cycle(
    input: Res<PlayerInput>,
    mut query: Query<&mut PlayerControl, With<Player>>,
    mut toasts: EventWriter<ToastEvent>,
) {
    let Ok(mut control) = query.get_single_mut() else {
        return;
    };

    let tool_step = input.tool_next as i32 - input.tool_prev as i32;
    if tool_step != 0 {
        control.tool_index = cycle_index(control.tool_index, TOOL_ORDER.len(), tool_step);
        toasts.send(ToastEvent::new(format!("Tool: {}", control.tool().name())));
    }

    let seed_step = input.seed_next as i32 - input.seed_prev as i32;
    if seed_step != 0 {
        control.seed_index = cycle_index(control.seed_index, SEED_ORDER.len(), seed_step);
        toasts.send(ToastEvent::new(format!("Seed: {}", control.seed().keyword())));
    }
}

/// The point a tool or seed acts on: hitbox centre plus the facing offset.
pub fn tool_target(body: &PlayerBody, config: &PlayerConfig) -> Vec2 {
    body.hitbox.center() + config.tool_offset(body.facing)
}

/// Starts a swing. Movement input is ignored until the timer finishes.
pub fn start_swing(control: &mut PlayerControl, config: &GameConfig) {
    control.tool_timer = Timer::from_seconds(config.player.tool_secs, TimerMode::Once);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_both_ways() {
        let mut control = PlayerControl::default();
        assert_eq!(control.tool(), Tool::Hoe);
        control.tool_index = cycle_index(control.tool_index, TOOL_ORDER.len(), -1);
        assert_eq!(control.tool(), Tool::WateringCan);
        control.tool_index = cycle_index(control.tool_index, TOOL_ORDER.len(), 1);
        assert_eq!(control.tool(), Tool::Hoe);
        control.seed_index = cycle_index(control.seed_index, SEED_ORDER.len(), 3);
        assert_eq!(control.seed(), SeedKind::Tomato);
    }

    #[test]
    fn swing_blocks_until_the_timer_runs_out() {
        let config = GameConfig::default();
        let mut control = PlayerControl::default();
        assert!(!control.using_tool());
        start_swing(&mut control, &config);
        assert!(control.using_tool());
        control.tool_timer.tick(std::time::Duration::from_millis(200));
        assert!(control.using_tool());
        control.tool_timer.tick(std::time::Duration::from_millis(200));
        assert!(!control.using_tool());
    }

    #[test]
    fn target_sits_in_front_of_the_hitbox() {
        let config = PlayerConfig::default();
        let mut body = PlayerBody::spawn_at(Vec2::ZERO, &config);
        body.facing = Facing::Right;
        assert_eq!(tool_target(&body, &config), Vec2::new(64.0 + 115.0, 64.0 + 12.0));
    }
}
