use bevy::prelude::*;

use crate::config::GameConfig;
use crate::shared::*;

// Frame counts used when no frame set is loaded for an action.
const FALLBACK_WALK_FRAMES: usize = 4;
const FALLBACK_IDLE_FRAMES: usize = 2;
const FALLBACK_TOOL_FRAMES: usize = 1;

impl PlayerAnimation {
    pub fn new(frame_secs: f32) -> Self {
        Self {
            action: Facing::Down.name().to_string() + "_idle",
            frame: 0,
            frame_timer: Timer::from_seconds(frame_secs, TimerMode::Repeating),
        }
    }
}

/// Action name keying the frame set: `down_axe` mid-swing, `left` while
/// walking, `up_idle` otherwise.
pub fn action_name(body: &PlayerBody, control: &PlayerControl) -> String {
    let dir = body.facing.name();
    if control.using_tool() {
        format!("{dir}_{}", control.tool().name())
    } else if body.moving {
        dir.to_string()
    } else {
        format!("{dir}_idle")
    }
}

fn fallback_frames(control: &PlayerControl, body: &PlayerBody) -> usize {
    if control.using_tool() {
        FALLBACK_TOOL_FRAMES
    } else if body.moving {
        FALLBACK_WALK_FRAMES
    } else {
        FALLBACK_IDLE_FRAMES
    }
}

/// Picks the action for this tick and advances its frame on the frame timer.
/// Switching action restarts at frame 0.
pub fn animate_player(
    time: Res<Time>,
    assets: Res<GameAssets>,
    mut query: Query<(&PlayerBody, &PlayerControl, &mut PlayerAnimation), With<Player>>,
) {
    for (body, control, mut anim) in &mut query {
        let action = if control.asleep {
            format!("{}_idle", body.facing.name())
        } else {
            action_name(body, control)
        };
        if anim.action != action {
            anim.action = action;
            anim.frame = 0;
            anim.frame_timer.reset();
            continue;
        }

        anim.frame_timer.tick(time.delta());
        if anim.frame_timer.just_finished() {
            let count = assets
                .frame_count(&anim.action)
                .unwrap_or_else(|| fallback_frames(control, body));
            anim.frame = (anim.frame + 1) % count.max(1);
        }
    }
}

/// Draws the current frame, or a facing-tinted square when the set is missing.
pub fn sync_player_sprite(
    assets: Res<GameAssets>,
    config: Res<GameConfig>,
    mut query: Query<(&PlayerBody, &PlayerAnimation, &mut Sprite, &mut Transform), With<Player>>,
    mut reported: Local<Vec<String>>,
) {
    for (body, anim, mut sprite, mut transform) in &mut query {
        transform.translation = world_to_render(body.sprite.center(), Z_MAIN + 0.5);
        sprite.custom_size = Some(Vec2::splat(config.player.size));

        match assets.frames(&anim.action) {
            Some(frames) => {
                sprite.image = frames[anim.frame % frames.len()].clone();
                sprite.color = Color::WHITE;
            }
            None => {
                if !reported.contains(&anim.action) {
                    warn!("[Player] No frames for action '{}', drawing placeholder", anim.action);
                    reported.push(anim.action.clone());
                }
                sprite.image = Handle::default();
                sprite.color = match body.facing {
                    Facing::Up => Color::srgb(0.2, 0.4, 0.8),
                    Facing::Down => Color::srgb(0.2, 0.5, 0.8),
                    Facing::Left => Color::srgb(0.25, 0.45, 0.75),
                    Facing::Right => Color::srgb(0.25, 0.5, 0.7),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::player::tools::start_swing;

    #[test]
    fn action_names_follow_state() {
        let mut body = PlayerBody::spawn_at(Vec2::ZERO, &PlayerConfig::default());
        let mut control = PlayerControl::default();
        body.facing = Facing::Left;
        assert_eq!(action_name(&body, &control), "left_idle");
        body.moving = true;
        assert_eq!(action_name(&body, &control), "left");
        control.tool_index = 1;
        start_swing(&mut control, &GameConfig::default());
        assert_eq!(action_name(&body, &control), "left_axe");
        control.tool_index = 2;
        assert_eq!(action_name(&body, &control), "left_water");
    }
}
