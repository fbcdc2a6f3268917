use bevy::prelude::*;

use crate::config::{GameConfig, PlayerConfig};
use crate::shared::*;

impl PlayerBody {
    /// A body whose sprite's top-left corner sits at `top_left`.
    pub fn spawn_at(top_left: Vec2, config: &PlayerConfig) -> Self {
        let size = Vec2::splat(config.size);
        let sprite = Rect::from_corners(top_left, top_left + size);
        let shrink = Vec2::new(
            (size.x * config.hitbox_shrink.0).trunc(),
            (size.y * config.hitbox_shrink.1).trunc(),
        );
        let hitbox = inflate_rect(sprite, -shrink.x, -shrink.y);
        Self {
            sprite,
            hitbox,
            pos: hitbox.center(),
            facing: Facing::Down,
            moving: false,
        }
    }
}

/// Core movement system. Ticks the tool timer, then moves the player
/// against the world obstacles and the live tree hitboxes.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    trees: Query<&Tree>,
    mut query: Query<(&mut PlayerBody, &mut PlayerControl), With<Player>>,
) {
    let Ok((mut body, mut control)) = query.get_single_mut() else {
        return;
    };

    control.tool_timer.tick(time.delta());

    if control.asleep {
        body.moving = false;
        return;
    }

    // A tool swing freezes input-driven movement but not the resolver.
    let direction = if control.using_tool() {
        Vec2::ZERO
    } else {
        if let Some(facing) = input.facing {
            body.facing = facing;
        }
        input.move_axis
    };

    let obstacles: Vec<Rect> = grid
        .obstacles()
        .iter()
        .copied()
        .chain(trees.iter().map(|t| t.hitbox))
        .collect();

    step_body(
        &mut body,
        direction,
        config.player.speed * time.delta_secs(),
        &obstacles,
        grid.bounds(),
    );
}

/// Moves `body` by `distance` along `direction`, horizontal axis first.
///
/// Each axis is swept against every obstacle the hitbox spans on the other
/// axis. A blocked hitbox ends with its leading edge exactly on the obstacle
/// edge, and an obstacle it already overlaps pushes it back out on the side
/// it is moving towards. The sprite travels with the hitbox and never leaves
/// `world`.
pub fn step_body(
    body: &mut PlayerBody,
    direction: Vec2,
    distance: f32,
    obstacles: &[Rect],
    world: Rect,
) {
    let dir = direction.normalize_or_zero();
    body.moving = dir != Vec2::ZERO;

    if dir.x != 0.0 {
        let dx = world_limited(
            dir.x * distance,
            world.min.x - body.sprite.min.x,
            world.max.x - body.sprite.max.x,
        );
        let blocking = obstacles
            .iter()
            .filter(|o| spans_overlap(body.hitbox.min.y, body.hitbox.max.y, o.min.y, o.max.y))
            .map(|o| (o.min.x, o.max.x));
        let (min_x, max_x) = sweep_axis(body.hitbox.min.x, body.hitbox.max.x, dx, blocking);
        let shift = min_x - body.hitbox.min.x;
        body.hitbox.min.x = min_x;
        body.hitbox.max.x = max_x;
        body.sprite.min.x += shift;
        body.sprite.max.x += shift;
    }
    if dir.y != 0.0 {
        let dy = world_limited(
            dir.y * distance,
            world.min.y - body.sprite.min.y,
            world.max.y - body.sprite.max.y,
        );
        let blocking = obstacles
            .iter()
            .filter(|o| spans_overlap(body.hitbox.min.x, body.hitbox.max.x, o.min.x, o.max.x))
            .map(|o| (o.min.y, o.max.y));
        let (min_y, max_y) = sweep_axis(body.hitbox.min.y, body.hitbox.max.y, dy, blocking);
        let shift = min_y - body.hitbox.min.y;
        body.hitbox.min.y = min_y;
        body.hitbox.max.y = max_y;
        body.sprite.min.y += shift;
        body.sprite.max.y += shift;
    }

    // Sub-pixel rounding stays on the sprite; a real correction (a body that
    // started outside the world) moves the hitbox along with it.
    let clamped = clamp_rect_inside(body.sprite, world);
    let correction = clamped.min - body.sprite.min;
    body.sprite = clamped;
    if correction.abs().max_element() >= 0.5 {
        body.hitbox.min += correction;
        body.hitbox.max += correction;
    }
    body.pos = body.hitbox.center();
}

/// Caps a displacement so the sprite edge does not cross the world edge.
fn world_limited(delta: f32, room_before: f32, room_after: f32) -> f32 {
    if delta > 0.0 {
        delta.min(room_after.max(0.0))
    } else {
        delta.max(room_before.min(0.0))
    }
}

fn spans_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min < b_max && a_max > b_min
}

/// Moves the span `lo..hi` by `delta` against `obstacles` given as spans on
/// the same axis. Returns the new `(lo, hi)`; the leading edge is either the
/// unobstructed target or exactly an obstacle edge.
fn sweep_axis(
    lo: f32,
    hi: f32,
    delta: f32,
    obstacles: impl Iterator<Item = (f32, f32)>,
) -> (f32, f32) {
    if delta > 0.0 {
        let lead = obstacles
            .filter(|&(o_lo, o_hi)| o_hi > hi && o_lo < hi + delta)
            .fold(hi + delta, |lead, (o_lo, _)| lead.min(o_lo));
        (lo + (lead - hi), lead)
    } else if delta < 0.0 {
        let lead = obstacles
            .filter(|&(o_lo, o_hi)| o_lo < lo && o_hi > lo + delta)
            .fold(lo + delta, |lead, (_, o_hi)| lead.max(o_hi));
        (lead, hi + (lead - lo))
    } else {
        (lo, hi)
    }
}
