//! Interaction dispatcher.
//!
//! Space uses the equipped tool on whatever sits under the tool target,
//! left Ctrl sows the selected seed there, and Enter triggers the zone the
//! player stands in (bed, trader, ...) or the nearby plot.

use bevy::prelude::*;

use super::tools::{start_swing, tool_target};
use crate::config::GameConfig;
use crate::shared::*;
use crate::world::objects::emit_damage_effects;

/// What lies under the tool target point. Plots win over trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTarget {
    Plot { id: PlotId, status: PlotStatus },
    Tree(Entity),
    Nothing,
}

/// The single effect a tool use resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCommand {
    Plot(PlotId, PlotAction),
    ChopTree(Entity),
    /// The axe found nothing it can work on.
    NotApplicable,
    Nothing,
}

pub const AXE_NOT_APPLICABLE: &str = "Axe can be used only on mature or withered crops";

pub fn resolve_target<'a>(
    point: Vec2,
    session: &FarmSession,
    grid: &WorldGrid,
    trees: impl IntoIterator<Item = (Entity, &'a Tree)>,
) -> ToolTarget {
    if let Some(plot) = session
        .plots
        .iter()
        .find(|plot| rect_contains(grid.plot_rect(plot), point))
    {
        return ToolTarget::Plot {
            id: plot.id,
            status: plot.status,
        };
    }
    trees
        .into_iter()
        .find(|(_, tree)| rect_contains(tree.hitbox, point))
        .map_or(ToolTarget::Nothing, |(entity, _)| ToolTarget::Tree(entity))
}

pub fn route_tool(tool: Tool, target: ToolTarget) -> ToolCommand {
    match (tool, target) {
        (Tool::WateringCan, ToolTarget::Plot { id, .. }) => ToolCommand::Plot(id, PlotAction::Water),
        (Tool::Hoe, ToolTarget::Plot { id, .. }) => ToolCommand::Plot(id, PlotAction::Fertilize),
        (Tool::Axe, ToolTarget::Plot { id, status }) => match status {
            PlotStatus::Mature => ToolCommand::Plot(id, PlotAction::Harvest),
            PlotStatus::Withered => ToolCommand::Plot(id, PlotAction::ClearWithered),
            PlotStatus::Empty | PlotStatus::Growing => ToolCommand::NotApplicable,
        },
        (Tool::Axe, ToolTarget::Tree(entity)) => ToolCommand::ChopTree(entity),
        (Tool::Axe, ToolTarget::Nothing) => ToolCommand::NotApplicable,
        (Tool::WateringCan | Tool::Hoe, ToolTarget::Tree(_) | ToolTarget::Nothing) => {
            ToolCommand::Nothing
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Space: equipped tool
// ─────────────────────────────────────────────────────────────────────────────

pub fn dispatch_tool_use(
    mut commands: Commands,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    session: Res<FarmSession>,
    mut rng: ResMut<SimRng>,
    mut player: Query<(&PlayerBody, &mut PlayerControl), With<Player>>,
    mut trees: Query<(Entity, &mut Tree)>,
    mut plot_actions: EventWriter<PlotActionEvent>,
    mut collected: EventWriter<ItemCollectedEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if !input.use_tool {
        return;
    }
    let Ok((body, mut control)) = player.get_single_mut() else {
        return;
    };
    if control.asleep || control.using_tool() {
        return;
    }

    let point = tool_target(body, &config.player);
    let target = resolve_target(point, &session, &grid, trees.iter());
    let tool = control.tool();

    match route_tool(tool, target) {
        ToolCommand::Plot(plot, action) => {
            plot_actions.send(PlotActionEvent { plot, action });
        }
        ToolCommand::ChopTree(entity) => {
            if let Ok((_, mut tree)) = trees.get_mut(entity) {
                let outcome = tree.damage(&mut rng.0, &config.environment);
                emit_damage_effects(
                    &mut commands,
                    &tree,
                    outcome,
                    &config.environment,
                    &mut collected,
                );
            }
        }
        ToolCommand::NotApplicable => {
            toasts.send(ToastEvent::new(AXE_NOT_APPLICABLE));
        }
        ToolCommand::Nothing => {}
    }

    start_swing(&mut control, &config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Left Ctrl: selected seed
// ─────────────────────────────────────────────────────────────────────────────

pub fn dispatch_seed_use(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    session: Res<FarmSession>,
    mut player: Query<(&PlayerBody, &mut PlayerControl), With<Player>>,
    mut plot_actions: EventWriter<PlotActionEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if !input.use_seed {
        return;
    }
    let Ok((body, mut control)) = player.get_single_mut() else {
        return;
    };
    if control.asleep || control.using_tool() {
        return;
    }

    let point = tool_target(body, &config.player);
    match resolve_target(point, &session, &grid, std::iter::empty()) {
        ToolTarget::Plot { id, .. } => {
            plot_actions.send(PlotActionEvent {
                plot: id,
                action: PlotAction::Sow(control.seed()),
            });
        }
        ToolTarget::Tree(_) | ToolTarget::Nothing => {
            toasts.send(ToastEvent::new(
                "No soil ahead, but you swung the seeds anyway.",
            ));
        }
    }
    start_swing(&mut control, &config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Enter: zones, then the nearby plot
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Sleep,
    AlreadyAsleep,
    Trader,
    Zone(String),
    Plot(PlotId),
    Nothing,
}

pub fn resolve_trigger(
    zone: Option<&InteractionZone>,
    selected: Option<PlotId>,
    asleep: bool,
) -> Trigger {
    match zone {
        Some(zone) => match zone.name.to_lowercase().as_str() {
            "bed" if asleep => Trigger::AlreadyAsleep,
            "bed" => Trigger::Sleep,
            "trader" => Trigger::Trader,
            _ => Trigger::Zone(zone.name.clone()),
        },
        None => selected.map_or(Trigger::Nothing, Trigger::Plot),
    }
}

pub fn dispatch_trigger(
    input: Res<PlayerInput>,
    grid: Res<WorldGrid>,
    selected: Res<SelectedPlot>,
    mut fade: ResMut<SleepFade>,
    mut player: Query<(&PlayerBody, &mut PlayerControl), With<Player>>,
    mut plot_actions: EventWriter<PlotActionEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    if !input.interact {
        return;
    }
    let Ok((body, mut control)) = player.get_single_mut() else {
        return;
    };

    match resolve_trigger(grid.zone_touching(body.hitbox), selected.plot, control.asleep) {
        Trigger::Sleep => {
            control.asleep = true;
            *fade = SleepFade {
                active: true,
                darkening: true,
                level: 0.0,
            };
            info!("[Player] Going to bed");
            toasts.send(ToastEvent::new("Going to bed..."));
        }
        Trigger::AlreadyAsleep => {}
        Trigger::Trader => {
            toasts.send(ToastEvent::new("Trader is not available yet."));
        }
        Trigger::Zone(name) => {
            toasts.send(ToastEvent::new(format!("Interacted with {name}")));
        }
        Trigger::Plot(plot) if !control.asleep => {
            plot_actions.send(PlotActionEvent {
                plot,
                action: PlotAction::Interact,
            });
        }
        Trigger::Plot(_) => {}
        Trigger::Nothing => {
            toasts.send(ToastEvent::new("Nothing to interact with here."));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nearby plot
// ─────────────────────────────────────────────────────────────────────────────

pub fn interaction_hint(status: PlotStatus) -> &'static str {
    match status {
        PlotStatus::Empty => "[Enter] Plant Crop",
        PlotStatus::Growing => "[Enter] Check Growth",
        PlotStatus::Mature => "[Enter] Harvest Crop",
        PlotStatus::Withered => "[Enter] Clear Withered",
    }
}

/// The plot touching the hitbox grown by `reach`, closest centre first.
pub fn nearest_plot(hitbox: Rect, reach: f32, session: &FarmSession, grid: &WorldGrid) -> Option<PlotId> {
    let zone = inflate_rect(hitbox, reach, reach);
    let center = hitbox.center();
    session
        .plots
        .iter()
        .map(|plot| (plot, grid.plot_rect(plot)))
        .filter(|(_, rect)| rects_overlap(zone, *rect))
        .map(|(plot, rect)| (plot.id, rect.center().distance_squared(center)))
        .fold(None, |best: Option<(PlotId, f32)>, (id, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((id, dist)),
        })
        .map(|(id, _)| id)
}

pub fn select_nearby_plot(
    config: Res<GameConfig>,
    grid: Res<WorldGrid>,
    session: Res<FarmSession>,
    player: Query<&PlayerBody, With<Player>>,
    mut selected: ResMut<SelectedPlot>,
) {
    let Ok(body) = player.get_single() else {
        return;
    };
    let plot = nearest_plot(body.hitbox, config.player.reach, &session, &grid);
    let next = SelectedPlot {
        plot,
        hint: plot
            .and_then(|id| session.plot(id))
            .map(|p| interaction_hint(p.status)),
    };
    selected.set_if_neq(next);
}
