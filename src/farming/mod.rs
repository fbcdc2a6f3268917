//! Farming domain: planting, growth, maturity, watering, hoeing, harvest.
//!
//! Every operation writes to the store first and only then refreshes the
//! session view, so a failed write never shows up locally. Requests arrive
//! as `PlotActionEvent`s from the interaction dispatcher.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::shared::*;

pub mod crops;
pub mod harvest;
pub mod render;
pub mod soil;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::PlotEntities>()
            .add_event::<PlotActionEvent>()
            .add_systems(
                Update,
                (handle_plot_actions, tick_maturity)
                    .chain()
                    .run_if(in_state(GameState::Playing))
                    .run_if(simulation_running),
            )
            .add_systems(
                PostUpdate,
                render::sync_plot_sprites.run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnExit(GameState::Playing), render::clear_plot_entities);
    }
}

/// Runs one plot action against the store and returns the message to show.
pub fn apply_plot_action(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    config: &GameConfig,
    now: SimHours,
    plot_id: PlotId,
    action: PlotAction,
) -> Result<String, FarmError> {
    let farming = &config.farming;
    match action {
        PlotAction::Sow(seed) => crops::sow(store, session, plot_id, seed, now),
        PlotAction::Water => soil::water(store, session, plot_id, farming.water_increment),
        PlotAction::Fertilize => {
            soil::fertilize(store, session, plot_id, farming.fertilizer_increment)
        }
        PlotAction::Harvest => harvest::harvest(store, session, plot_id, now),
        PlotAction::ClearWithered => harvest::clear_withered(store, session, plot_id),
        PlotAction::Interact => {
            let status = session
                .plot(plot_id)
                .map(|p| p.status)
                .ok_or_else(|| FarmError::invalid("No soil ahead."))?;
            match status {
                PlotStatus::Empty => crops::plant(store, session, plot_id, None, now),
                PlotStatus::Growing => crops::check_growth(session, plot_id, now),
                PlotStatus::Mature => harvest::harvest(store, session, plot_id, now),
                PlotStatus::Withered => harvest::clear_withered(store, session, plot_id),
            }
        }
    }
}

pub fn handle_plot_actions(
    mut events: EventReader<PlotActionEvent>,
    store: Res<FarmStoreHandle>,
    mut session: ResMut<FarmSession>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        let result = apply_plot_action(
            store.get(),
            &mut session,
            &config,
            clock.now(),
            event.plot,
            event.action,
        );
        match result {
            Ok(message) => {
                toasts.send(ToastEvent::new(message));
            }
            Err(e) => {
                match &e {
                    FarmError::InvalidInteraction(_) => {
                        debug!("[Farming] {:?} on plot {} rejected: {}", event.action, event.plot, e)
                    }
                    _ => warn!("[Farming] {:?} on plot {} failed: {}", event.action, event.plot, e),
                }
                toasts.send(ToastEvent::new(e.user_message()));
            }
        }
    }
}

/// Persists due maturity and withering transitions whenever the clock moved.
pub fn tick_maturity(
    store: Res<FarmStoreHandle>,
    mut session: ResMut<FarmSession>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut last_checked: Local<Option<SimHours>>,
) {
    let now = clock.now();
    if *last_checked == Some(now) {
        return;
    }
    *last_checked = Some(now);

    let report = crops::advance_maturity(
        store.get(),
        &mut session,
        now,
        config.farming.wither_after_hours,
    );
    if !report.is_empty() {
        info!(
            "[Farming] {} plot(s) matured, {} withered",
            report.matured.len(),
            report.withered.len()
        );
    }
}
