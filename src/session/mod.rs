//! Session domain: choosing a farm, building it off the main thread and
//! leaving it again.
//!
//! `Select` lists players and farms, `LoadingFarm` waits on a single
//! background task, `Playing` runs the farm until Escape.

use bevy::prelude::*;

use crate::shared::*;

pub mod loading;
pub mod select;

pub use loading::{build_farm, FarmLoadTask, LoadFailure, LoadedFarm};
pub use select::SelectScreen;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectScreen>()
            .add_systems(OnEnter(GameState::Select), select::refresh_select_screen)
            .add_systems(
                Update,
                select::navigate_select_screen.run_if(in_state(GameState::Select)),
            )
            // Requests are honoured from the selection screen only.
            .add_systems(
                Update,
                loading::start_farm_load
                    .after(select::navigate_select_screen)
                    .run_if(in_state(GameState::Select)),
            )
            .add_systems(
                Update,
                (loading::poll_farm_load, loading::tick_load_failure)
                    .chain()
                    .run_if(in_state(GameState::LoadingFarm)),
            )
            .add_systems(Update, leave_farm.run_if(in_state(GameState::Playing)))
            .add_systems(OnExit(GameState::Playing), despawn_session);
    }
}

/// Escape closes the inventory panel first, otherwise ends the session.
fn leave_farm(
    input: Res<PlayerInput>,
    mut panel: ResMut<InventoryPanel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.back {
        return;
    }
    if panel.open {
        panel.open = false;
        return;
    }
    info!("[Session] Leaving farm");
    next_state.set(GameState::Select);
}

fn despawn_session(
    mut commands: Commands,
    entities: Query<Entity, With<SessionEntity>>,
    mut selected: ResMut<SelectedPlot>,
    mut panel: ResMut<InventoryPanel>,
) {
    let count = entities.iter().count();
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<FarmSession>();
    commands.insert_resource(WorldGrid::default());
    *selected = SelectedPlot::default();
    panel.open = false;
    info!("[Session] Despawned {} session entities", count);
}
