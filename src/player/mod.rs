mod animation;
mod camera;
pub mod interact_dispatch;
pub mod movement;
mod spawn;
pub mod tools;

use bevy::prelude::*;
use crate::shared::*;

pub use animation::action_name;
pub use camera::camera_offset;
pub use movement::step_body;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectedPlot>()
            .init_resource::<CameraOffset>();

        // -- Spawn player when we enter Playing --
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // -- Simulation tick: input is sampled in PreUpdate --
        app.add_systems(
            Update,
            (
                tools::tool_cycle,
                movement::player_movement,
                interact_dispatch::select_nearby_plot,
                // Dispatch reads the position the resolver just produced.
                interact_dispatch::dispatch_tool_use,
                interact_dispatch::dispatch_seed_use,
                interact_dispatch::dispatch_trigger,
                animation::animate_player,
                camera::update_camera_offset,
            )
                .chain()
                .run_if(in_state(GameState::Playing))
                .run_if(simulation_running),
        );

        // -- Presentation hand-off --
        app.add_systems(
            PostUpdate,
            (animation::sync_player_sprite, camera::follow_camera_offset)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
