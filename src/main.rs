mod shared;
mod config;
mod store;
mod data;
mod input;
mod assets;
mod world;
mod player;
mod farming;
mod calendar;
mod session;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use config::{GameConfig, CONFIG_PATH};
use shared::*;

fn main() {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    let store = store::open_store(&config.session);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Farmstead".into(),
                        resolution: WindowResolution::new(config.screen.width, config.screen.height),
                        present_mode: PresentMode::AutoVsync,
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: config.session.assets_root.clone(),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(FarmStoreHandle::new(store))
        .insert_resource(config)
        .init_resource::<SimClock>()
        .init_resource::<SimRng>()
        .init_resource::<DayCounter>()
        .init_resource::<PlayerInput>()
        .init_resource::<KeyBindings>()
        // Events
        .add_event::<ToastEvent>()
        .add_event::<ItemCollectedEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<DayStartedEvent>()
        .add_event::<EnterFarmRequest>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(assets::AssetsPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(calendar::CalendarPlugin)
        .add_plugins(session::SessionPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
